use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::CategoryId;

/// A catalog section shown as a selector option in the storefront panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub emoji: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CategoryCreate {
    pub name: String,
    pub emoji: Option<String>,
}

/// Category edits replace both fields, matching the edit form.
#[derive(Debug, Clone)]
pub struct CategoryPatch {
    pub name: String,
    pub emoji: Option<String>,
}
