use chrono::Utc;
use crate::actor_framework::Entity;
use crate::domain::{Category, CategoryCreate, CategoryPatch};
use super::error::CategoryError;

impl Entity for Category {
    type Id = String;
    type CreateParams = CategoryCreate;
    type Patch = CategoryPatch;
    type Action = ();
    type ActionResult = ();
    type Error = CategoryError;

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: CategoryCreate) -> Result<Self, CategoryError> {
        Ok(Self {
            id,
            name: params.name.trim().to_string(),
            emoji: clean_emoji(params.emoji),
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    fn on_create(&mut self) -> Result<(), CategoryError> {
        require_name(&self.name)
    }

    fn on_update(&mut self, patch: CategoryPatch) -> Result<(), CategoryError> {
        self.name = patch.name.trim().to_string();
        self.emoji = clean_emoji(patch.emoji);
        self.updated_at = Some(Utc::now());
        require_name(&self.name)
    }

    /// No custom actions are defined for categories.
    fn handle_action(&mut self, _action: ()) -> Result<(), CategoryError> {
        Ok(())
    }
}

fn require_name(name: &str) -> Result<(), CategoryError> {
    if name.is_empty() {
        return Err(CategoryError::ValidationError("Category name must not be empty".to_string()));
    }
    Ok(())
}

fn clean_emoji(emoji: Option<String>) -> Option<String> {
    emoji.map(|e| e.trim().to_string()).filter(|e| !e.is_empty())
}
