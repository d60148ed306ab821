use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use super::{CategoryId, ProductId};

/// Represents a product in the store catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub stock: u32,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category_id: CategoryId,
    /// Denormalized copy of the category name, refreshed on category rename.
    pub category_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for creating a new product.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub name: String,
    pub price: Decimal,
    pub stock: u32,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category_id: CategoryId,
    pub category_name: String,
}

/// Payload for editing an existing product. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<u32>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// The product facts frozen into a ticket or order at purchase time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub category_name: String,
    pub image_url: Option<String>,
}

impl Product {
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            product_id: self.id.clone(),
            name: self.name.clone(),
            unit_price: self.price,
            category_name: self.category_name.clone(),
            image_url: self.image_url.clone(),
        }
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}
