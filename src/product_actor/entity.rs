use chrono::Utc;
use rust_decimal::Decimal;
use crate::actor_framework::Entity;
use crate::domain::{Product, ProductCreate, ProductPatch, ValidationError, MAX_UNIT_PRICE};
use super::actions::{ProductAction, ProductActionResult};
use super::error::ProductError;

impl Entity for Product {
    type Id = String;
    type CreateParams = ProductCreate;
    type Patch = ProductPatch;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Error = ProductError;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new Product from creation parameters.
    ///
    /// # Arguments
    /// * `id` - Unique identifier for the product
    /// * `params` - Validated form values plus the chosen category
    fn from_create_params(id: String, params: ProductCreate) -> Result<Self, ProductError> {
        Ok(Self {
            id,
            name: params.name.trim().to_string(),
            price: params.price,
            stock: params.stock,
            description: params.description,
            image_url: params.image_url,
            category_id: params.category_id,
            category_name: params.category_name,
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    fn on_create(&mut self) -> Result<(), ProductError> {
        validate(self)
    }

    /// Applies an edit-form submission.
    ///
    /// # Fields Updated
    /// - `name`, `price`, `stock`, `description`, `image_url` when present
    fn on_update(&mut self, patch: ProductPatch) -> Result<(), ProductError> {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        if let Some(description) = patch.description {
            self.description = Some(description).filter(|d| !d.is_empty());
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = Some(image_url).filter(|u| !u.is_empty());
        }
        self.updated_at = Some(Utc::now());
        validate(self)
    }

    /// Handles ledger actions.
    ///
    /// # Errors
    /// `Debit` fails when stock is short; zero quantities are rejected for
    /// both `Debit` and `Credit`.
    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, ProductError> {
        match action {
            ProductAction::CheckAvailable(quantity) => {
                Ok(ProductActionResult::CheckAvailable(self.stock >= quantity))
            }
            ProductAction::StockLevel => Ok(ProductActionResult::StockLevel(self.stock)),
            ProductAction::Debit(0) | ProductAction::Credit(0) => {
                Err(ProductError::InvalidQuantity(0))
            }
            ProductAction::Debit(quantity) => {
                if self.stock < quantity {
                    return Err(ProductError::InsufficientStock {
                        requested: quantity,
                        available: self.stock,
                    });
                }
                self.stock -= quantity;
                Ok(ProductActionResult::Debit { remaining: self.stock })
            }
            ProductAction::Credit(quantity) => {
                self.stock = self.stock.checked_add(quantity).ok_or(ProductError::StockOverflow {
                    current: self.stock,
                    adding: quantity,
                })?;
                Ok(ProductActionResult::Credit { stock: self.stock })
            }
            ProductAction::RenameCategory { category_id, name } => {
                let renamed = self.category_id == category_id;
                if renamed {
                    self.category_name = name;
                }
                Ok(ProductActionResult::RenameCategory { renamed })
            }
        }
    }
}

fn validate(product: &Product) -> Result<(), ProductError> {
    if product.name.is_empty() {
        return Err(ProductError::ValidationError("Name required".to_string()));
    }
    if product.price <= Decimal::ZERO {
        return Err(ProductError::ValidationError("Price must be positive".to_string()));
    }
    if product.price > MAX_UNIT_PRICE {
        return Err(ProductError::ValidationError(ValidationError::PriceTooLarge.to_string()));
    }
    if product.price.normalize().scale() > 2 {
        return Err(ProductError::ValidationError(
            "Price has more than 2 decimal places".to_string(),
        ));
    }
    Ok(())
}
