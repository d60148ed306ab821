use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use crate::app_system::StorefrontError;
use crate::domain::{
    parse_price, parse_quantity, parse_stock, Category, CategoryCreate, CategoryId, CategoryPatch,
    Member, Product, ProductCreate, ProductId, ProductPatch, ValidationError,
};
use crate::platform::CapabilityCheck;
use crate::product_actor::ProductError;
use super::{CategoryClient, ProductClient};

/// Raw values from the add-product form.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub stock: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category_id: CategoryId,
}

/// Raw values from the edit-product form; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ProductEditForm {
    pub name: Option<String>,
    pub price: Option<String>,
    pub stock: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Admin catalog operations over the product and category actors.
///
/// Form input is parsed here; the actors only ever see typed values.
#[derive(Clone)]
pub struct CatalogClient {
    products: ProductClient,
    categories: CategoryClient,
    policy: Arc<dyn CapabilityCheck>,
}

impl CatalogClient {
    pub fn new(products: ProductClient, categories: CategoryClient, policy: Arc<dyn CapabilityCheck>) -> Self {
        Self {
            products,
            categories,
            policy,
        }
    }

    fn require_admin(&self, member: &Member) -> Result<(), StorefrontError> {
        if self.policy.is_admin(member) {
            return Ok(());
        }
        warn!(user = %member.id, "Catalog change refused");
        Err(StorefrontError::Unauthorized(member.id))
    }

    async fn category(&self, id: &CategoryId) -> Result<Category, StorefrontError> {
        self.categories
            .get_category(id.clone())
            .await?
            .ok_or_else(|| StorefrontError::NotFound(format!("category {id}")))
    }

    #[instrument(skip(self, admin, form), fields(admin = %admin.id, name = %form.name))]
    pub async fn add_product(&self, admin: &Member, form: ProductForm) -> Result<Product, StorefrontError> {
        self.require_admin(admin)?;
        let name = form.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        let price = parse_price(&form.price)?;
        let stock = parse_stock(&form.stock)?;
        let category = self.category(&form.category_id).await?;

        let id = self
            .products
            .create_product(ProductCreate {
                name,
                price,
                stock,
                description: form.description.filter(|d| !d.trim().is_empty()),
                image_url: form.image_url.filter(|u| !u.trim().is_empty()),
                category_id: category.id,
                category_name: category.name,
            })
            .await?;
        info!(product_id = %id, "Product added");
        self.products
            .get_product(id.clone())
            .await?
            .ok_or_else(|| StorefrontError::NotFound(format!("product {id}")))
    }

    #[instrument(skip(self, admin, form), fields(admin = %admin.id))]
    pub async fn edit_product(
        &self,
        admin: &Member,
        id: ProductId,
        form: ProductEditForm,
    ) -> Result<Product, StorefrontError> {
        self.require_admin(admin)?;
        let patch = ProductPatch {
            name: form.name,
            price: form.price.as_deref().map(parse_price).transpose()?,
            stock: form.stock.as_deref().map(parse_stock).transpose()?,
            description: form.description,
            image_url: form.image_url,
        };
        let product = self.products.update_product(id, patch).await?;
        info!(product_id = %product.id, "Product edited");
        Ok(product)
    }

    #[instrument(skip(self, admin), fields(admin = %admin.id))]
    pub async fn delete_product(&self, admin: &Member, id: ProductId) -> Result<(), StorefrontError> {
        self.require_admin(admin)?;
        self.products.delete_product(id).await?;
        info!("Product deleted");
        Ok(())
    }

    /// Restock. Returns the new stock level.
    #[instrument(skip(self, admin), fields(admin = %admin.id))]
    pub async fn add_stock(&self, admin: &Member, id: ProductId, amount: &str) -> Result<u32, StorefrontError> {
        self.require_admin(admin)?;
        let amount = parse_quantity(amount)?;
        let stock = self.products.credit(id, amount).await?;
        info!(amount, stock, "Stock added");
        Ok(stock)
    }

    #[instrument(skip(self, admin), fields(admin = %admin.id))]
    pub async fn add_category(
        &self,
        admin: &Member,
        name: String,
        emoji: Option<String>,
    ) -> Result<Category, StorefrontError> {
        self.require_admin(admin)?;
        let id = self.categories.create_category(CategoryCreate { name, emoji }).await?;
        info!(category_id = %id, "Category added");
        self.category(&id).await
    }

    /// Saves the category and refreshes the cached name on every product that
    /// references it.
    #[instrument(skip(self, admin), fields(admin = %admin.id))]
    pub async fn edit_category(
        &self,
        admin: &Member,
        id: CategoryId,
        name: String,
        emoji: Option<String>,
    ) -> Result<Category, StorefrontError> {
        self.require_admin(admin)?;
        let category = self
            .categories
            .update_category(id.clone(), CategoryPatch { name, emoji })
            .await?;

        let mut renamed = 0;
        for product in self.products_in_category(&id).await? {
            match self
                .products
                .rename_category(product.id.clone(), id.clone(), category.name.clone())
                .await
            {
                Ok(true) => renamed += 1,
                Ok(false) => {}
                Err(ProductError::NotFound(_)) => {
                    debug!(product_id = %product.id, "Product deleted before rename, skipping");
                }
                Err(e) => return Err(e.into()),
            }
        }
        info!(renamed, "Category edited");
        Ok(category)
    }

    /// # Errors
    /// `CategoryInUse` while any product still references the category.
    #[instrument(skip(self, admin), fields(admin = %admin.id))]
    pub async fn delete_category(&self, admin: &Member, id: CategoryId) -> Result<(), StorefrontError> {
        self.require_admin(admin)?;
        self.category(&id).await?;
        let count = self.products_in_category(&id).await?.len();
        if count > 0 {
            warn!(count, "Category still referenced");
            return Err(StorefrontError::CategoryInUse { count });
        }
        self.categories.delete_category(id).await?;
        info!("Category deleted");
        Ok(())
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, StorefrontError> {
        let mut products = self.products.list_products().await?;
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, StorefrontError> {
        let mut categories = self.categories.list_categories().await?;
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    pub async fn products_in_category(&self, id: &CategoryId) -> Result<Vec<Product>, StorefrontError> {
        Ok(self
            .list_products()
            .await?
            .into_iter()
            .filter(|p| &p.category_id == id)
            .collect())
    }
}
