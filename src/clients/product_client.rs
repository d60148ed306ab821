use tracing::{debug, instrument};
use crate::actor_framework::ResourceClient;
use crate::domain::{CategoryId, Product, ProductCreate, ProductId, ProductPatch};
use crate::product_actor::{ProductAction, ProductActionResult, ProductError};

/// Client for the inventory ledger.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl_basic_client!(ProductClient, Product, ProductError, product, products);

fn unexpected(result: ProductActionResult) -> ProductError {
    ProductError::ActorCommunicationError(format!("Unexpected result: {result:?}"))
}

impl ProductClient {
    #[instrument(skip(self, params), fields(name = %params.name))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<ProductId, ProductError> {
        debug!("Sending request");
        self.inner.create(params).await
    }

    #[instrument(skip(self, patch))]
    pub async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner.update(id, patch).await
    }

    /// Advisory only; `debit` re-checks at mutation time.
    #[instrument(skip(self))]
    pub async fn check_available(&self, id: ProductId, quantity: u32) -> Result<bool, ProductError> {
        match self.inner.perform_action(id, ProductAction::CheckAvailable(quantity)).await? {
            ProductActionResult::CheckAvailable(available) => Ok(available),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn stock_level(&self, id: ProductId) -> Result<u32, ProductError> {
        match self.inner.perform_action(id, ProductAction::StockLevel).await? {
            ProductActionResult::StockLevel(level) => Ok(level),
            other => Err(unexpected(other)),
        }
    }

    /// Returns the stock left after the debit.
    #[instrument(skip(self))]
    pub async fn debit(&self, id: ProductId, quantity: u32) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::Debit(quantity)).await? {
            ProductActionResult::Debit { remaining } => Ok(remaining),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn credit(&self, id: ProductId, quantity: u32) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::Credit(quantity)).await? {
            ProductActionResult::Credit { stock } => Ok(stock),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn rename_category(
        &self,
        id: ProductId,
        category_id: CategoryId,
        name: String,
    ) -> Result<bool, ProductError> {
        match self
            .inner
            .perform_action(id, ProductAction::RenameCategory { category_id, name })
            .await?
        {
            ProductActionResult::RenameCategory { renamed } => Ok(renamed),
            other => Err(unexpected(other)),
        }
    }
}
