use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{error, info};
use crate::actor_framework::ResourceActor;
use crate::checkout::{CheckoutService, CheckoutSettings, CloseScheduler};
use crate::clients::{
    CatalogClient, CategoryClient, CheckoutClient, OrderClient, ProductClient, ReportsClient,
    TicketClient,
};
use crate::config::Config;
use crate::domain::{Category, Product};
use crate::order_actor::OrderService;
use crate::platform::{CapabilityCheck, ChatPlatform, RoleAdminPolicy};
use crate::snapshot::{StoreSnapshot, SNAPSHOT_VERSION};
use crate::ticket_actor::{random_ticket_code, TicketService};
use super::StorefrontError;

fn counter_ids(prefix: &'static str) -> impl Fn() -> String + Send + Sync + 'static {
    let counter = Arc::new(AtomicU64::new(1));
    move || format!("{}_{}", prefix, counter.fetch_add(1, Ordering::SeqCst))
}

/// The running storefront: every actor, wired together.
///
/// Actors start leaves first (products, categories, tickets, orders) and the
/// checkout root last; shutdown goes the other way.
pub struct StorefrontSystem {
    pub checkout: CheckoutClient,
    pub catalog: CatalogClient,
    pub reports: ReportsClient,
    pub products: ProductClient,
    pub categories: CategoryClient,
    pub tickets: TicketClient,
    pub orders: OrderClient,
    closer: CloseScheduler,
    root_handle: JoinHandle<()>,
    store_handles: Vec<JoinHandle<()>>,
}

impl StorefrontSystem {
    pub fn start(config: &Config, chat: Arc<dyn ChatPlatform>) -> Self {
        let buffer = config.actor_buffer;
        let policy: Arc<dyn CapabilityCheck> = Arc::new(RoleAdminPolicy::new(config.admin_roles.clone()));

        // 1. Inventory ledger and categories
        let (product_actor, product_resource_client) =
            ResourceActor::<Product>::new(buffer, counter_ids("product"));
        let products = ProductClient::new(product_resource_client);
        let product_handle = tokio::spawn(product_actor.run());

        let (category_actor, category_resource_client) =
            ResourceActor::<Category>::new(buffer, counter_ids("category"));
        let categories = CategoryClient::new(category_resource_client);
        let category_handle = tokio::spawn(category_actor.run());

        // 2. Ticket registry and order store
        let (ticket_service, tickets) = TicketService::new(buffer, random_ticket_code);
        let ticket_handle = tokio::spawn(ticket_service.run());

        let (order_service, orders) = OrderService::new(buffer, counter_ids("order"));
        let order_handle = tokio::spawn(order_service.run());

        // 3. Checkout root
        let settings = CheckoutSettings {
            ticket_category: config.ticket_category,
            admin_roles: config.admin_roles.clone(),
            audit_channel: config.audit_channel,
            close_delay: config.close_delay,
            delivery_link: config.delivery_link.clone(),
        };
        let (checkout_service, checkout) = CheckoutService::new(
            buffer,
            products.clone(),
            tickets.clone(),
            orders.clone(),
            chat.clone(),
            policy.clone(),
            settings,
        );
        let root_handle = tokio::spawn(checkout_service.run());

        info!(admin_roles = config.admin_roles.len(), "Storefront started");

        Self {
            catalog: CatalogClient::new(products.clone(), categories.clone(), policy.clone()),
            reports: ReportsClient::new(products.clone(), tickets.clone(), orders.clone(), policy),
            closer: CloseScheduler::new(tickets.clone(), chat),
            checkout,
            products,
            categories,
            tickets,
            orders,
            root_handle,
            store_handles: vec![product_handle, category_handle, ticket_handle, order_handle],
        }
    }

    /// Loads a snapshot into the stores. Call before serving traffic.
    pub async fn restore(&self, snapshot: StoreSnapshot) -> Result<(), StorefrontError> {
        let categories = self.categories.restore(snapshot.categories).await?;
        let products = self.products.restore(snapshot.products).await?;
        let tickets = self.tickets.restore(snapshot.tickets).await?;
        let orders = self.orders.restore(snapshot.orders).await?;
        info!(categories, products, tickets, orders, "Stores restored");
        Ok(())
    }

    /// Re-arms deferred closes that were pending when the process stopped.
    /// Returns how many were found.
    pub async fn recover_pending_closes(&self) -> Result<usize, StorefrontError> {
        let handles = self.closer.recover(Utc::now()).await?;
        Ok(handles.len())
    }

    pub async fn snapshot(&self) -> Result<StoreSnapshot, StorefrontError> {
        Ok(StoreSnapshot {
            version: SNAPSHOT_VERSION,
            taken_at: Some(Utc::now()),
            categories: self.categories.list_categories().await?,
            products: self.products.list_products().await?,
            tickets: self.tickets.snapshot().await?,
            orders: self.orders.snapshot().await?,
        })
    }

    /// Stops the checkout root, then the stores.
    pub async fn shutdown(self) -> Result<(), StorefrontError> {
        info!("Shutting down storefront...");

        self.checkout.shutdown().await;
        if let Err(e) = self.root_handle.await {
            error!("Checkout task failed: {:?}", e);
            return Err(StorefrontError::Internal(format!("Checkout task failed: {e}")));
        }

        self.products.shutdown().await;
        self.categories.shutdown().await;
        self.tickets.shutdown().await;
        self.orders.shutdown().await;

        for handle in self.store_handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(StorefrontError::Internal(format!("Actor task failed: {e}")));
            }
        }

        info!("Storefront shutdown complete.");
        Ok(())
    }
}
