use std::sync::Arc;
use rust_decimal::Decimal;
use tracing::{instrument, warn};
use crate::app_system::StorefrontError;
use crate::domain::{Member, Order, OrderStatus, SalesSummary, SellerRow, Ticket, TicketCode};
use crate::platform::CapabilityCheck;
use crate::ticket_actor::is_ticket_code;
use super::{OrderClient, ProductClient, TicketClient};

pub const RECENT_ORDERS_LIMIT: usize = 20;
pub const TOP_SELLERS_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct SalesReport {
    pub summary: SalesSummary,
    pub top_sellers: Vec<SellerRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StockLine {
    pub product_name: String,
    pub category_name: String,
    pub price: Decimal,
    pub stock: u32,
}

/// An order together with the ticket it belongs to, when both exist.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderInfo {
    pub ticket: Option<Ticket>,
    pub order: Option<Order>,
}

/// Read-only admin reports.
#[derive(Clone)]
pub struct ReportsClient {
    products: ProductClient,
    tickets: TicketClient,
    orders: OrderClient,
    policy: Arc<dyn CapabilityCheck>,
}

impl ReportsClient {
    pub fn new(
        products: ProductClient,
        tickets: TicketClient,
        orders: OrderClient,
        policy: Arc<dyn CapabilityCheck>,
    ) -> Self {
        Self {
            products,
            tickets,
            orders,
            policy,
        }
    }

    fn require_admin(&self, member: &Member) -> Result<(), StorefrontError> {
        if self.policy.is_admin(member) {
            return Ok(());
        }
        warn!(user = %member.id, "Report refused");
        Err(StorefrontError::Unauthorized(member.id))
    }

    #[instrument(skip(self, admin), fields(admin = %admin.id))]
    pub async fn recent_orders(&self, admin: &Member) -> Result<Vec<Order>, StorefrontError> {
        self.require_admin(admin)?;
        Ok(self.orders.list_recent(RECENT_ORDERS_LIMIT).await?)
    }

    /// # Errors
    /// `NotFound` if neither a ticket nor an order carries the code.
    #[instrument(skip(self, admin), fields(admin = %admin.id))]
    pub async fn order_info(&self, admin: &Member, code: TicketCode) -> Result<OrderInfo, StorefrontError> {
        self.require_admin(admin)?;
        let code = code.trim().to_uppercase();
        if !is_ticket_code(&code) {
            return Err(StorefrontError::Validation(format!("'{code}' is not a ticket code")));
        }
        let ticket = self.tickets.get_ticket(code.clone()).await?;
        let order = self.orders.find_by_ticket(code.clone()).await?;
        if ticket.is_none() && order.is_none() {
            return Err(StorefrontError::NotFound(format!("ticket {code}")));
        }
        Ok(OrderInfo { ticket, order })
    }

    #[instrument(skip(self, admin), fields(admin = %admin.id))]
    pub async fn open_tickets(&self, admin: &Member) -> Result<Vec<Ticket>, StorefrontError> {
        self.require_admin(admin)?;
        Ok(self.tickets.list_open().await?)
    }

    #[instrument(skip(self, admin), fields(admin = %admin.id))]
    pub async fn sales_report(&self, admin: &Member) -> Result<SalesReport, StorefrontError> {
        self.require_admin(admin)?;
        Ok(SalesReport {
            summary: self.orders.sales_summary().await?,
            top_sellers: self
                .orders
                .top_sellers(OrderStatus::Approved, TOP_SELLERS_LIMIT)
                .await?,
        })
    }

    /// Lowest stock first.
    #[instrument(skip(self, admin), fields(admin = %admin.id))]
    pub async fn stock_overview(&self, admin: &Member) -> Result<Vec<StockLine>, StorefrontError> {
        self.require_admin(admin)?;
        let mut lines: Vec<StockLine> = self
            .products
            .list_products()
            .await?
            .into_iter()
            .map(|p| StockLine {
                product_name: p.name,
                category_name: p.category_name,
                price: p.price,
                stock: p.stock,
            })
            .collect();
        lines.sort_by(|a, b| a.stock.cmp(&b.stock).then_with(|| a.product_name.cmp(&b.product_name)));
        Ok(lines)
    }
}
