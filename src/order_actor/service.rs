use std::collections::HashMap;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use crate::actor_framework::MAX_ID_ATTEMPTS;
use crate::clients::OrderClient;
use crate::domain::{
    line_total, Order, OrderCreate, OrderId, OrderStatus, SalesSummary, SellerRow, TicketCode,
    UserId,
};
use crate::messages::OrderRequest;
use super::error::OrderError;

/// Order record store.
///
/// Orders are kept in insertion order with an index by ticket code. A ticket
/// has at most one order: choosing a payment method again replaces the
/// awaiting order in place instead of adding a second one.
pub struct OrderService {
    receiver: mpsc::Receiver<OrderRequest>,
    orders: Vec<Order>,
    by_ticket: HashMap<TicketCode, usize>,
    next_id_fn: Box<dyn Fn() -> OrderId + Send + Sync>,
}

impl OrderService {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> OrderId + Send + Sync + 'static,
    ) -> (Self, OrderClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            orders: Vec::new(),
            by_ticket: HashMap::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        (service, OrderClient::new(sender))
    }

    #[instrument(name = "order_service", skip(self))]
    pub async fn run(mut self) {
        info!("OrderService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                OrderRequest::RecordMethodChoice { params, respond_to } => {
                    let _ = respond_to.send(self.handle_record_method_choice(params));
                }
                OrderRequest::FindByTicket { ticket_code, respond_to } => {
                    let _ = respond_to.send(Ok(self.find(&ticket_code).cloned()));
                }
                OrderRequest::MarkApproved { ticket_code, approver, respond_to } => {
                    let _ = respond_to.send(self.handle_mark_approved(ticket_code, approver));
                }
                OrderRequest::RevertApproval { ticket_code, respond_to } => {
                    let _ = respond_to.send(self.handle_revert_approval(ticket_code));
                }
                OrderRequest::MarkRejected { ticket_code, rejecter, reason, respond_to } => {
                    let _ = respond_to.send(self.handle_mark_rejected(ticket_code, rejecter, reason));
                }
                OrderRequest::ListRecent { limit, respond_to } => {
                    let recent = self.orders.iter().rev().take(limit).cloned().collect();
                    let _ = respond_to.send(Ok(recent));
                }
                OrderRequest::TopSellers { status, limit, respond_to } => {
                    let _ = respond_to.send(Ok(self.top_sellers(status, limit)));
                }
                OrderRequest::SalesSummary { respond_to } => {
                    let _ = respond_to.send(Ok(self.sales_summary()));
                }
                OrderRequest::Snapshot { respond_to } => {
                    let _ = respond_to.send(Ok(self.orders.clone()));
                }
                OrderRequest::Restore { orders, respond_to } => {
                    let _ = respond_to.send(Ok(self.restore(orders)));
                }
                OrderRequest::Shutdown => {
                    info!("OrderService shutting down");
                    break;
                }
            }
        }

        info!("OrderService stopped");
    }

    fn find(&self, ticket_code: &str) -> Option<&Order> {
        self.by_ticket.get(ticket_code).map(|&index| &self.orders[index])
    }

    fn find_mut(&mut self, ticket_code: &str) -> Option<&mut Order> {
        let index = *self.by_ticket.get(ticket_code)?;
        self.orders.get_mut(index)
    }

    fn fresh_id(&self) -> Result<OrderId, OrderError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = (self.next_id_fn)();
            if !self.orders.iter().any(|o| o.id == id) {
                return Ok(id);
            }
            warn!(id = %id, "Order id collision, regenerating");
        }
        error!("Order id space exhausted");
        Err(OrderError::IdSpaceExhausted(MAX_ID_ATTEMPTS))
    }

    /// Upsert keyed by ticket code.
    ///
    /// # Errors
    /// `AlreadyResolved` once the ticket's order was approved or rejected.
    #[instrument(fields(ticket = %params.ticket_code, method = %params.method), skip(self, params))]
    fn handle_record_method_choice(&mut self, params: OrderCreate) -> Result<Order, OrderError> {
        if params.quantity == 0 {
            return Err(OrderError::ValidationError("Quantity must be positive".to_string()));
        }

        if let Some(existing) = self.find_mut(&params.ticket_code) {
            if existing.status != OrderStatus::AwaitingPayment {
                warn!(status = existing.status.as_str(), "Order already resolved");
                return Err(OrderError::AlreadyResolved {
                    ticket_code: params.ticket_code,
                    status: existing.status,
                });
            }
            if existing.method != params.method {
                existing.switched_from = Some(existing.method);
            }
            existing.method = params.method;
            existing.payment_data = params.payment_data;
            existing.updated_at = Some(Utc::now());
            info!(order_id = %existing.id, "Payment method updated on existing order");
            return Ok(existing.clone());
        }

        let unit_price = params.product.unit_price;
        let total = line_total(unit_price, params.quantity)
            .map_err(|e| OrderError::ValidationError(e.to_string()))?;
        let id = self.fresh_id()?;
        let order = Order {
            id,
            total,
            ticket_code: params.ticket_code,
            buyer: params.buyer,
            channel: params.channel,
            product: params.product,
            quantity: params.quantity,
            unit_price,
            method: params.method,
            payment_data: params.payment_data,
            switched_from: None,
            status: OrderStatus::AwaitingPayment,
            created_at: Utc::now(),
            updated_at: None,
            approved_by: None,
            approved_at: None,
            rejected_by: None,
            rejected_at: None,
            rejection_reason: None,
        };
        self.by_ticket.insert(order.ticket_code.clone(), self.orders.len());
        self.orders.push(order.clone());

        info!(order_id = %order.id, total = %order.total, "Order recorded");
        Ok(order)
    }

    fn awaiting_order(&mut self, ticket_code: &TicketCode) -> Result<&mut Order, OrderError> {
        let order = self
            .find_mut(ticket_code)
            .ok_or_else(|| OrderError::NotFound(ticket_code.clone()))?;
        if order.status != OrderStatus::AwaitingPayment {
            return Err(OrderError::AlreadyResolved {
                ticket_code: ticket_code.clone(),
                status: order.status,
            });
        }
        Ok(order)
    }

    #[instrument(skip(self))]
    fn handle_mark_approved(&mut self, ticket_code: TicketCode, approver: UserId) -> Result<Order, OrderError> {
        let order = self.awaiting_order(&ticket_code).inspect_err(|e| {
            warn!(error = %e, "Approval guard refused");
        })?;

        let now = Utc::now();
        order.status = OrderStatus::Approved;
        order.approved_by = Some(approver);
        order.approved_at = Some(now);
        order.updated_at = Some(now);

        info!(order_id = %order.id, "Order approved");
        Ok(order.clone())
    }

    /// Puts an approved order back to awaiting payment. Only used to undo an
    /// approval whose later steps failed.
    #[instrument(skip(self))]
    fn handle_revert_approval(&mut self, ticket_code: TicketCode) -> Result<Order, OrderError> {
        let order = self
            .find_mut(&ticket_code)
            .ok_or_else(|| OrderError::NotFound(ticket_code.clone()))?;
        if order.status != OrderStatus::Approved {
            return Err(OrderError::NotApproved {
                ticket_code,
                status: order.status,
            });
        }

        order.status = OrderStatus::AwaitingPayment;
        order.approved_by = None;
        order.approved_at = None;
        order.updated_at = Some(Utc::now());

        warn!(order_id = %order.id, "Order approval reverted");
        Ok(order.clone())
    }

    #[instrument(skip(self, reason))]
    fn handle_mark_rejected(
        &mut self,
        ticket_code: TicketCode,
        rejecter: UserId,
        reason: String,
    ) -> Result<Order, OrderError> {
        let reason = reason.trim().to_string();
        if reason.is_empty() {
            return Err(OrderError::ValidationError("Rejection reason required".to_string()));
        }
        let order = self.awaiting_order(&ticket_code)?;

        let now = Utc::now();
        order.status = OrderStatus::Rejected;
        order.rejected_by = Some(rejecter);
        order.rejected_at = Some(now);
        order.rejection_reason = Some(reason);
        order.updated_at = Some(now);

        info!(order_id = %order.id, "Order rejected");
        Ok(order.clone())
    }

    /// Quantity and revenue per product name, best sellers first.
    fn top_sellers(&self, status: OrderStatus, limit: usize) -> Vec<SellerRow> {
        let mut rows: HashMap<&str, SellerRow> = HashMap::new();
        for order in self.orders.iter().filter(|o| o.status == status) {
            let row = rows.entry(order.product.name.as_str()).or_insert_with(|| SellerRow {
                product_name: order.product.name.clone(),
                quantity: 0,
                revenue: Decimal::ZERO,
            });
            row.quantity += u64::from(order.quantity);
            row.revenue = row.revenue.saturating_add(order.total);
        }

        let mut rows: Vec<SellerRow> = rows.into_values().collect();
        rows.sort_by(|a, b| {
            b.quantity
                .cmp(&a.quantity)
                .then_with(|| b.revenue.cmp(&a.revenue))
                .then_with(|| a.product_name.cmp(&b.product_name))
        });
        rows.truncate(limit);
        rows
    }

    fn sales_summary(&self) -> SalesSummary {
        self.orders.iter().fold(SalesSummary::default(), |mut summary, order| {
            match order.status {
                OrderStatus::Approved => {
                    summary.approved_count += 1;
                    summary.revenue = summary.revenue.saturating_add(order.total);
                }
                OrderStatus::AwaitingPayment => summary.awaiting_count += 1,
                OrderStatus::Rejected => summary.rejected_count += 1,
            }
            summary
        })
    }

    fn restore(&mut self, orders: Vec<Order>) -> usize {
        let mut count = 0;
        for order in orders {
            if self.by_ticket.contains_key(&order.ticket_code) {
                debug!(ticket = %order.ticket_code, "Skipping duplicate order on restore");
                continue;
            }
            self.by_ticket.insert(order.ticket_code.clone(), self.orders.len());
            self.orders.push(order);
            count += 1;
        }
        info!(count, "Orders restored");
        count
    }
}
