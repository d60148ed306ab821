use tokio::sync::mpsc;
use crate::domain::{Order, OrderCreate, OrderStatus, SalesSummary, SellerRow, TicketCode, UserId};
use crate::messages::OrderRequest;
use crate::order_actor::OrderError;

/// Client for the order record store.
#[derive(Clone)]
pub struct OrderClient {
    sender: mpsc::Sender<OrderRequest>,
}

impl OrderClient {
    pub fn new(sender: mpsc::Sender<OrderRequest>) -> Self {
        Self { sender }
    }

    pub async fn shutdown(&self) {
        let _ = self.sender.send(OrderRequest::Shutdown).await;
    }
}

client_method!(OrderClient => fn record_method_choice(params: OrderCreate) -> Order as OrderRequest::RecordMethodChoice, Error = OrderError);
client_method!(OrderClient => fn find_by_ticket(ticket_code: TicketCode) -> Option<Order> as OrderRequest::FindByTicket, Error = OrderError);
client_method!(OrderClient => fn mark_approved(ticket_code: TicketCode, approver: UserId) -> Order as OrderRequest::MarkApproved, Error = OrderError);
client_method!(OrderClient => fn revert_approval(ticket_code: TicketCode) -> Order as OrderRequest::RevertApproval, Error = OrderError);
client_method!(OrderClient => fn mark_rejected(ticket_code: TicketCode, rejecter: UserId, reason: String) -> Order as OrderRequest::MarkRejected, Error = OrderError);
client_method!(OrderClient => fn list_recent(limit: usize) -> Vec<Order> as OrderRequest::ListRecent, Error = OrderError);
client_method!(OrderClient => fn top_sellers(status: OrderStatus, limit: usize) -> Vec<SellerRow> as OrderRequest::TopSellers, Error = OrderError);
client_method!(OrderClient => fn sales_summary() -> SalesSummary as OrderRequest::SalesSummary, Error = OrderError);
client_method!(OrderClient => fn snapshot() -> Vec<Order> as OrderRequest::Snapshot, Error = OrderError);
client_method!(OrderClient => fn restore(orders: Vec<Order>) -> usize as OrderRequest::Restore, Error = OrderError);
