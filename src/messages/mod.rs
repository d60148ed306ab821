use chrono::{DateTime, Utc};
use tokio::sync::oneshot;
use crate::app_system::StorefrontError;
use crate::domain::{
    Member, Order, OrderCreate, OrderStatus, PaymentData, PaymentMethod, PendingClose, ProductId,
    SalesSummary, SellerRow, Ticket, TicketCode, TicketDraft, TicketStatus, UserId,
};
use crate::order_actor::OrderError;
use crate::ticket_actor::TicketError;

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Typed message enums for actor communication. Each variant includes parameters
/// and a oneshot channel for responses.

#[derive(Debug)]
pub enum TicketRequest {
    Claim {
        buyer: UserId,
        respond_to: ServiceResponse<TicketCode, TicketError>,
    },
    Open {
        code: TicketCode,
        draft: TicketDraft,
        respond_to: ServiceResponse<Ticket, TicketError>,
    },
    Release {
        code: TicketCode,
        respond_to: ServiceResponse<(), TicketError>,
    },
    AttachPayment {
        code: TicketCode,
        method: PaymentMethod,
        data: PaymentData,
        respond_to: ServiceResponse<Ticket, TicketError>,
    },
    Transition {
        code: TicketCode,
        next: TicketStatus,
        by: UserId,
        reason: Option<String>,
        respond_to: ServiceResponse<Ticket, TicketError>,
    },
    ScheduleClose {
        code: TicketCode,
        close_after: DateTime<Utc>,
        respond_to: ServiceResponse<Ticket, TicketError>,
    },
    CompleteClose {
        code: TicketCode,
        respond_to: ServiceResponse<bool, TicketError>,
    },
    GetTicket {
        code: TicketCode,
        respond_to: ServiceResponse<Option<Ticket>, TicketError>,
    },
    FindOpenByBuyer {
        buyer: UserId,
        respond_to: ServiceResponse<Option<Ticket>, TicketError>,
    },
    ListOpen {
        respond_to: ServiceResponse<Vec<Ticket>, TicketError>,
    },
    PendingClosures {
        respond_to: ServiceResponse<Vec<PendingClose>, TicketError>,
    },
    Snapshot {
        respond_to: ServiceResponse<Vec<Ticket>, TicketError>,
    },
    Restore {
        tickets: Vec<Ticket>,
        respond_to: ServiceResponse<usize, TicketError>,
    },
    Shutdown,
}

#[derive(Debug)]
pub enum OrderRequest {
    RecordMethodChoice {
        params: OrderCreate,
        respond_to: ServiceResponse<Order, OrderError>,
    },
    FindByTicket {
        ticket_code: TicketCode,
        respond_to: ServiceResponse<Option<Order>, OrderError>,
    },
    MarkApproved {
        ticket_code: TicketCode,
        approver: UserId,
        respond_to: ServiceResponse<Order, OrderError>,
    },
    RevertApproval {
        ticket_code: TicketCode,
        respond_to: ServiceResponse<Order, OrderError>,
    },
    MarkRejected {
        ticket_code: TicketCode,
        rejecter: UserId,
        reason: String,
        respond_to: ServiceResponse<Order, OrderError>,
    },
    ListRecent {
        limit: usize,
        respond_to: ServiceResponse<Vec<Order>, OrderError>,
    },
    TopSellers {
        status: OrderStatus,
        limit: usize,
        respond_to: ServiceResponse<Vec<SellerRow>, OrderError>,
    },
    SalesSummary {
        respond_to: ServiceResponse<SalesSummary, OrderError>,
    },
    Snapshot {
        respond_to: ServiceResponse<Vec<Order>, OrderError>,
    },
    Restore {
        orders: Vec<Order>,
        respond_to: ServiceResponse<usize, OrderError>,
    },
    Shutdown,
}

/// Entry points of the order lifecycle. Handled one at a time by the checkout
/// service, so orchestration steps never interleave with each other.
#[derive(Debug)]
pub enum CheckoutRequest {
    FinalizePurchase {
        buyer: Member,
        product_id: ProductId,
        quantity: u32,
        respond_to: ServiceResponse<Ticket, StorefrontError>,
    },
    ChooseMethod {
        buyer: Member,
        ticket_code: TicketCode,
        method: PaymentMethod,
        respond_to: ServiceResponse<Order, StorefrontError>,
    },
    Approve {
        admin: Member,
        ticket_code: TicketCode,
        respond_to: ServiceResponse<Order, StorefrontError>,
    },
    Reject {
        admin: Member,
        ticket_code: TicketCode,
        reason: String,
        respond_to: ServiceResponse<Ticket, StorefrontError>,
    },
    Close {
        admin: Member,
        ticket_code: TicketCode,
        respond_to: ServiceResponse<Ticket, StorefrontError>,
    },
    Shutdown,
}
