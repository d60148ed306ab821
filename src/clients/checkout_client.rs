use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{info, instrument};
use crate::app_system::StorefrontError;
use crate::checkout::Cart;
use crate::domain::{Member, Order, PaymentMethod, ProductId, Ticket, TicketCode};
use crate::messages::CheckoutRequest;

/// Entry points of the order lifecycle, as called by the interaction layer.
#[derive(Clone)]
pub struct CheckoutClient {
    sender: mpsc::Sender<CheckoutRequest>,
}

impl CheckoutClient {
    pub fn new(sender: mpsc::Sender<CheckoutRequest>) -> Self {
        Self { sender }
    }

    /// Finalizes a cart built by the buyer. An expired cart is refused here,
    /// before anything reaches the checkout actor.
    #[instrument(skip(self, buyer, cart), fields(buyer = %buyer.id, product = %cart.product.product_id))]
    pub async fn finalize_cart(&self, buyer: Member, cart: &Cart, now: DateTime<Utc>) -> Result<Ticket, StorefrontError> {
        cart.ensure_active(now)?;
        if cart.buyer != buyer.id {
            return Err(StorefrontError::Unauthorized(buyer.id));
        }
        let total = cart.total()?;
        info!(quantity = cart.quantity, total = %total, "Finalizing cart");
        self.finalize_purchase(buyer, cart.product.product_id.clone(), cart.quantity).await
    }

    pub async fn shutdown(&self) {
        let _ = self.sender.send(CheckoutRequest::Shutdown).await;
    }
}

client_method!(CheckoutClient => fn finalize_purchase(buyer: Member, product_id: ProductId, quantity: u32) -> Ticket as CheckoutRequest::FinalizePurchase, Error = StorefrontError);
client_method!(CheckoutClient => fn choose_method(buyer: Member, ticket_code: TicketCode, method: PaymentMethod) -> Order as CheckoutRequest::ChooseMethod, Error = StorefrontError);
client_method!(CheckoutClient => fn approve(admin: Member, ticket_code: TicketCode) -> Order as CheckoutRequest::Approve, Error = StorefrontError);
client_method!(CheckoutClient => fn reject(admin: Member, ticket_code: TicketCode, reason: String) -> Ticket as CheckoutRequest::Reject, Error = StorefrontError);
client_method!(CheckoutClient => fn close(admin: Member, ticket_code: TicketCode) -> Ticket as CheckoutRequest::Close, Error = StorefrontError);
