use std::sync::Arc;
use chrono::{Duration, Utc};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use crate::app_system::StorefrontError;
use crate::clients::{CheckoutClient, OrderClient, ProductClient, TicketClient};
use crate::domain::{
    line_total, ChannelId, Member, Order, OrderCreate, OrderStatus, PaymentMethod, PendingClose, ProductId,
    RoleId, Ticket, TicketCode, TicketDraft, TicketStatus, ValidationError,
};
use crate::messages::CheckoutRequest;
use crate::notifications::NotificationDispatcher;
use crate::platform::{ticket_channel_grants, CapabilityCheck, ChatPlatform};
use super::closer::CloseScheduler;
use super::notices;
use super::payment::generate_payment_data;

/// Deployment-specific knobs for the checkout flow.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    /// Parent category for ticket channels.
    pub ticket_category: Option<ChannelId>,
    pub admin_roles: Vec<RoleId>,
    pub audit_channel: Option<ChannelId>,
    pub close_delay: Duration,
    pub delivery_link: String,
}

/// The order state machine.
///
/// Owns no records. Each request is run to completion before the next one is
/// taken off the queue, so two orchestration steps never interleave. The
/// check-and-mutate steps themselves live in the store actors.
pub struct CheckoutService {
    receiver: mpsc::Receiver<CheckoutRequest>,
    products: ProductClient,
    tickets: TicketClient,
    orders: OrderClient,
    chat: Arc<dyn ChatPlatform>,
    policy: Arc<dyn CapabilityCheck>,
    notifier: NotificationDispatcher,
    closer: CloseScheduler,
    settings: CheckoutSettings,
}

impl CheckoutService {
    pub fn new(
        buffer_size: usize,
        products: ProductClient,
        tickets: TicketClient,
        orders: OrderClient,
        chat: Arc<dyn ChatPlatform>,
        policy: Arc<dyn CapabilityCheck>,
        settings: CheckoutSettings,
    ) -> (Self, CheckoutClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            notifier: NotificationDispatcher::new(chat.clone(), settings.audit_channel),
            closer: CloseScheduler::new(tickets.clone(), chat.clone()),
            products,
            tickets,
            orders,
            chat,
            policy,
            settings,
        };
        (service, CheckoutClient::new(sender))
    }

    #[instrument(name = "checkout_service", skip(self))]
    pub async fn run(mut self) {
        info!("CheckoutService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CheckoutRequest::FinalizePurchase { buyer, product_id, quantity, respond_to } => {
                    let result = self.handle_finalize_purchase(buyer, product_id, quantity).await;
                    let _ = respond_to.send(result);
                }
                CheckoutRequest::ChooseMethod { buyer, ticket_code, method, respond_to } => {
                    let result = self.handle_choose_method(buyer, ticket_code, method).await;
                    let _ = respond_to.send(result);
                }
                CheckoutRequest::Approve { admin, ticket_code, respond_to } => {
                    let result = self.handle_approve(admin, ticket_code).await;
                    let _ = respond_to.send(result);
                }
                CheckoutRequest::Reject { admin, ticket_code, reason, respond_to } => {
                    let result = self.handle_reject(admin, ticket_code, reason).await;
                    let _ = respond_to.send(result);
                }
                CheckoutRequest::Close { admin, ticket_code, respond_to } => {
                    let result = self.handle_close(admin, ticket_code).await;
                    let _ = respond_to.send(result);
                }
                CheckoutRequest::Shutdown => {
                    info!("CheckoutService shutting down");
                    break;
                }
            }
        }

        info!("CheckoutService stopped");
    }

    fn require_admin(&self, member: &Member) -> Result<(), StorefrontError> {
        if self.policy.is_admin(member) {
            Ok(())
        } else {
            warn!(user = %member.id, "Admin action refused");
            Err(StorefrontError::Unauthorized(member.id))
        }
    }

    async fn load_ticket(&self, code: &TicketCode) -> Result<Ticket, StorefrontError> {
        self.tickets
            .get_ticket(code.clone())
            .await?
            .ok_or_else(|| StorefrontError::NotFound(format!("ticket {code}")))
    }

    fn require_open(ticket: &Ticket) -> Result<(), StorefrontError> {
        if ticket.is_open() {
            return Ok(());
        }
        Err(StorefrontError::InvalidTransition(format!(
            "ticket {} is {}",
            ticket.code, ticket.status
        )))
    }

    /// Opens a ticket for the buyer.
    ///
    /// Order of effects: stock hint, buyer slot claim, channel creation, ticket
    /// persisted. A failed channel creation releases the claim, so no ticket
    /// exists afterwards.
    #[instrument(skip(self, buyer), fields(buyer = %buyer.id))]
    async fn handle_finalize_purchase(
        &self,
        buyer: Member,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Ticket, StorefrontError> {
        if quantity == 0 {
            return Err(ValidationError::QuantityFormat.into());
        }

        let product = self
            .products
            .get_product(product_id.clone())
            .await?
            .ok_or_else(|| StorefrontError::NotFound(format!("product {product_id}")))?;
        if product.stock < quantity {
            info!(stock = product.stock, "Not enough stock to open a ticket");
            return Err(StorefrontError::InsufficientStock {
                requested: quantity,
                available: product.stock,
            });
        }
        let total = line_total(product.price, quantity)?;
        debug!(total = %total, "Line total accepted");

        let code = self.tickets.claim(buyer.id).await?;
        let grants = ticket_channel_grants(buyer.id, &self.settings.admin_roles);
        let channel = match self
            .chat
            .create_private_channel(self.settings.ticket_category, &Ticket::channel_name(&code), &grants)
            .await
        {
            Ok(channel) => channel,
            Err(e) => {
                error!(error = %e, code = %code, "Ticket channel creation failed");
                self.release_claim(&code).await;
                return Err(e.into());
            }
        };

        let draft = TicketDraft {
            channel,
            product: product.snapshot(),
            quantity,
        };
        let ticket = match self.tickets.open(code.clone(), draft).await {
            Ok(ticket) => ticket,
            Err(e) => {
                error!(error = %e, code = %code, "Ticket could not be persisted");
                self.release_claim(&code).await;
                if let Err(delete_err) = self.chat.delete_channel(channel).await {
                    warn!(error = %delete_err, "Orphan channel left behind");
                }
                return Err(e.into());
            }
        };

        self.notifier.to_channel(channel, notices::ticket_opened(&ticket)).await;
        self.notifier.to_channel(channel, notices::admin_panel(&ticket)).await;

        info!(code = %ticket.code, channel = %channel, total = %ticket.total, "Ticket opened");
        Ok(ticket)
    }

    async fn release_claim(&self, code: &TicketCode) {
        if let Err(e) = self.tickets.release(code.clone()).await {
            error!(error = %e, code = %code, "Claim release failed");
        }
    }

    #[instrument(skip(self, buyer), fields(buyer = %buyer.id))]
    async fn handle_choose_method(
        &self,
        buyer: Member,
        ticket_code: TicketCode,
        method: PaymentMethod,
    ) -> Result<Order, StorefrontError> {
        let ticket = self.load_ticket(&ticket_code).await?;
        if ticket.buyer != buyer.id {
            warn!("Payment method chosen by someone other than the buyer");
            return Err(StorefrontError::Unauthorized(buyer.id));
        }
        Self::require_open(&ticket)?;

        let payment_data = generate_payment_data(method, ticket.total);
        let order = self
            .orders
            .record_method_choice(OrderCreate {
                ticket_code: ticket.code.clone(),
                buyer: ticket.buyer,
                channel: ticket.channel,
                product: ticket.product.clone(),
                quantity: ticket.quantity,
                method,
                payment_data: payment_data.clone(),
            })
            .await?;
        self.tickets
            .attach_payment(ticket.code.clone(), method, payment_data)
            .await?;

        self.notifier
            .to_channel(ticket.channel, notices::payment_instructions(&order))
            .await;

        info!(order_id = %order.id, switched_from = ?order.switched_from, "Payment method recorded");
        Ok(order)
    }

    /// Approves the ticket's awaiting order.
    ///
    /// Stock is debited before anyone is notified. If the guarded order
    /// transition fails after the debit, the debit is credited back.
    #[instrument(skip(self, admin), fields(admin = %admin.id))]
    async fn handle_approve(&self, admin: Member, ticket_code: TicketCode) -> Result<Order, StorefrontError> {
        self.require_admin(&admin)?;

        let ticket = self.load_ticket(&ticket_code).await?;
        let order = self
            .orders
            .find_by_ticket(ticket_code.clone())
            .await?
            .ok_or_else(|| StorefrontError::NotFound(format!("order for ticket {ticket_code}")))?;
        if order.status != OrderStatus::AwaitingPayment {
            warn!(status = order.status.as_str(), "Order already resolved");
            return Err(StorefrontError::AlreadyResolved {
                ticket_code,
                status: order.status,
            });
        }
        Self::require_open(&ticket)?;

        let product_id = order.product.product_id.clone();
        let quantity = order.quantity;
        if !self.products.check_available(product_id.clone(), quantity).await? {
            let available = self.products.stock_level(product_id).await?;
            info!(available, requested = quantity, "Approval refused for lack of stock");
            return Err(StorefrontError::InsufficientStock { requested: quantity, available });
        }
        let remaining = self.products.debit(product_id.clone(), quantity).await?;

        let order = match self.orders.mark_approved(ticket_code.clone(), admin.id).await {
            Ok(order) => order,
            Err(e) => {
                warn!(error = %e, "Order approval failed after debit, crediting stock back");
                self.restock(product_id, quantity).await;
                return Err(e.into());
            }
        };
        let ticket = match self
            .tickets
            .transition(ticket_code.clone(), TicketStatus::Approved, admin.id, None)
            .await
        {
            Ok(ticket) => ticket,
            Err(e) => {
                error!(error = %e, "Ticket transition failed after approval, undoing it");
                if let Err(revert_err) = self.orders.revert_approval(ticket_code.clone()).await {
                    error!(error = %revert_err, "Order approval could not be reverted");
                }
                self.restock(product_id, quantity).await;
                return Err(e.into());
            }
        };

        info!(order_id = %order.id, remaining, "Order approved");

        self.notifier
            .to_buyer(ticket.buyer, notices::approved_for_buyer(&ticket, &self.settings.delivery_link))
            .await;
        self.notifier
            .to_channel(ticket.channel, notices::approved_in_channel(&ticket, admin.id))
            .await;
        self.notifier
            .to_audit_log(notices::sale_logged(&ticket, &order, admin.id, remaining))
            .await;

        self.defer_close(&ticket).await?;
        Ok(order)
    }

    async fn restock(&self, product_id: ProductId, quantity: u32) {
        if let Err(e) = self.products.credit(product_id, quantity).await {
            error!(error = %e, quantity, "Stock compensation failed");
        }
    }

    /// Rejects the ticket. An awaiting order, if one exists, is rejected too;
    /// stock is never touched.
    #[instrument(skip(self, admin, reason), fields(admin = %admin.id))]
    async fn handle_reject(
        &self,
        admin: Member,
        ticket_code: TicketCode,
        reason: String,
    ) -> Result<Ticket, StorefrontError> {
        self.require_admin(&admin)?;
        let reason = reason.trim().to_string();
        if reason.is_empty() {
            return Err(ValidationError::EmptyReason.into());
        }

        let ticket = self.load_ticket(&ticket_code).await?;
        let order = self.orders.find_by_ticket(ticket_code.clone()).await?;
        if let Some(order) = &order {
            if order.status != OrderStatus::AwaitingPayment {
                return Err(StorefrontError::AlreadyResolved {
                    ticket_code,
                    status: order.status,
                });
            }
        }
        Self::require_open(&ticket)?;

        if order.is_some() {
            self.orders
                .mark_rejected(ticket_code.clone(), admin.id, reason.clone())
                .await?;
        } else {
            debug!("No order to reject, buyer never chose a payment method");
        }
        let ticket = self
            .tickets
            .transition(ticket_code, TicketStatus::Rejected, admin.id, Some(reason.clone()))
            .await?;

        info!(code = %ticket.code, "Ticket rejected");

        self.notifier
            .to_buyer(ticket.buyer, notices::rejected_for_buyer(&ticket, &reason))
            .await;
        self.notifier
            .to_channel(ticket.channel, notices::rejected_in_channel(admin.id, &reason))
            .await;
        self.notifier
            .to_audit_log(notices::rejection_logged(&ticket, admin.id, &reason))
            .await;

        self.defer_close(&ticket).await?;
        Ok(ticket)
    }

    async fn defer_close(&self, ticket: &Ticket) -> Result<(), StorefrontError> {
        let close_after = Utc::now() + self.settings.close_delay;
        self.tickets
            .schedule_close(ticket.code.clone(), close_after)
            .await?;
        self.closer.schedule(PendingClose {
            code: ticket.code.clone(),
            channel: ticket.channel,
            close_after,
        });
        debug!(close_after = %close_after, "Close scheduled");
        Ok(())
    }

    /// Closes an open ticket right away, without touching any order.
    #[instrument(skip(self, admin), fields(admin = %admin.id))]
    async fn handle_close(&self, admin: Member, ticket_code: TicketCode) -> Result<Ticket, StorefrontError> {
        self.require_admin(&admin)?;

        let ticket = self.load_ticket(&ticket_code).await?;
        if matches!(ticket.status, TicketStatus::Approved | TicketStatus::Rejected) {
            return Err(StorefrontError::InvalidTransition(format!(
                "ticket {} is {} and already scheduled to close",
                ticket.code, ticket.status
            )));
        }
        Self::require_open(&ticket)?;

        let ticket = self
            .tickets
            .transition(ticket_code, TicketStatus::Closed, admin.id, None)
            .await?;
        if let Err(e) = self.chat.delete_channel(ticket.channel).await {
            warn!(error = %e, channel = %ticket.channel, "Channel deletion failed");
        }
        self.notifier
            .to_audit_log(notices::closed_logged(&ticket, admin.id))
            .await;

        info!(code = %ticket.code, "Ticket closed by admin");
        Ok(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use crate::actor_framework::ResourceActor;
    use crate::domain::{PaymentData, Product, ProductCreate, UserId};
    use crate::messages::TicketRequest;
    use crate::order_actor::OrderService;
    use crate::platform::{InMemoryChat, RoleAdminPolicy};
    use crate::ticket_actor::TicketError;

    /// A ticket registry that serves one open ticket but refuses every
    /// status change.
    fn stubborn_registry(ticket: Ticket) -> TicketClient {
        let (sender, mut receiver) = mpsc::channel(10);
        tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                match request {
                    TicketRequest::GetTicket { respond_to, .. } => {
                        let _ = respond_to.send(Ok(Some(ticket.clone())));
                    }
                    TicketRequest::Transition { code, next, respond_to, .. } => {
                        let _ = respond_to.send(Err(TicketError::InvalidTransition {
                            code,
                            from: TicketStatus::Closed,
                            to: next,
                        }));
                    }
                    _ => break,
                }
            }
        });
        TicketClient::new(sender)
    }

    #[tokio::test]
    async fn test_failed_ticket_transition_undoes_the_approval() {
        let (product_actor, product_resource) = ResourceActor::<Product>::new(10, || "product_1".to_string());
        tokio::spawn(product_actor.run());
        let products = ProductClient::new(product_resource);
        let product_id = products
            .create_product(ProductCreate {
                name: "Robux 400".to_string(),
                price: Decimal::new(1000, 2),
                stock: 5,
                description: None,
                image_url: None,
                category_id: "category_1".to_string(),
                category_name: "Robux".to_string(),
            })
            .await
            .unwrap();
        let product = products.get_product(product_id.clone()).await.unwrap().unwrap();

        let (order_service, orders) = OrderService::new(10, || "order_1".to_string());
        tokio::spawn(order_service.run());
        let buyer = UserId(42);
        let code = "ABC123".to_string();
        orders
            .record_method_choice(OrderCreate {
                ticket_code: code.clone(),
                buyer,
                channel: ChannelId(10001),
                product: product.snapshot(),
                quantity: 2,
                method: PaymentMethod::PixCopyPaste,
                payment_data: PaymentData::Key("1234.5678.9012-34".to_string()),
            })
            .await
            .unwrap();

        let ticket = Ticket {
            code: code.clone(),
            buyer,
            channel: ChannelId(10001),
            product: product.snapshot(),
            quantity: 2,
            total: Decimal::new(2000, 2),
            status: TicketStatus::Open,
            created_at: Utc::now(),
            payment: None,
            resolution: None,
            close_after: None,
            closed_at: None,
        };
        let settings = CheckoutSettings {
            ticket_category: None,
            admin_roles: vec![RoleId(900)],
            audit_channel: None,
            close_delay: Duration::seconds(60),
            delivery_link: "https://example.com/private-server".to_string(),
        };
        let (service, checkout) = CheckoutService::new(
            10,
            products.clone(),
            stubborn_registry(ticket),
            orders.clone(),
            Arc::new(InMemoryChat::new()),
            Arc::new(RoleAdminPolicy::new(settings.admin_roles.clone())),
            settings,
        );
        tokio::spawn(service.run());

        let result = checkout.approve(Member::new(1).administrator(), code.clone()).await;
        assert!(matches!(result, Err(StorefrontError::InvalidTransition(_))));

        assert_eq!(products.stock_level(product_id).await.unwrap(), 5);
        let order = orders.find_by_ticket(code).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::AwaitingPayment);
        assert_eq!(order.approved_by, None);
    }
}
