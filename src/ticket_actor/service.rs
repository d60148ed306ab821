use std::collections::HashMap;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use crate::clients::TicketClient;
use crate::domain::{
    line_total, PaymentData, PaymentInfo, PaymentMethod, PaymentStatus, PendingClose, Resolution,
    Ticket, TicketCode, TicketDraft, TicketStatus, UserId,
};
use crate::messages::TicketRequest;
use super::error::TicketError;

/// How many generated codes may collide before a claim gives up.
pub const MAX_CODE_ATTEMPTS: usize = 32;

/// Registry actor for purchase tickets.
///
/// Opening is two-phase. `claim` reserves the buyer's single ticket slot and a
/// unique code before any channel exists; `open` turns the claim into a ticket
/// once the channel has been created, and `release` gives the slot back if it
/// could not be. Claims are not tickets and never show up in queries.
pub struct TicketService {
    receiver: mpsc::Receiver<TicketRequest>,
    tickets: HashMap<TicketCode, Ticket>,
    claims: HashMap<TicketCode, UserId>,
    next_code_fn: Box<dyn Fn() -> TicketCode + Send + Sync>,
}

impl TicketService {
    pub fn new(
        buffer_size: usize,
        next_code_fn: impl Fn() -> TicketCode + Send + Sync + 'static,
    ) -> (Self, TicketClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            tickets: HashMap::new(),
            claims: HashMap::new(),
            next_code_fn: Box::new(next_code_fn),
        };
        (service, TicketClient::new(sender))
    }

    #[instrument(name = "ticket_service", skip(self))]
    pub async fn run(mut self) {
        info!("TicketService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                TicketRequest::Claim { buyer, respond_to } => {
                    let _ = respond_to.send(self.handle_claim(buyer));
                }
                TicketRequest::Open { code, draft, respond_to } => {
                    let _ = respond_to.send(self.handle_open(code, draft));
                }
                TicketRequest::Release { code, respond_to } => {
                    self.handle_release(code);
                    let _ = respond_to.send(Ok(()));
                }
                TicketRequest::AttachPayment { code, method, data, respond_to } => {
                    let _ = respond_to.send(self.handle_attach_payment(code, method, data));
                }
                TicketRequest::Transition { code, next, by, reason, respond_to } => {
                    let _ = respond_to.send(self.handle_transition(code, next, by, reason));
                }
                TicketRequest::ScheduleClose { code, close_after, respond_to } => {
                    let _ = respond_to.send(self.handle_schedule_close(code, close_after));
                }
                TicketRequest::CompleteClose { code, respond_to } => {
                    let _ = respond_to.send(self.handle_complete_close(code));
                }
                TicketRequest::GetTicket { code, respond_to } => {
                    let _ = respond_to.send(Ok(self.tickets.get(&code).cloned()));
                }
                TicketRequest::FindOpenByBuyer { buyer, respond_to } => {
                    let _ = respond_to.send(Ok(self.open_ticket_of(buyer).cloned()));
                }
                TicketRequest::ListOpen { respond_to } => {
                    let _ = respond_to.send(Ok(self.list_open()));
                }
                TicketRequest::PendingClosures { respond_to } => {
                    let _ = respond_to.send(Ok(self.pending_closures()));
                }
                TicketRequest::Snapshot { respond_to } => {
                    let _ = respond_to.send(Ok(self.tickets.values().cloned().collect()));
                }
                TicketRequest::Restore { tickets, respond_to } => {
                    let _ = respond_to.send(Ok(self.restore(tickets)));
                }
                TicketRequest::Shutdown => {
                    info!("TicketService shutting down");
                    break;
                }
            }
        }

        info!("TicketService stopped");
    }

    fn open_ticket_of(&self, buyer: UserId) -> Option<&Ticket> {
        self.tickets.values().find(|t| t.buyer == buyer && t.is_open())
    }

    /// Adds snapshot tickets. A code already in use, or a second open ticket
    /// for a buyer who already has one open or claimed, is skipped.
    fn restore(&mut self, tickets: Vec<Ticket>) -> usize {
        let mut count = 0;
        for ticket in tickets {
            if self.tickets.contains_key(&ticket.code) || self.claims.contains_key(&ticket.code) {
                debug!(code = %ticket.code, "Skipping duplicate ticket on restore");
                continue;
            }
            let buyer_busy = self.open_ticket_of(ticket.buyer).is_some()
                || self.claims.values().any(|&b| b == ticket.buyer);
            if ticket.is_open() && buyer_busy {
                warn!(code = %ticket.code, buyer = %ticket.buyer, "Skipping second open ticket on restore");
                continue;
            }
            self.tickets.insert(ticket.code.clone(), ticket);
            count += 1;
        }
        info!(count, "Tickets restored");
        count
    }

    /// Check-and-reserve in one message: no second claim can slip in between.
    #[instrument(skip(self))]
    fn handle_claim(&mut self, buyer: UserId) -> Result<TicketCode, TicketError> {
        debug!("Processing claim request");

        if let Some(existing) = self.open_ticket_of(buyer) {
            warn!(existing = %existing.code, "Buyer already has an open ticket");
            return Err(TicketError::DuplicateOpenTicket {
                buyer,
                existing: existing.code.clone(),
            });
        }
        if let Some((code, _)) = self.claims.iter().find(|(_, b)| **b == buyer) {
            warn!(existing = %code, "Buyer already has a ticket being opened");
            return Err(TicketError::DuplicateOpenTicket {
                buyer,
                existing: code.clone(),
            });
        }

        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = (self.next_code_fn)();
            if self.tickets.contains_key(&code) || self.claims.contains_key(&code) {
                warn!(code = %code, "Ticket code collision, regenerating");
                continue;
            }
            self.claims.insert(code.clone(), buyer);
            info!(code = %code, "Ticket code claimed");
            return Ok(code);
        }

        error!("Ticket code space exhausted");
        Err(TicketError::CodeSpaceExhausted(MAX_CODE_ATTEMPTS))
    }

    #[instrument(fields(channel = %draft.channel, quantity = draft.quantity), skip(self, draft))]
    fn handle_open(&mut self, code: TicketCode, draft: TicketDraft) -> Result<Ticket, TicketError> {
        let total = line_total(draft.product.unit_price, draft.quantity)?;
        let buyer = self
            .claims
            .remove(&code)
            .ok_or_else(|| TicketError::UnknownClaim(code.clone()))?;

        let ticket = Ticket {
            code: code.clone(),
            buyer,
            channel: draft.channel,
            total,
            product: draft.product,
            quantity: draft.quantity,
            status: TicketStatus::Open,
            created_at: Utc::now(),
            payment: None,
            resolution: None,
            close_after: None,
            closed_at: None,
        };
        self.tickets.insert(code, ticket.clone());

        info!(total = %ticket.total, "Ticket opened");
        Ok(ticket)
    }

    #[instrument(skip(self))]
    fn handle_release(&mut self, code: TicketCode) {
        match self.claims.remove(&code) {
            Some(buyer) => info!(buyer = %buyer, "Claim released"),
            None => debug!("No claim to release"),
        }
    }

    #[instrument(skip(self, data))]
    fn handle_attach_payment(
        &mut self,
        code: TicketCode,
        method: PaymentMethod,
        data: PaymentData,
    ) -> Result<Ticket, TicketError> {
        let ticket = self
            .tickets
            .get_mut(&code)
            .ok_or_else(|| TicketError::NotFound(code.clone()))?;
        if !ticket.is_open() {
            return Err(TicketError::NotOpen { code, status: ticket.status });
        }

        ticket.payment = Some(PaymentInfo {
            method,
            data,
            status: PaymentStatus::Awaiting,
        });
        info!("Payment method attached");
        Ok(ticket.clone())
    }

    #[instrument(skip(self, reason))]
    fn handle_transition(
        &mut self,
        code: TicketCode,
        next: TicketStatus,
        by: UserId,
        reason: Option<String>,
    ) -> Result<Ticket, TicketError> {
        let ticket = self
            .tickets
            .get_mut(&code)
            .ok_or_else(|| TicketError::NotFound(code.clone()))?;

        let from = ticket.status;
        if !from.can_transition_to(next) {
            warn!(from = %from, "Rejected ticket transition");
            return Err(TicketError::InvalidTransition { code, from, to: next });
        }

        let now = Utc::now();
        ticket.status = next;
        match next {
            TicketStatus::Approved | TicketStatus::Rejected => {
                ticket.resolution = Some(Resolution { by, at: now, reason });
                if let Some(payment) = ticket.payment.as_mut() {
                    payment.status = if next == TicketStatus::Approved {
                        PaymentStatus::Confirmed
                    } else {
                        PaymentStatus::Refused
                    };
                }
            }
            TicketStatus::Closed => {
                if ticket.resolution.is_none() {
                    ticket.resolution = Some(Resolution { by, at: now, reason });
                }
                ticket.close_after = None;
                ticket.closed_at = Some(now);
            }
            TicketStatus::Open => {}
        }

        info!(from = %from, "Ticket transitioned");
        Ok(ticket.clone())
    }

    #[instrument(skip(self))]
    fn handle_schedule_close(
        &mut self,
        code: TicketCode,
        close_after: DateTime<Utc>,
    ) -> Result<Ticket, TicketError> {
        let ticket = self
            .tickets
            .get_mut(&code)
            .ok_or_else(|| TicketError::NotFound(code.clone()))?;
        if !matches!(ticket.status, TicketStatus::Approved | TicketStatus::Rejected) {
            return Err(TicketError::InvalidTransition {
                code,
                from: ticket.status,
                to: TicketStatus::Closed,
            });
        }

        ticket.close_after = Some(close_after);
        debug!("Deferred close recorded");
        Ok(ticket.clone())
    }

    /// Finishes a deferred close. Returns `false` when the ticket was already
    /// closed, so repeated timers or a recovery sweep cannot close twice.
    #[instrument(skip(self))]
    fn handle_complete_close(&mut self, code: TicketCode) -> Result<bool, TicketError> {
        let ticket = self
            .tickets
            .get_mut(&code)
            .ok_or_else(|| TicketError::NotFound(code.clone()))?;

        match ticket.status {
            TicketStatus::Closed => {
                debug!("Ticket already closed");
                Ok(false)
            }
            TicketStatus::Approved | TicketStatus::Rejected => {
                ticket.status = TicketStatus::Closed;
                ticket.close_after = None;
                ticket.closed_at = Some(Utc::now());
                info!("Ticket closed after delay");
                Ok(true)
            }
            TicketStatus::Open => Err(TicketError::InvalidTransition {
                code,
                from: TicketStatus::Open,
                to: TicketStatus::Closed,
            }),
        }
    }

    fn list_open(&self) -> Vec<Ticket> {
        let mut open: Vec<Ticket> = self.tickets.values().filter(|t| t.is_open()).cloned().collect();
        open.sort_by_key(|t| t.created_at);
        open
    }

    fn pending_closures(&self) -> Vec<PendingClose> {
        let mut pending: Vec<PendingClose> = self
            .tickets
            .values()
            .filter(|t| matches!(t.status, TicketStatus::Approved | TicketStatus::Rejected))
            .filter_map(|t| {
                t.close_after.map(|close_after| PendingClose {
                    code: t.code.clone(),
                    channel: t.channel,
                    close_after,
                })
            })
            .collect();
        pending.sort_by_key(|p| p.close_after);
        pending
    }
}
