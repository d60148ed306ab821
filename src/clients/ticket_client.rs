use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use crate::domain::{
    PaymentData, PaymentMethod, PendingClose, Ticket, TicketCode, TicketDraft, TicketStatus, UserId,
};
use crate::messages::TicketRequest;
use crate::ticket_actor::TicketError;

/// Client for the ticket registry.
#[derive(Clone)]
pub struct TicketClient {
    sender: mpsc::Sender<TicketRequest>,
}

impl TicketClient {
    pub fn new(sender: mpsc::Sender<TicketRequest>) -> Self {
        Self { sender }
    }

    pub async fn shutdown(&self) {
        let _ = self.sender.send(TicketRequest::Shutdown).await;
    }
}

client_method!(TicketClient => fn claim(buyer: UserId) -> TicketCode as TicketRequest::Claim, Error = TicketError);
client_method!(TicketClient => fn open(code: TicketCode, draft: TicketDraft) -> Ticket as TicketRequest::Open, Error = TicketError);
client_method!(TicketClient => fn release(code: TicketCode) -> () as TicketRequest::Release, Error = TicketError);
client_method!(TicketClient => fn attach_payment(code: TicketCode, method: PaymentMethod, data: PaymentData) -> Ticket as TicketRequest::AttachPayment, Error = TicketError);
client_method!(TicketClient => fn transition(code: TicketCode, next: TicketStatus, by: UserId, reason: Option<String>) -> Ticket as TicketRequest::Transition, Error = TicketError);
client_method!(TicketClient => fn schedule_close(code: TicketCode, close_after: DateTime<Utc>) -> Ticket as TicketRequest::ScheduleClose, Error = TicketError);
client_method!(TicketClient => fn complete_close(code: TicketCode) -> bool as TicketRequest::CompleteClose, Error = TicketError);
client_method!(TicketClient => fn get_ticket(code: TicketCode) -> Option<Ticket> as TicketRequest::GetTicket, Error = TicketError);
client_method!(TicketClient => fn find_open_by_buyer(buyer: UserId) -> Option<Ticket> as TicketRequest::FindOpenByBuyer, Error = TicketError);
client_method!(TicketClient => fn list_open() -> Vec<Ticket> as TicketRequest::ListOpen, Error = TicketError);
client_method!(TicketClient => fn pending_closures() -> Vec<PendingClose> as TicketRequest::PendingClosures, Error = TicketError);
client_method!(TicketClient => fn snapshot() -> Vec<Ticket> as TicketRequest::Snapshot, Error = TicketError);
client_method!(TicketClient => fn restore(tickets: Vec<Ticket>) -> usize as TicketRequest::Restore, Error = TicketError);
