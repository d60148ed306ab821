use thiserror::Error;
use crate::actor_framework::FrameworkError;
use crate::domain::{TicketCode, TicketStatus, UserId, ValidationError};

/// Errors that can occur during ticket operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TicketError {
    #[error("Ticket not found: {0}")]
    NotFound(TicketCode),
    #[error("Buyer {buyer} already has ticket {existing} in progress")]
    DuplicateOpenTicket { buyer: UserId, existing: TicketCode },
    #[error("No outstanding claim for ticket code {0}")]
    UnknownClaim(TicketCode),
    #[error("Ticket {code} cannot move from {from} to {to}")]
    InvalidTransition {
        code: TicketCode,
        from: TicketStatus,
        to: TicketStatus,
    },
    #[error("Ticket {code} is {status}, not open")]
    NotOpen { code: TicketCode, status: TicketStatus },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("No unused ticket code after {0} attempts")]
    CodeSpaceExhausted(usize),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for TicketError {
    fn from(e: FrameworkError) -> Self {
        TicketError::ActorCommunicationError(e.to_string())
    }
}
