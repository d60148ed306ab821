use thiserror::Error;
use crate::actor_framework::FrameworkError;
use crate::domain::{OrderStatus, TicketCode};

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("No order for ticket {0}")]
    NotFound(TicketCode),
    #[error("Order for ticket {ticket_code} is already {}", status.as_str())]
    AlreadyResolved {
        ticket_code: TicketCode,
        status: OrderStatus,
    },
    #[error("Order for ticket {ticket_code} is {}, not approved", status.as_str())]
    NotApproved {
        ticket_code: TicketCode,
        status: OrderStatus,
    },
    #[error("Order validation error: {0}")]
    ValidationError(String),
    #[error("No unused order id after {0} attempts")]
    IdSpaceExhausted(usize),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for OrderError {
    fn from(e: FrameworkError) -> Self {
        OrderError::ActorCommunicationError(e.to_string())
    }
}
