use thiserror::Error;
use crate::actor_framework::FrameworkError;
use crate::category_actor::CategoryError;
use crate::domain::{OrderStatus, TicketCode, UserId, ValidationError};
use crate::order_actor::OrderError;
use crate::platform::ChatError;
use crate::product_actor::ProductError;
use crate::ticket_actor::TicketError;

/// Errors surfaced to the acting user by the storefront entry points.
///
/// Domain errors mean the action was refused and nothing changed.
/// `ExternalIo` on a critical step (channel creation) also aborts before any
/// ticket is persisted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorefrontError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Buyer {buyer} already has open ticket {existing}")]
    DuplicateOpenTicket { buyer: UserId, existing: TicketCode },
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },
    #[error("User {0} lacks the required capability")]
    Unauthorized(UserId),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Order for ticket {ticket_code} is already {}", status.as_str())]
    AlreadyResolved {
        ticket_code: TicketCode,
        status: OrderStatus,
    },
    #[error("Cart expired, start a new purchase")]
    CartExpired,
    #[error("Category still has {count} linked products")]
    CategoryInUse { count: usize },
    #[error("External platform failure: {0}")]
    ExternalIo(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FrameworkError> for StorefrontError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => StorefrontError::NotFound(id),
            other => StorefrontError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationError> for StorefrontError {
    fn from(e: ValidationError) -> Self {
        StorefrontError::Validation(e.to_string())
    }
}

impl From<ProductError> for StorefrontError {
    fn from(e: ProductError) -> Self {
        match e {
            ProductError::NotFound(id) => StorefrontError::NotFound(format!("product {id}")),
            ProductError::InsufficientStock { requested, available } => {
                StorefrontError::InsufficientStock { requested, available }
            }
            ProductError::InvalidQuantity(_) | ProductError::ValidationError(_) => {
                StorefrontError::Validation(e.to_string())
            }
            ProductError::StockOverflow { .. } => StorefrontError::Validation(e.to_string()),
            ProductError::ActorCommunicationError(msg) => StorefrontError::Internal(msg),
        }
    }
}

impl From<CategoryError> for StorefrontError {
    fn from(e: CategoryError) -> Self {
        match e {
            CategoryError::NotFound(id) => StorefrontError::NotFound(format!("category {id}")),
            CategoryError::ValidationError(msg) => StorefrontError::Validation(msg),
            CategoryError::InUse { count } => StorefrontError::CategoryInUse { count },
            CategoryError::ActorCommunicationError(msg) => StorefrontError::Internal(msg),
        }
    }
}

impl From<TicketError> for StorefrontError {
    fn from(e: TicketError) -> Self {
        match e {
            TicketError::NotFound(code) => StorefrontError::NotFound(format!("ticket {code}")),
            TicketError::DuplicateOpenTicket { buyer, existing } => {
                StorefrontError::DuplicateOpenTicket { buyer, existing }
            }
            TicketError::InvalidTransition { .. } | TicketError::NotOpen { .. } => {
                StorefrontError::InvalidTransition(e.to_string())
            }
            TicketError::Validation(e) => StorefrontError::Validation(e.to_string()),
            TicketError::UnknownClaim(_) | TicketError::CodeSpaceExhausted(_) => {
                StorefrontError::Internal(e.to_string())
            }
            TicketError::ActorCommunicationError(msg) => StorefrontError::Internal(msg),
        }
    }
}

impl From<OrderError> for StorefrontError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NotFound(code) => StorefrontError::NotFound(format!("order for ticket {code}")),
            OrderError::AlreadyResolved { ticket_code, status } => {
                StorefrontError::AlreadyResolved { ticket_code, status }
            }
            OrderError::ValidationError(msg) => StorefrontError::Validation(msg),
            OrderError::NotApproved { .. } => StorefrontError::InvalidTransition(e.to_string()),
            OrderError::IdSpaceExhausted(_) => StorefrontError::Internal(e.to_string()),
            OrderError::ActorCommunicationError(msg) => StorefrontError::Internal(msg),
        }
    }
}

impl From<ChatError> for StorefrontError {
    fn from(e: ChatError) -> Self {
        StorefrontError::ExternalIo(e.to_string())
    }
}
