use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use super::{ChannelId, PaymentData, PaymentMethod, PaymentStatus, ProductSnapshot, TicketCode, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    Open,
    Approved,
    Rejected,
    Closed,
}

impl TicketStatus {
    /// Status graph:
    ///
    /// ```text
    /// open -> approved -> closed
    /// open -> rejected -> closed
    /// open -> closed
    /// ```
    pub fn can_transition_to(self, next: TicketStatus) -> bool {
        use TicketStatus::*;
        matches!(
            (self, next),
            (Open, Approved) | (Open, Rejected) | (Open, Closed) | (Approved, Closed) | (Rejected, Closed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::Approved => "approved",
            TicketStatus::Rejected => "rejected",
            TicketStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub method: PaymentMethod,
    pub data: PaymentData,
    pub status: PaymentStatus,
}

/// Who moved the ticket out of `Open`, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub by: UserId,
    pub at: DateTime<Utc>,
    pub reason: Option<String>,
}

/// A private purchase negotiation channel and its record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub code: TicketCode,
    pub buyer: UserId,
    pub channel: ChannelId,
    pub product: ProductSnapshot,
    pub quantity: u32,
    pub total: Decimal,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub payment: Option<PaymentInfo>,
    pub resolution: Option<Resolution>,
    /// Set when a deferred close is scheduled; survives restarts so the
    /// startup sweep can finish the close.
    pub close_after: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl Ticket {
    pub fn channel_name(code: &str) -> String {
        format!("ticket-{}", code.to_lowercase())
    }

    pub fn is_open(&self) -> bool {
        self.status == TicketStatus::Open
    }
}

/// Everything needed to turn a claimed code into an open ticket.
#[derive(Debug, Clone)]
pub struct TicketDraft {
    pub channel: ChannelId,
    pub product: ProductSnapshot,
    pub quantity: u32,
}

/// A scheduled close that has not completed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingClose {
    pub code: TicketCode,
    pub channel: ChannelId,
    pub close_after: DateTime<Utc>,
}
