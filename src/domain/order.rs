use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use super::{ChannelId, OrderId, PaymentData, PaymentMethod, ProductSnapshot, TicketCode, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    AwaitingPayment,
    Approved,
    Rejected,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::AwaitingPayment => "Aguardando Pagamento",
            OrderStatus::Approved => "Aprovado",
            OrderStatus::Rejected => "Rejeitado",
        }
    }
}

/// A persisted payment-method attempt tied to a ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub ticket_code: TicketCode,
    pub buyer: UserId,
    pub channel: ChannelId,
    pub product: ProductSnapshot,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total: Decimal,
    pub method: PaymentMethod,
    pub payment_data: PaymentData,
    /// The method this order replaced when the buyer changed their mind.
    pub switched_from: Option<PaymentMethod>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub approved_by: Option<UserId>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_by: Option<UserId>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

/// Payload for recording a payment-method choice.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub ticket_code: TicketCode,
    pub buyer: UserId,
    pub channel: ChannelId,
    pub product: ProductSnapshot,
    pub quantity: u32,
    pub method: PaymentMethod,
    pub payment_data: PaymentData,
}

/// One row of the top-sellers aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct SellerRow {
    pub product_name: String,
    pub quantity: u64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SalesSummary {
    pub approved_count: usize,
    pub awaiting_count: usize,
    pub rejected_count: usize,
    pub revenue: Decimal,
}
