use serde::{Deserialize, Serialize};
use std::fmt;

/// The two instant-payment options offered in a ticket channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// A copy-paste payment key.
    PixCopyPaste,
    /// A scannable payment code.
    PixQrCode,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::PixCopyPaste => "Pix Copia e Cola",
            PaymentMethod::PixQrCode => "QR Code Pix",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Generated payment artefact handed to the buyer. Cosmetic only: nothing here
/// talks to a payment processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PaymentData {
    Key(String),
    QrPayload(String),
}

impl PaymentData {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentData::Key(value) | PaymentData::QrPayload(value) => value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Awaiting,
    Confirmed,
    Refused,
}
