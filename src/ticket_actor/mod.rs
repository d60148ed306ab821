//! Ticket registry: owns the one-open-ticket-per-buyer invariant and the
//! ticket status machine.

pub mod code;
pub mod error;
pub mod service;

pub use code::*;
pub use error::*;
pub use service::*;
