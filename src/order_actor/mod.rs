//! Order record store: one order per ticket, guarded status changes.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
