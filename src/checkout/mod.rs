//! Order state machine: sequences the ledger, the registry and the order store
//! for each purchase step.

pub mod cart;
pub mod closer;
pub mod notices;
pub mod payment;
pub mod service;

pub use cart::*;
pub use closer::*;
pub use service::*;
