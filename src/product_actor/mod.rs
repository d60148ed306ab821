//! Product-specific domain logic: the inventory ledger actions.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
