//! Category entities for the catalog selectors.

pub mod entity;
pub mod error;

pub use error::*;
