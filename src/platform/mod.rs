//! Collaborators the storefront consumes: the chat surface and the
//! capability check.

pub mod access;
pub mod chat;
pub mod memory;

pub use access::*;
pub use chat::*;
pub use memory::*;
