//! Typed clients: the only way code outside an actor talks to it.

#[macro_use]
mod macros;

pub mod catalog_client;
pub mod category_client;
pub mod checkout_client;
pub mod order_client;
pub mod product_client;
pub mod reports_client;
pub mod ticket_client;

pub use catalog_client::*;
pub use category_client::*;
pub use checkout_client::*;
pub use order_client::*;
pub use product_client::*;
pub use reports_client::*;
pub use ticket_client::*;
