pub mod ids;
pub mod member;
pub mod money;
pub mod product;
pub mod category;
pub mod payment;
pub mod ticket;
pub mod order;

pub use ids::*;
pub use member::*;
pub use money::*;
pub use product::*;
pub use category::*;
pub use payment::*;
pub use ticket::*;
pub use order::*;
