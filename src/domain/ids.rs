use serde::{Deserialize, Serialize};
use std::fmt;

pub type ProductId = String;
pub type CategoryId = String;
pub type OrderId = String;
/// Six-character human-readable ticket code, e.g. `K3Z9QA`.
pub type TicketCode = String;

macro_rules! platform_id {
    ($name:ident) => {
        /// Numeric identity assigned by the chat platform.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

platform_id!(UserId);
platform_id!(ChannelId);
platform_id!(RoleId);
