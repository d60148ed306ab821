use super::{RoleId, UserId};

/// A guild member performing an interaction, as seen by the capability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: UserId,
    pub roles: Vec<RoleId>,
    /// Platform-level administrator permission, independent of roles.
    pub is_administrator: bool,
}

impl Member {
    pub fn new(id: u64) -> Self {
        Self {
            id: UserId(id),
            roles: Vec::new(),
            is_administrator: false,
        }
    }

    pub fn with_role(mut self, role: RoleId) -> Self {
        self.roles.push(role);
        self
    }

    pub fn administrator(mut self) -> Self {
        self.is_administrator = true;
        self
    }
}
