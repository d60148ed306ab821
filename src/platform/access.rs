use crate::domain::{Member, RoleId, UserId};
use super::chat::{GrantTarget, PermissionGrant};

/// Decides whether a member holds the admin capability.
pub trait CapabilityCheck: Send + Sync {
    fn is_admin(&self, member: &Member) -> bool;
}

/// Admin if the member has any configured admin role or the platform-level
/// administrator permission.
#[derive(Debug, Clone, Default)]
pub struct RoleAdminPolicy {
    admin_roles: Vec<RoleId>,
}

impl RoleAdminPolicy {
    pub fn new(admin_roles: Vec<RoleId>) -> Self {
        Self { admin_roles }
    }

    pub fn admin_roles(&self) -> &[RoleId] {
        &self.admin_roles
    }
}

impl CapabilityCheck for RoleAdminPolicy {
    fn is_admin(&self, member: &Member) -> bool {
        member.is_administrator || member.roles.iter().any(|r| self.admin_roles.contains(r))
    }
}

/// Visibility for a ticket channel: hidden from everyone except the buyer,
/// the admin roles and the bot.
pub fn ticket_channel_grants(buyer: UserId, admin_roles: &[RoleId]) -> Vec<PermissionGrant> {
    let mut grants = vec![
        PermissionGrant::deny(GrantTarget::Everyone),
        PermissionGrant::allow(GrantTarget::User(buyer)),
    ];
    grants.extend(admin_roles.iter().map(|&role| PermissionGrant::allow(GrantTarget::Role(role))));
    grants.push(PermissionGrant::allow(GrantTarget::Bot));
    grants
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_by_role_or_flag() {
        let policy = RoleAdminPolicy::new(vec![RoleId(10)]);
        assert!(policy.is_admin(&Member::new(1).with_role(RoleId(10))));
        assert!(policy.is_admin(&Member::new(2).administrator()));
        assert!(!policy.is_admin(&Member::new(3).with_role(RoleId(11))));
    }

    #[test]
    fn test_ticket_channel_hidden_from_everyone() {
        let grants = ticket_channel_grants(UserId(5), &[RoleId(10)]);
        assert_eq!(grants[0], PermissionGrant::deny(GrantTarget::Everyone));
        assert!(grants.contains(&PermissionGrant::allow(GrantTarget::User(UserId(5)))));
        assert!(grants.contains(&PermissionGrant::allow(GrantTarget::Role(RoleId(10)))));
        assert!(grants.contains(&PermissionGrant::allow(GrantTarget::Bot)));
    }
}
