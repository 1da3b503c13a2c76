//! Persisted memberships (§4.10 "explicit membership on the company or
//! project").

use dashmap::DashMap;
use nebula_core::{Role, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipScope {
    Company(nebula_core::OrganizationId),
    Project(nebula_core::ProjectId),
}

#[derive(Default)]
pub struct MembershipStore {
    memberships: DashMap<(UserId, MembershipScope), Role>,
}

impl MembershipStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, user_id: UserId, scope: MembershipScope, role: Role) {
        self.memberships.insert((user_id, scope), role);
    }

    pub fn revoke(&self, user_id: UserId, scope: MembershipScope) {
        self.memberships.remove(&(user_id, scope));
    }

    #[must_use]
    pub fn role(&self, user_id: UserId, scope: MembershipScope) -> Option<Role> {
        self.memberships.get(&(user_id, scope)).map(|r| *r)
    }

    #[must_use]
    pub fn list_for_user(&self, user_id: UserId) -> Vec<(MembershipScope, Role)> {
        self.memberships.iter().filter(|entry| entry.key().0 == user_id).map(|entry| (entry.key().1, *entry.value())).collect()
    }
}
