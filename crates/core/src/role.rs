//! The effective-role lattice used by the permission service (§4.10, P4).

use serde::{Deserialize, Serialize};

/// A role within the Company → Project → Workflow membership hierarchy.
///
/// Ordered `Owner > Admin > Editor > Viewer`; derives [`Ord`] from
/// declaration order so `Role::Viewer < Role::Editor` etc. holds directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Viewer,
    Editor,
    Admin,
    Owner,
}

impl Role {
    /// `true` iff `self` is at least as privileged as `min`. Satisfies P4:
    /// `RoleAtLeast(r, r) == true` for every `r`.
    #[must_use]
    pub fn at_least(self, min: Role) -> bool {
        self >= min
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Viewer => "viewer",
            Role::Editor => "editor",
            Role::Admin => "admin",
            Role::Owner => "owner",
        };
        write!(f, "{s}")
    }
}
