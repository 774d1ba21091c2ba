//! Role Registry
//!
//! A plain relation between roles and the accounts holding them. The registry
//! performs no authorization of its own; the engine checks that the caller is
//! an administrator before it calls `grant` or `revoke`.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use lib_types::Address;

/// Role enumeration for authority checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Role administration, treasury updates, asset rescue
    Administrator,
    /// Supply issuance against a verification id
    Verifier,
    /// Emergency pause
    Pauser,
}

impl Role {
    /// Every role, in a stable order
    pub const ALL: [Role; 3] = [Role::Administrator, Role::Verifier, Role::Pauser];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Verifier => "verifier",
            Role::Pauser => "pauser",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps roles to sets of authorized addresses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRegistry {
    members: HashMap<Role, HashSet<Address>>,
}

impl RoleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every role granted to `admin`
    pub fn with_admin(admin: Address) -> Self {
        let mut registry = Self::new();
        for role in Role::ALL {
            registry.grant(role, admin);
        }
        registry
    }

    /// Add an address to a role. Returns false if it already held the role.
    pub fn grant(&mut self, role: Role, address: Address) -> bool {
        self.members.entry(role).or_default().insert(address)
    }

    /// Remove an address from a role. Returns false if it did not hold the role.
    pub fn revoke(&mut self, role: Role, address: &Address) -> bool {
        match self.members.get_mut(&role) {
            Some(set) => {
                let removed = set.remove(address);
                if set.is_empty() {
                    self.members.remove(&role);
                }
                removed
            }
            None => false,
        }
    }

    /// Check if an address has a role
    pub fn has_role(&self, role: Role, address: &Address) -> bool {
        self.members
            .get(&role)
            .map(|set| set.contains(address))
            .unwrap_or(false)
    }

    /// All addresses holding a role
    pub fn members(&self, role: Role) -> impl Iterator<Item = &Address> {
        self.members
            .get(&role)
            .map(|set| set.iter())
            .into_iter()
            .flatten()
    }

    pub fn member_count(&self, role: Role) -> usize {
        self.members.get(&role).map(HashSet::len).unwrap_or(0)
    }

    /// Sorted `(role, address)` pairs, used for snapshots
    pub fn assignments(&self) -> Vec<(Role, Address)> {
        let mut pairs: Vec<(Role, Address)> = self
            .members
            .iter()
            .flat_map(|(role, set)| set.iter().map(move |addr| (*role, *addr)))
            .collect();
        pairs.sort();
        pairs
    }
}
