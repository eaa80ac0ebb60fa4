//! User Entity
//!
//! A registered principal: stable numeric identity, unique display name, and
//! an integer privilege scope. Higher scope dominates lower under a total
//! order by magnitude.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identity assigned by the repository. Positive once assigned, never reused
/// within a repository instance's lifetime.
pub type UserId = i64;

/// Privilege level. Higher is more privileged.
pub type Scope = u32;

/// A registered principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: UserId,
    /// Display name, unique across all principals
    pub name: String,
    pub scope: Scope,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>, scope: Scope) -> Self {
        Self {
            id,
            name: name.into(),
            scope,
        }
    }

    /// Whether this principal's scope dominates the given scope.
    pub fn dominates(&self, scope: Scope) -> bool {
        self.scope >= scope
    }

    /// Apply an update, preserving the identity.
    pub fn apply(&self, update: &UserUpdate) -> Self {
        Self {
            id: self.id,
            name: update.name.clone(),
            scope: update.scope,
        }
    }
}

/// Request to create a principal. No identity yet; the repository assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserCreation {
    pub name: String,
    pub scope: Scope,
}

impl UserCreation {
    pub fn new(name: impl Into<String>, scope: Scope) -> Self {
        Self {
            name: name.into(),
            scope,
        }
    }
}

/// Request to overwrite name and scope of an existing principal. The identity
/// comes from the operation target, not the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserUpdate {
    pub name: String,
    pub scope: Scope,
}

impl UserUpdate {
    pub fn new(name: impl Into<String>, scope: Scope) -> Self {
        Self {
            name: name.into(),
            scope,
        }
    }
}
