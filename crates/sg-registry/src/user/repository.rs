//! User Repository Port
//!
//! Storage contract the user service depends on. Implementations own the
//! physical storage and the identity counter; the service owns no persistent
//! state and stays storage-agnostic.

use async_trait::async_trait;

use crate::error::Result;
use crate::user::entity::{User, UserCreation, UserId};

/// Storage port for principals.
///
/// Contract:
/// - Identities are assigned as `last_id + 1` and never reused within one
///   repository instance's lifetime, even after deletes.
/// - `create` must assign unique identities under concurrent use; the counter
///   advances atomically with the insert.
/// - Name uniqueness is checked by the service before `create`; an adapter
///   may additionally enforce it (the SQLite adapter does, surfacing
///   violations as `Conflict`).
/// - When constructed over a pre-populated store, `last_id` is seeded to the
///   maximum existing identity (0 when empty).
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up a principal by identity. Absence is not an error.
    async fn fetch_by_id(&self, id: UserId) -> Result<Option<User>>;

    /// Look up a principal by exact, case-sensitive name. At most one match
    /// under the uniqueness invariant.
    async fn fetch_by_name(&self, name: &str) -> Result<Option<User>>;

    /// Overwrite the stored principal at `id`. Fails with `NotFound` if no
    /// principal currently has that identity. The new state is visible
    /// atomically to concurrent readers of the same id.
    async fn save(&self, id: UserId, user: &User) -> Result<()>;

    /// Persist a new principal under the next identity and advance the
    /// counter. Returns the stored principal carrying the assigned identity.
    async fn create(&self, creation: &UserCreation) -> Result<User>;

    /// Remove and return the principal, or fail with `NotFound`.
    async fn remove(&self, id: UserId) -> Result<User>;

    /// Highest identity ever assigned by this repository instance.
    /// Monotonically non-decreasing; read-only to callers.
    async fn last_id(&self) -> Result<UserId>;
}
