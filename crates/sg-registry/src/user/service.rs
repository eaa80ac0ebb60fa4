//! User Service
//!
//! Authorization-aware mutation logic over the repository port. Every
//! mutation is gated by scope domination relative to the caller: a principal
//! may only act on targets whose scope it dominates, and may never assign a
//! scope above its own.
//!
//! The caller is not service state. Mutating operations live on
//! [`BoundUserService`], a short-lived handle produced per logical operation
//! by [`UserService::on_behalf_of`], so concurrent requests by different
//! callers can share one `UserService` without ever sharing an identity.
//! Calling a mutation without a bound caller is rejected by the compiler
//! rather than at runtime.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{RegistryError, Result};
use crate::user::entity::{User, UserCreation, UserId, UserUpdate};
use crate::user::repository::UserRepository;

/// Stateless core. Holds the storage port and nothing else.
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Look up a principal by identity. Reading is unrestricted at this
    /// layer; authentication upstream is the only gate.
    pub async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        self.repository.fetch_by_id(id).await
    }

    /// Produce a handle bound to the given caller for one logical operation.
    pub fn on_behalf_of(&self, caller: User) -> BoundUserService<'_> {
        BoundUserService {
            service: self,
            caller,
        }
    }
}

/// Per-operation handle closing over the caller identity.
pub struct BoundUserService<'a> {
    service: &'a UserService,
    caller: User,
}

impl BoundUserService<'_> {
    pub fn caller(&self) -> &User {
        &self.caller
    }

    fn repository(&self) -> &dyn UserRepository {
        self.service.repository.as_ref()
    }

    /// Overwrite name and scope of an existing principal.
    ///
    /// The caller must dominate both the target's current scope (a weaker
    /// principal cannot touch a stronger account at all) and the requested
    /// scope (no privilege escalation through the payload). The two checks
    /// are independent; delete and create each apply only one of them.
    pub async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<User> {
        let target = self
            .repository()
            .fetch_by_id(id)
            .await?
            .ok_or_else(|| RegistryError::not_found(id))?;

        if !self.caller.dominates(target.scope) || !self.caller.dominates(update.scope) {
            debug!(
                caller_id = self.caller.id,
                target_id = id,
                caller_scope = self.caller.scope,
                target_scope = target.scope,
                requested_scope = update.scope,
                "Update rejected: caller scope does not dominate"
            );
            return Err(RegistryError::forbidden(
                "caller scope does not dominate target and requested scope",
            ));
        }

        let updated = target.apply(&update);
        self.repository().save(id, &updated).await?;
        info!(caller_id = self.caller.id, user_id = id, "Updated user");
        Ok(updated)
    }

    /// Create a new principal with a repository-assigned identity.
    ///
    /// The name check below is check-then-act against the repository and is
    /// not protected by a cross-call lock: two concurrent creates for the
    /// same name can both pass it. The SQLite adapter backstops this with a
    /// UNIQUE constraint surfaced as `Conflict`; the in-memory reference
    /// repository does not.
    pub async fn create_user(&self, creation: UserCreation) -> Result<User> {
        if self
            .repository()
            .fetch_by_name(&creation.name)
            .await?
            .is_some()
        {
            return Err(RegistryError::conflict(&creation.name));
        }

        if !self.caller.dominates(creation.scope) {
            debug!(
                caller_id = self.caller.id,
                caller_scope = self.caller.scope,
                requested_scope = creation.scope,
                "Create rejected: caller scope does not dominate requested scope"
            );
            return Err(RegistryError::forbidden(
                "caller scope does not dominate requested scope",
            ));
        }

        let created = self.repository().create(&creation).await?;
        info!(
            caller_id = self.caller.id,
            user_id = created.id,
            name = %created.name,
            "Created user"
        );
        Ok(created)
    }

    /// Remove a principal. Only the target's current scope is checked;
    /// deletion assigns no new scope.
    pub async fn delete_user(&self, id: UserId) -> Result<User> {
        let target = self
            .repository()
            .fetch_by_id(id)
            .await?
            .ok_or_else(|| RegistryError::not_found(id))?;

        if !self.caller.dominates(target.scope) {
            debug!(
                caller_id = self.caller.id,
                target_id = id,
                caller_scope = self.caller.scope,
                target_scope = target.scope,
                "Delete rejected: caller scope does not dominate"
            );
            return Err(RegistryError::forbidden(
                "caller scope does not dominate target scope",
            ));
        }

        let removed = self.repository().remove(id).await?;
        info!(caller_id = self.caller.id, user_id = id, "Deleted user");
        Ok(removed)
    }
}
