//! In-Memory User Repository
//!
//! Reference implementation of the repository port. A single mutex guards the
//! map and the identity counter, so identity assignment is atomic across
//! concurrent creates. Name uniqueness is deliberately not enforced here; the
//! service checks it first, and that check-then-act is racy by design (see
//! `BoundUserService::create_user`).

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{RegistryError, Result};
use crate::user::entity::{User, UserCreation, UserId};
use crate::user::repository::UserRepository;

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, User>,
    last_id: UserId,
}

/// In-memory repository. Cheap to construct per test, usable as a shared
/// store behind an `Arc` in the server.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    inner: Mutex<Inner>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct over pre-existing principals. The counter is seeded to the
    /// maximum existing identity so later creates never collide.
    pub fn seeded(users: impl IntoIterator<Item = User>) -> Self {
        let mut inner = Inner::default();
        for user in users {
            inner.last_id = inner.last_id.max(user.id);
            inner.users.insert(user.id, user);
        }
        Self {
            inner: Mutex::new(inner),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn fetch_by_id(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.inner.lock().users.get(&id).cloned())
    }

    async fn fetch_by_name(&self, name: &str) -> Result<Option<User>> {
        Ok(self
            .inner
            .lock()
            .users
            .values()
            .find(|u| u.name == name)
            .cloned())
    }

    async fn save(&self, id: UserId, user: &User) -> Result<()> {
        let mut inner = self.inner.lock();
        match inner.users.get_mut(&id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(())
            }
            None => Err(RegistryError::not_found(id)),
        }
    }

    async fn create(&self, creation: &UserCreation) -> Result<User> {
        let mut inner = self.inner.lock();
        let id = inner.last_id + 1;
        let user = User::new(id, creation.name.clone(), creation.scope);
        inner.users.insert(id, user.clone());
        inner.last_id = id;
        Ok(user)
    }

    async fn remove(&self, id: UserId) -> Result<User> {
        self.inner
            .lock()
            .users
            .remove(&id)
            .ok_or_else(|| RegistryError::not_found(id))
    }

    async fn last_id(&self) -> Result<UserId> {
        Ok(self.inner.lock().last_id)
    }
}
