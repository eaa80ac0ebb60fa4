//! ScopeGate Registry
//!
//! A registry of principals, each carrying a numeric privilege scope, with
//! every mutation gated by scope domination: the acting caller must dominate
//! both the target's current scope and any scope being assigned.
//!
//! Layout follows ports-and-adapters:
//! - [`user::repository`] is the storage port; [`user::memory`] and
//!   [`user::sqlite`] are its adapters.
//! - [`user::service`] is the authorization core; mutations only exist on a
//!   caller-bound handle.
//! - [`user::api`] and [`middleware`] are the HTTP surface.

pub mod error;
pub mod middleware;
pub mod user;

pub use error::{RegistryError, Result};
pub use middleware::{AppState, AuthLayer, Authenticated};
pub use user::{
    users_router, BoundUserService, InMemoryUserRepository, Scope, SqliteUserRepository, User,
    UserCreation, UserId, UserRepository, UserService, UserUpdate, UsersState,
};
