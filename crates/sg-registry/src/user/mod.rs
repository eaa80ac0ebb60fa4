//! User Aggregate
//!
//! Principal entity, storage port and adapters, scope-gated service, and the
//! REST surface over it.

pub mod entity;
pub mod repository;
pub mod memory;
pub mod sqlite;
pub mod service;
pub mod api;

// Re-export main types
pub use entity::{Scope, User, UserCreation, UserId, UserUpdate};
pub use repository::UserRepository;
pub use memory::InMemoryUserRepository;
pub use sqlite::SqliteUserRepository;
pub use service::{BoundUserService, UserService};
pub use api::{users_router, UsersState};
