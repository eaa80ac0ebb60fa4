//! SQLite User Repository Implementation
//!
//! Implements the repository port against a relational `users` table.
//! `AUTOINCREMENT` keeps the identity counter monotonic across deletes, and a
//! `UNIQUE` constraint on `name` backstops the service-level uniqueness check
//! at the storage layer, surfacing violations as `Conflict`.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{RegistryError, Result};
use crate::user::entity::{Scope, User, UserCreation, UserId};
use crate::user::repository::UserRepository;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    scope: Scope,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User::new(row.id, row.name, row.scope)
    }
}

/// SQLite implementation of the user repository port.
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the given SQLite URL and make sure the schema exists.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;
        let repo = Self::new(pool);
        repo.init_schema().await?;
        Ok(repo)
    }

    /// Get the pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the users table if it does not exist.
    ///
    /// `AUTOINCREMENT` guarantees rowids are never reused, which is what the
    /// identity contract requires. Against a pre-populated table the SQLite
    /// sequence already reflects the maximum assigned id.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                scope INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn map_unique_violation(err: sqlx::Error, name: &str) -> RegistryError {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RegistryError::conflict(name)
            }
            _ => RegistryError::Storage(err),
        }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn fetch_by_id(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, scope FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn fetch_by_name(&self, name: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, scope FROM users WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn save(&self, id: UserId, user: &User) -> Result<()> {
        let result = sqlx::query("UPDATE users SET name = ?, scope = ? WHERE id = ?")
            .bind(&user.name)
            .bind(user.scope)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::map_unique_violation(e, &user.name))?;

        if result.rows_affected() == 0 {
            return Err(RegistryError::not_found(id));
        }
        Ok(())
    }

    async fn create(&self, creation: &UserCreation) -> Result<User> {
        let result = sqlx::query("INSERT INTO users (name, scope) VALUES (?, ?)")
            .bind(&creation.name)
            .bind(creation.scope)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::map_unique_violation(e, &creation.name))?;

        let id = result.last_insert_rowid();
        debug!(user_id = id, name = %creation.name, "Created user");
        Ok(User::new(id, creation.name.clone(), creation.scope))
    }

    async fn remove(&self, id: UserId) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "DELETE FROM users WHERE id = ? RETURNING id, name, scope",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::from).ok_or_else(|| RegistryError::not_found(id))
    }

    async fn last_id(&self) -> Result<UserId> {
        // sqlite_sequence holds the AUTOINCREMENT counter once the first row
        // has been inserted; fall back to MAX(id) for pre-populated tables.
        let (last_id,): (UserId,) = sqlx::query_as(
            r#"
            SELECT COALESCE(
                (SELECT seq FROM sqlite_sequence WHERE name = 'users'),
                (SELECT COALESCE(MAX(id), 0) FROM users)
            )
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(last_id)
    }
}
