//! # User Repository
//!
//! Login identities. Password hashing happens in the API layer; this
//! repository only stores and returns the hash.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use warung_core::access::Role;
use warung_core::User;

use super::duplicate_as;
use crate::error::{DbError, DbResult};

const COLUMNS: &str = "id, username, password_hash, role, created_at";

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            role: row.role.parse().map_err(|err: warung_core::CoreError| DbError::CorruptRow {
                table: "users",
                reason: err.to_string(),
            })?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        UserRepository { pool }
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Case-insensitive username lookup.
    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {COLUMNS} FROM users WHERE LOWER(username) = LOWER($1)"
        ))
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    pub async fn create(&self, username: &str, password_hash: &str, role: Role) -> DbResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (username, password_hash, role) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        ))
        .bind(username)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(duplicate_as("username", username))?;

        let user = User::try_from(row)?;
        info!(id = user.id, username = %user.username, role = %user.role, "User created");
        Ok(user)
    }

    /// Creates the user only while the table is empty.
    ///
    /// Returns `None` when a user already exists. The table lock makes two
    /// concurrent first registrations resolve to exactly one winner.
    pub async fn create_first(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> DbResult<Option<User>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (username, password_hash, role) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        ))
        .bind(username)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let user = User::try_from(row)?;
        info!(id = user.id, username = %user.username, role = %user.role, "First user created");
        Ok(Some(user))
    }
}
