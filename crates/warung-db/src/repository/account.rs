//! # Account Repository
//!
//! Database operations for cash/bank accounts.
//!
//! Balances are only ever written by the ledger (guarded debits and credits)
//! or by an explicit administrator correction through [`AccountRepository::update`].

use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};
use warung_core::requests::{CreateAccountRequest, UpdateAccountRequest};
use warung_core::{Account, CoreError, Money};

use super::duplicate_as;
use crate::error::{DbError, DbResult};

const COLUMNS: &str = "id, name, balance";

#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        AccountRepository { pool }
    }

    pub async fn list(&self) -> DbResult<Vec<Account>> {
        let accounts =
            sqlx::query_as::<_, Account>(&format!("SELECT {COLUMNS} FROM accounts ORDER BY name"))
                .fetch_all(&self.pool)
                .await?;
        Ok(accounts)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Account>> {
        let account =
            sqlx::query_as::<_, Account>(&format!("SELECT {COLUMNS} FROM accounts WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(account)
    }

    /// Looks an account up by name, ignoring case.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Account>> {
        let mut conn = self.pool.acquire().await?;
        find_by_name(&mut conn, name).await
    }

    pub async fn create(&self, account: &CreateAccountRequest) -> DbResult<Account> {
        debug!(name = %account.name, "Inserting account");

        let created = sqlx::query_as::<_, Account>(&format!(
            "INSERT INTO accounts (name, balance) VALUES ($1, $2) RETURNING {COLUMNS}"
        ))
        .bind(&account.name)
        .bind(account.balance)
        .fetch_one(&self.pool)
        .await
        .map_err(duplicate_as("name", &account.name))?;

        info!(id = created.id, name = %created.name, balance = %created.balance, "Account created");
        Ok(created)
    }

    /// Direct correction of name and/or balance. No capital row is written.
    ///
    /// The reserve account keeps its name, since the ledger finds it by name.
    pub async fn update(
        &self,
        id: i64,
        changes: &UpdateAccountRequest,
        reserve_account: &str,
    ) -> DbResult<Account> {
        debug!(id, "Updating account");
        let mut tx = self.pool.begin().await?;

        let current = lock(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("account", id))?;

        if let Some(new_name) = changes.name.as_deref() {
            if same_name(&mut tx, &current.name, reserve_account).await?
                && !same_name(&mut tx, new_name, reserve_account).await?
            {
                return Err(CoreError::Conflict(format!(
                    "Account '{}' is the reserve account and cannot be renamed",
                    current.name
                ))
                .into());
            }
        }

        let updated = sqlx::query_as::<_, Account>(&format!(
            "UPDATE accounts SET \
                name = COALESCE($2, name), \
                balance = COALESCE($3, balance) \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.balance)
        .fetch_one(&mut *tx)
        .await
        .map_err(duplicate_as("name", changes.name.as_deref().unwrap_or_default()))?;

        tx.commit().await?;

        info!(id, balance = %updated.balance, "Account updated");
        Ok(updated)
    }

    /// Deletes an account no transaction, expense or purchase references.
    ///
    /// The reserve account can never be deleted.
    pub async fn delete(&self, id: i64, reserve_account: &str) -> DbResult<Account> {
        let mut tx = self.pool.begin().await?;

        let account = lock(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("account", id))?;

        if same_name(&mut tx, &account.name, reserve_account).await? {
            return Err(CoreError::Conflict(format!(
                "Account '{}' is the reserve account and cannot be deleted",
                account.name
            ))
            .into());
        }

        let (transactions, expenses, purchases): (i64, i64, i64) = sqlx::query_as(
            "SELECT \
                (SELECT COUNT(*) FROM transactions WHERE account_id = $1 OR reserve_account_id = $1), \
                (SELECT COUNT(*) FROM expenses WHERE account_id = $1), \
                (SELECT COUNT(*) FROM purchases WHERE account_id = $1)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if transactions + expenses + purchases > 0 {
            return Err(CoreError::Conflict(format!(
                "Account '{}' is referenced by {transactions} transaction(s), \
                 {expenses} expense(s) and {purchases} purchase(s)",
                account.name
            ))
            .into());
        }

        sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id, name = %account.name, "Account deleted");
        Ok(account)
    }
}

// =============================================================================
// In-transaction Row Functions
// =============================================================================

/// Locks an account row (`FOR UPDATE`) until the transaction ends.
pub async fn lock(conn: &mut PgConnection, id: i64) -> DbResult<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(&format!(
        "SELECT {COLUMNS} FROM accounts WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(account)
}

/// Compares two names the way the unique index does (`LOWER`).
async fn same_name(conn: &mut PgConnection, a: &str, b: &str) -> DbResult<bool> {
    let same: bool = sqlx::query_scalar("SELECT LOWER($1) = LOWER($2)")
        .bind(a)
        .bind(b)
        .fetch_one(conn)
        .await?;
    Ok(same)
}

/// Resolves an account by name ignoring case, without locking.
pub async fn find_by_name(conn: &mut PgConnection, name: &str) -> DbResult<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(&format!(
        "SELECT {COLUMNS} FROM accounts WHERE LOWER(name) = LOWER($1)"
    ))
    .bind(name.trim())
    .fetch_optional(conn)
    .await?;
    Ok(account)
}

/// Like [`find_by_name`], but a missing account is `NotFound`.
pub async fn require_by_name(conn: &mut PgConnection, name: &str) -> DbResult<Account> {
    find_by_name(conn, name)
        .await?
        .ok_or_else(|| DbError::not_found("account", name))
}

/// Writes a balance already checked by the ledger guards.
pub async fn write_balance(conn: &mut PgConnection, id: i64, balance: Money) -> DbResult<()> {
    sqlx::query("UPDATE accounts SET balance = $2 WHERE id = $1")
        .bind(id)
        .bind(balance)
        .execute(conn)
        .await?;
    Ok(())
}

/// Creates the named account with a zero balance unless it already exists.
pub async fn ensure(conn: &mut PgConnection, name: &str) -> DbResult<Account> {
    sqlx::query("INSERT INTO accounts (name, balance) VALUES ($1, 0) ON CONFLICT DO NOTHING")
        .bind(name)
        .execute(&mut *conn)
        .await?;

    require_by_name(conn, name).await
}
