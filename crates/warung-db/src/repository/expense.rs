//! # Expense Repository
//!
//! Expenses are read joined with the debited account's name.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use tracing::debug;
use warung_core::{DateRange, Expense, Money};

use crate::error::{DbError, DbResult};

const SELECT: &str = "SELECT e.id, e.description, e.amount, e.date, e.account_id, \
                      a.name AS account_name \
                      FROM expenses e LEFT JOIN accounts a ON a.id = e.account_id";

#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: PgPool,
}

impl ExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        ExpenseRepository { pool }
    }

    /// Lists expenses inside an inclusive date window, newest first.
    pub async fn list(&self, range: DateRange) -> DbResult<Vec<Expense>> {
        debug!(start = ?range.start, end = ?range.end, "Listing expenses");

        let expenses = sqlx::query_as::<_, Expense>(&format!(
            "{SELECT} \
             WHERE ($1::date IS NULL OR e.date >= $1) AND ($2::date IS NULL OR e.date <= $2) \
             ORDER BY e.date DESC, e.id DESC"
        ))
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Expense>> {
        let expense = sqlx::query_as::<_, Expense>(&format!("{SELECT} WHERE e.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(expense)
    }
}

// =============================================================================
// In-transaction Row Functions
// =============================================================================

/// Locks an expense row (`FOR UPDATE OF e`) until the transaction ends.
pub async fn lock(conn: &mut PgConnection, id: i64) -> DbResult<Option<Expense>> {
    let expense = sqlx::query_as::<_, Expense>(&format!("{SELECT} WHERE e.id = $1 FOR UPDATE OF e"))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(expense)
}

pub async fn insert(
    conn: &mut PgConnection,
    description: &str,
    amount: Money,
    date: NaiveDate,
    account_id: Option<i64>,
) -> DbResult<Expense> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO expenses (description, amount, date, account_id) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(description)
    .bind(amount)
    .bind(date)
    .bind(account_id)
    .fetch_one(&mut *conn)
    .await?;

    fetch(conn, id).await
}

pub async fn update(
    conn: &mut PgConnection,
    id: i64,
    description: &str,
    amount: Money,
) -> DbResult<Expense> {
    sqlx::query("UPDATE expenses SET description = $2, amount = $3 WHERE id = $1")
        .bind(id)
        .bind(description)
        .bind(amount)
        .execute(&mut *conn)
        .await?;

    fetch(conn, id).await
}

pub async fn delete(conn: &mut PgConnection, id: i64) -> DbResult<()> {
    sqlx::query("DELETE FROM expenses WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

async fn fetch(conn: &mut PgConnection, id: i64) -> DbResult<Expense> {
    sqlx::query_as::<_, Expense>(&format!("{SELECT} WHERE e.id = $1"))
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| DbError::not_found("expense", id))
}
