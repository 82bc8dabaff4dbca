//! # Capital Repository
//!
//! The append-only `capital_history` ledger.
//!
//! ```text
//! total capital = Σ amount WHERE type = 'add'
//!               − Σ amount WHERE type = 'subtract'
//! ```
//!
//! Rows are never updated or deleted; corrections append compensating rows.

use chrono::NaiveDate;
use sqlx::{FromRow, PgConnection, PgPool};
use warung_core::ledger::CapitalEntry;
use warung_core::{CapitalHistory, Money};

use crate::error::{DbError, DbResult};

#[derive(Debug, FromRow)]
struct CapitalRow {
    id: i64,
    amount: Money,
    date: NaiveDate,
    #[sqlx(rename = "type")]
    kind: String,
}

impl TryFrom<CapitalRow> for CapitalHistory {
    type Error = DbError;

    fn try_from(row: CapitalRow) -> Result<Self, Self::Error> {
        Ok(CapitalHistory {
            id: row.id,
            amount: row.amount,
            date: row.date,
            kind: row.kind.parse().map_err(|err: warung_core::CoreError| DbError::CorruptRow {
                table: "capital_history",
                reason: err.to_string(),
            })?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CapitalRepository {
    pool: PgPool,
}

impl CapitalRepository {
    pub fn new(pool: PgPool) -> Self {
        CapitalRepository { pool }
    }

    /// Full history, newest first.
    pub async fn list(&self) -> DbResult<Vec<CapitalHistory>> {
        let rows = sqlx::query_as::<_, CapitalRow>(
            "SELECT id, amount, date, type FROM capital_history ORDER BY date DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CapitalHistory::try_from).collect()
    }

    /// Σ(add) − Σ(subtract). Zero on an empty ledger.
    pub async fn total(&self) -> DbResult<Money> {
        let total: Money = sqlx::query_scalar(
            "SELECT COALESCE(SUM(CASE WHEN type = 'add' THEN amount ELSE -amount END), 0) \
             FROM capital_history",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}

// =============================================================================
// In-transaction Row Functions
// =============================================================================

pub async fn append(conn: &mut PgConnection, entry: &CapitalEntry, date: NaiveDate) -> DbResult<()> {
    sqlx::query("INSERT INTO capital_history (amount, date, type) VALUES ($1, $2, $3)")
        .bind(entry.amount)
        .bind(date)
        .bind(entry.kind.as_str())
        .execute(conn)
        .await?;
    Ok(())
}
