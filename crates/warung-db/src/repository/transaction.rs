//! # Transaction Repository
//!
//! Database operations for the sale/withdrawal history.
//!
//! ## Row Mapping
//! ```text
//! transactions.type            TEXT  ──FromStr──► TransactionKind
//! transactions.payment_method  TEXT  ──FromStr──► PaymentMethod
//! numeric columns              NUMERIC(14,2) ──► Money
//! ```
//!
//! Rows are written only from inside the ledger, on the same connection
//! that holds the product and account locks.

use chrono::NaiveDate;
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::debug;
use warung_core::{DateRange, Money, Transaction};

use crate::error::{DbError, DbResult};

const COLUMNS: &str = "id, type, product_id, product_name, quantity, cost_price, selling_price, \
                       profit_per_unit, total, date, account_id, account_name, reserve_account_id, \
                       payment_method, description, idempotency_key";

/// Raw row; enum columns are still text here.
#[derive(Debug, FromRow)]
struct TransactionRow {
    id: i64,
    #[sqlx(rename = "type")]
    kind: String,
    product_id: Option<i64>,
    product_name: Option<String>,
    quantity: i64,
    cost_price: Money,
    selling_price: Money,
    profit_per_unit: Money,
    total: Money,
    date: NaiveDate,
    account_id: i64,
    account_name: String,
    reserve_account_id: Option<i64>,
    payment_method: String,
    description: Option<String>,
    idempotency_key: Option<String>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = DbError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let corrupt = |err: warung_core::CoreError| DbError::CorruptRow {
            table: "transactions",
            reason: err.to_string(),
        };

        Ok(Transaction {
            id: row.id,
            kind: row.kind.parse().map_err(corrupt)?,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            cost_price: row.cost_price,
            selling_price: row.selling_price,
            profit_per_unit: row.profit_per_unit,
            total: row.total,
            date: row.date,
            account_id: row.account_id,
            account_name: row.account_name,
            reserve_account_id: row.reserve_account_id,
            payment_method: row.payment_method.parse().map_err(corrupt)?,
            description: row.description,
            idempotency_key: row.idempotency_key,
        })
    }
}

fn into_transactions(rows: Vec<TransactionRow>) -> DbResult<Vec<Transaction>> {
    rows.into_iter().map(Transaction::try_from).collect()
}

#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        TransactionRepository { pool }
    }

    /// Lists transactions inside an inclusive date window, newest first.
    pub async fn list(&self, range: DateRange) -> DbResult<Vec<Transaction>> {
        debug!(start = ?range.start, end = ?range.end, "Listing transactions");

        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {COLUMNS} FROM transactions \
             WHERE ($1::date IS NULL OR date >= $1) AND ($2::date IS NULL OR date <= $2) \
             ORDER BY date DESC, id DESC"
        ))
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        into_transactions(rows)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Transaction>> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {COLUMNS} FROM transactions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Transaction::try_from).transpose()
    }
}

// =============================================================================
// In-transaction Row Functions
// =============================================================================

/// Locks a transaction row (`FOR UPDATE`) until the transaction ends.
pub async fn lock(conn: &mut PgConnection, id: i64) -> DbResult<Option<Transaction>> {
    let row = sqlx::query_as::<_, TransactionRow>(&format!(
        "SELECT {COLUMNS} FROM transactions WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    row.map(Transaction::try_from).transpose()
}

/// Rows previously written under an idempotency key, in insertion order.
pub async fn find_by_idempotency_key(
    conn: &mut PgConnection,
    key: &str,
) -> DbResult<Vec<Transaction>> {
    let rows = sqlx::query_as::<_, TransactionRow>(&format!(
        "SELECT {COLUMNS} FROM transactions WHERE idempotency_key = $1 ORDER BY id"
    ))
    .bind(key)
    .fetch_all(conn)
    .await?;

    into_transactions(rows)
}

/// Inserts a row built by the ledger. `record.id` is ignored.
pub async fn insert(conn: &mut PgConnection, record: &Transaction) -> DbResult<Transaction> {
    let row = sqlx::query_as::<_, TransactionRow>(&format!(
        "INSERT INTO transactions (\
            type, product_id, product_name, quantity, cost_price, selling_price, \
            profit_per_unit, total, date, account_id, account_name, reserve_account_id, \
            payment_method, description, idempotency_key\
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
         RETURNING {COLUMNS}"
    ))
    .bind(record.kind.as_str())
    .bind(record.product_id)
    .bind(record.product_name.as_deref())
    .bind(record.quantity)
    .bind(record.cost_price)
    .bind(record.selling_price)
    .bind(record.profit_per_unit)
    .bind(record.total)
    .bind(record.date)
    .bind(record.account_id)
    .bind(&record.account_name)
    .bind(record.reserve_account_id)
    .bind(record.payment_method.as_str())
    .bind(record.description.as_deref())
    .bind(record.idempotency_key.as_deref())
    .fetch_one(conn)
    .await?;

    Transaction::try_from(row)
}

/// Overwrites the corrected amounts of an existing row.
pub async fn update(conn: &mut PgConnection, record: &Transaction) -> DbResult<Transaction> {
    let row = sqlx::query_as::<_, TransactionRow>(&format!(
        "UPDATE transactions SET \
            product_id = $2, product_name = $3, quantity = $4, cost_price = $5, \
            selling_price = $6, profit_per_unit = $7, total = $8, description = $9 \
         WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(record.id)
    .bind(record.product_id)
    .bind(record.product_name.as_deref())
    .bind(record.quantity)
    .bind(record.cost_price)
    .bind(record.selling_price)
    .bind(record.profit_per_unit)
    .bind(record.total)
    .bind(record.description.as_deref())
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| DbError::not_found("transaction", record.id))?;

    Transaction::try_from(row)
}

pub async fn delete(conn: &mut PgConnection, id: i64) -> DbResult<()> {
    sqlx::query("DELETE FROM transactions WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}
