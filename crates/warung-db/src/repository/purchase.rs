//! # Purchase Repository
//!
//! Purchases are always returned as the joined view (product and account
//! names included).

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use warung_core::{Money, Purchase};

use crate::error::{DbError, DbResult};

const SELECT: &str = "SELECT pu.id, pu.product_id, p.name AS product_name, \
                      pu.account_id, a.name AS account_name, \
                      pu.quantity, pu.purchase_price, pu.total, pu.date \
                      FROM purchases pu \
                      JOIN products p ON p.id = pu.product_id \
                      JOIN accounts a ON a.id = pu.account_id";

#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: PgPool,
}

impl PurchaseRepository {
    pub fn new(pool: PgPool) -> Self {
        PurchaseRepository { pool }
    }

    /// Newest first.
    pub async fn list(&self) -> DbResult<Vec<Purchase>> {
        let purchases =
            sqlx::query_as::<_, Purchase>(&format!("{SELECT} ORDER BY pu.date DESC, pu.id DESC"))
                .fetch_all(&self.pool)
                .await?;
        Ok(purchases)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Purchase>> {
        let purchase = sqlx::query_as::<_, Purchase>(&format!("{SELECT} WHERE pu.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(purchase)
    }
}

// =============================================================================
// In-transaction Row Functions
// =============================================================================

/// Locks a purchase row (`FOR UPDATE OF pu`) until the transaction ends.
pub async fn lock(conn: &mut PgConnection, id: i64) -> DbResult<Option<Purchase>> {
    let purchase =
        sqlx::query_as::<_, Purchase>(&format!("{SELECT} WHERE pu.id = $1 FOR UPDATE OF pu"))
            .bind(id)
            .fetch_optional(conn)
            .await?;
    Ok(purchase)
}

pub async fn insert(
    conn: &mut PgConnection,
    product_id: i64,
    account_id: i64,
    quantity: i64,
    purchase_price: Money,
    date: NaiveDate,
) -> DbResult<Purchase> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO purchases (product_id, account_id, quantity, purchase_price, total, date) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
    )
    .bind(product_id)
    .bind(account_id)
    .bind(quantity)
    .bind(purchase_price)
    .bind(purchase_price.multiply_quantity(quantity)?)
    .bind(date)
    .fetch_one(&mut *conn)
    .await?;

    sqlx::query_as::<_, Purchase>(&format!("{SELECT} WHERE pu.id = $1"))
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| DbError::not_found("purchase", id))
}

pub async fn delete(conn: &mut PgConnection, id: i64) -> DbResult<()> {
    sqlx::query("DELETE FROM purchases WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}
