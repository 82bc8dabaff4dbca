//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Case-insensitive substring search, ordered by name
//! - Create / direct stock correction / guarded delete
//! - Row locks and stock writes for the ledger
//!
//! Stock moved by sales and purchases never goes through
//! [`ProductRepository`]: the ledger locks the row with [`lock`] and writes
//! the guarded value with [`write_stock`].

use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};
use warung_core::requests::CreateProductRequest;
use warung_core::{CoreError, Money, Product};

use super::{duplicate_as, like_pattern};
use crate::error::{DbError, DbResult};

const COLUMNS: &str = "id, name, stock, price, cost_price";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let results = repo.list(Some("kopi")).await?;
/// let product = repo.get_by_id(1).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: PgPool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products, optionally filtered by a case-insensitive substring.
    ///
    /// ## Arguments
    /// * `search` - Substring to match against the name; blank means all
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<Product>> {
        let search = search.map(str::trim).filter(|q| !q.is_empty());
        debug!(search = ?search, "Listing products");

        let products = match search {
            Some(query) => {
                sqlx::query_as::<_, Product>(&format!(
                    "SELECT {COLUMNS} FROM products WHERE name ILIKE $1 ORDER BY name"
                ))
                .bind(like_pattern(query))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Product>(&format!(
                    "SELECT {COLUMNS} FROM products ORDER BY name"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        debug!(count = products.len(), "Product list returned");
        Ok(products)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Err(Duplicate)` - A product with that name (any case) exists
    pub async fn create(&self, product: &CreateProductRequest) -> DbResult<Product> {
        debug!(name = %product.name, "Inserting product");

        let created = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (name, stock, price, cost_price) \
             VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        ))
        .bind(&product.name)
        .bind(product.stock)
        .bind(product.price)
        .bind(product.cost_price)
        .fetch_one(&self.pool)
        .await
        .map_err(duplicate_as("name", &product.name))?;

        info!(id = created.id, name = %created.name, "Product created");
        Ok(created)
    }

    /// Overwrites the stock count (stock-take correction).
    pub async fn set_stock(&self, id: i64, stock: i64) -> DbResult<Product> {
        debug!(id, stock, "Setting product stock");

        sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET stock = $2 WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(stock)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("product", id))
    }

    /// Deletes a product that no transaction or purchase references.
    ///
    /// The row is locked first, so a sale of this product that is already in
    /// flight either commits before the reference check or fails afterwards.
    pub async fn delete(&self, id: i64) -> DbResult<Product> {
        let mut tx = self.pool.begin().await?;

        let product = lock(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("product", id))?;

        let (transactions, purchases): (i64, i64) = sqlx::query_as(
            "SELECT \
                (SELECT COUNT(*) FROM transactions WHERE product_id = $1), \
                (SELECT COUNT(*) FROM purchases WHERE product_id = $1)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if transactions > 0 || purchases > 0 {
            return Err(CoreError::Conflict(format!(
                "Product '{}' is referenced by {transactions} transaction(s) and {purchases} purchase(s)",
                product.name
            ))
            .into());
        }

        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id, name = %product.name, "Product deleted");
        Ok(product)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// In-transaction Row Functions
// =============================================================================

/// Locks a product row (`FOR UPDATE`) until the transaction ends.
pub async fn lock(conn: &mut PgConnection, id: i64) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {COLUMNS} FROM products WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(product)
}

/// Resolves a product by its exact name, without locking.
pub async fn find_by_exact_name(conn: &mut PgConnection, name: &str) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {COLUMNS} FROM products WHERE name = $1"
    ))
    .bind(name)
    .fetch_optional(conn)
    .await?;
    Ok(product)
}

/// Writes a stock value already checked by the ledger guards.
pub async fn write_stock(conn: &mut PgConnection, id: i64, stock: i64) -> DbResult<()> {
    sqlx::query("UPDATE products SET stock = $2 WHERE id = $1")
        .bind(id)
        .bind(stock)
        .execute(conn)
        .await?;
    Ok(())
}

/// Most-recent-cost policy: every purchase overwrites the cost price.
pub async fn write_cost_price(conn: &mut PgConnection, id: i64, cost_price: Money) -> DbResult<()> {
    sqlx::query("UPDATE products SET cost_price = $2 WHERE id = $1")
        .bind(id)
        .bind(cost_price)
        .execute(conn)
        .await?;
    Ok(())
}
