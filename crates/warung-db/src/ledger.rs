//! # Ledger Service
//!
//! Runs every stock- or money-moving operation as one PostgreSQL
//! transaction.
//!
//! ## Operation Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    1. resolve names → ids (no locks yet)                               │
//! │       lock the record being corrected, if any                          │
//! │    2. build LedgerEffect (warung-core, pure)                           │
//! │    3. apply_effect:                                                     │
//! │         lock products  FOR UPDATE  (ascending id)                      │
//! │         lock accounts  FOR UPDATE  (ascending id)                      │
//! │         guard_stock / guard_balance on the locked values               │
//! │         write stock, balances, append capital_history                  │
//! │    4. insert / update / delete the record row                          │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any `?` before COMMIT drops the transaction → ROLLBACK.               │
//! │  A request timeout drops the future → same ROLLBACK.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation locks products before accounts and both in ascending id
//! order, so two operations touching the same rows always queue instead of
//! deadlocking.

use chrono::{Local, NaiveDate};
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info, instrument};
use warung_core::ledger::{
    capital_adjustment_effect, expense_effect, guard_balance, guard_stock, purchase_effect,
    sale_effect, withdrawal_effect,
};
use warung_core::requests::{
    CapitalAdjustment, CreateExpenseRequest, CreatePurchaseRequest, DeductRequest, SaleCommand,
    TransactionCommand, UpdateExpenseRequest, UpdateTransactionRequest, WithdrawalCommand,
};
use warung_core::{
    Account, Expense, LedgerEffect, LedgerRecord, Money, PaymentMethod, Purchase,
    Transaction, TransactionKind,
};

use crate::error::{DbError, DbResult};
use crate::repository::{account, capital, expense, product, purchase, transaction};

// =============================================================================
// Shared Delta Routine
// =============================================================================

/// Applies an effect on an open transaction: lock, guard, write.
///
/// All guards run against locked rows before the first write of each kind,
/// and any failure aborts the caller's transaction, so nothing is ever
/// partially applied.
pub async fn apply_effect(
    conn: &mut PgConnection,
    effect: &LedgerEffect,
    date: NaiveDate,
) -> DbResult<()> {
    debug!(
        products = effect.stock_deltas().count(),
        accounts = effect.balance_deltas().count(),
        capital_rows = effect.capital_entries().len(),
        "Applying ledger effect"
    );

    let mut stock_writes = Vec::new();
    for (id, delta) in effect.stock_deltas() {
        let locked = product::lock(conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("product", id))?;
        stock_writes.push((id, guard_stock(&locked.name, locked.stock, delta)?));
    }

    let mut balance_writes = Vec::new();
    for (id, delta) in effect.balance_deltas() {
        let locked = account::lock(conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("account", id))?;
        balance_writes.push((id, guard_balance(&locked.name, locked.balance, delta)?));
    }

    for (id, stock) in stock_writes {
        product::write_stock(conn, id, stock).await?;
    }
    for (id, balance) in balance_writes {
        account::write_balance(conn, id, balance).await?;
    }
    for entry in effect.capital_entries() {
        capital::append(conn, entry, date).await?;
    }

    Ok(())
}

// =============================================================================
// Ledger
// =============================================================================

/// Result of `POST /transactions`.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub transactions: Vec<Transaction>,
    /// `true` when an idempotency key matched earlier rows and nothing new
    /// was applied.
    pub replayed: bool,
}

/// Transactional ledger operations.
///
/// ## Usage
/// ```rust,ignore
/// let ledger = db.ledger("Remaining Capital");
/// ledger.ensure_reserve_account().await?;
///
/// let recorded = ledger.record_transaction(command, Some("pos-1-0042")).await?;
/// ledger.delete_transaction(recorded.transactions[0].id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Ledger {
    pool: PgPool,
    reserve_account: String,
}

impl Ledger {
    pub fn new(pool: PgPool, reserve_account: impl Into<String>) -> Self {
        Ledger {
            pool,
            reserve_account: reserve_account.into(),
        }
    }

    pub fn reserve_account_name(&self) -> &str {
        &self.reserve_account
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Creates the reserve account if it does not exist yet. Idempotent.
    pub async fn ensure_reserve_account(&self) -> DbResult<Account> {
        let mut conn = self.pool.acquire().await?;
        let reserve = account::ensure(&mut conn, &self.reserve_account).await?;
        info!(id = reserve.id, name = %reserve.name, "Reserve account ready");
        Ok(reserve)
    }

    async fn reserve(&self, conn: &mut PgConnection) -> DbResult<Account> {
        account::require_by_name(conn, &self.reserve_account).await
    }

    // =========================================================================
    // Sales and Withdrawals
    // =========================================================================

    /// Records a sale (one or more lines) or a withdrawal.
    ///
    /// With an idempotency key, a transaction-scoped advisory lock serializes
    /// requests carrying the same key; a repeat returns the original rows.
    #[instrument(skip(self, command))]
    pub async fn record_transaction(
        &self,
        command: TransactionCommand,
        idempotency_key: Option<&str>,
    ) -> DbResult<Recorded> {
        let mut tx = self.pool.begin().await?;

        if let Some(key) = idempotency_key {
            sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
                .bind(key)
                .execute(&mut *tx)
                .await?;

            let existing = transaction::find_by_idempotency_key(&mut tx, key).await?;
            if !existing.is_empty() {
                tx.commit().await?;
                info!(count = existing.len(), "Idempotent replay, nothing applied");
                return Ok(Recorded {
                    transactions: existing,
                    replayed: true,
                });
            }
        }

        let transactions = match command {
            TransactionCommand::Sale(sale) => self.sell(&mut tx, &sale, idempotency_key).await?,
            TransactionCommand::Withdrawal(withdrawal) => {
                vec![self.withdraw(&mut tx, &withdrawal, idempotency_key).await?]
            }
        };

        tx.commit().await?;

        Ok(Recorded {
            transactions,
            replayed: false,
        })
    }

    async fn sell(
        &self,
        conn: &mut PgConnection,
        sale: &SaleCommand,
        idempotency_key: Option<&str>,
    ) -> DbResult<Vec<Transaction>> {
        let date = Self::today();
        let account = account::require_by_name(conn, &sale.account_name).await?;
        let reserve_account_id = match sale.payment_method {
            PaymentMethod::Cash => None,
            PaymentMethod::Transfer => Some(self.reserve(conn).await?.id),
        };

        let mut rows = Vec::with_capacity(sale.lines.len());
        let mut effect = LedgerEffect::new();

        for line in &sale.lines {
            let item = product::find_by_exact_name(conn, &line.product_name)
                .await?
                .ok_or_else(|| DbError::not_found("product", &line.product_name))?;

            effect = effect.then(sale_effect(
                item.id,
                &line.amounts,
                sale.payment_method,
                account.id,
                reserve_account_id,
            )?);

            rows.push(Transaction {
                id: 0,
                kind: TransactionKind::Sale,
                product_id: Some(item.id),
                product_name: Some(item.name),
                quantity: line.amounts.quantity,
                cost_price: line.amounts.cost_price,
                selling_price: line.amounts.selling_price,
                profit_per_unit: line.amounts.profit_per_unit(),
                total: line.amounts.total()?,
                date,
                account_id: account.id,
                account_name: account.name.clone(),
                reserve_account_id,
                payment_method: sale.payment_method,
                description: sale.description.clone(),
                idempotency_key: idempotency_key.map(str::to_string),
            });
        }

        apply_effect(conn, &effect, date).await?;

        let mut inserted = Vec::with_capacity(rows.len());
        for row in &rows {
            inserted.push(transaction::insert(conn, row).await?);
        }

        info!(
            account = %account.name,
            method = %sale.payment_method,
            lines = inserted.len(),
            total = %inserted.iter().map(|t| t.total).sum::<Money>(),
            "Sale recorded"
        );
        Ok(inserted)
    }

    async fn withdraw(
        &self,
        conn: &mut PgConnection,
        withdrawal: &WithdrawalCommand,
        idempotency_key: Option<&str>,
    ) -> DbResult<Transaction> {
        let date = Self::today();
        let account = account::require_by_name(conn, &withdrawal.account_name).await?;

        apply_effect(conn, &withdrawal_effect(account.id, withdrawal.amount), date).await?;

        let row = transaction::insert(
            conn,
            &Transaction {
                id: 0,
                kind: TransactionKind::Withdrawal,
                product_id: None,
                product_name: None,
                quantity: 0,
                cost_price: Money::zero(),
                selling_price: Money::zero(),
                profit_per_unit: Money::zero(),
                total: withdrawal.amount,
                date,
                account_id: account.id,
                account_name: account.name.clone(),
                reserve_account_id: None,
                payment_method: PaymentMethod::Cash,
                description: withdrawal.description.clone(),
                idempotency_key: idempotency_key.map(str::to_string),
            },
        )
        .await?;

        info!(account = %account.name, amount = %withdrawal.amount, "Withdrawal recorded");
        Ok(row)
    }

    /// Corrects a stored transaction by undoing its effect and applying the
    /// corrected one, netted into a single guarded step.
    #[instrument(skip(self, changes))]
    pub async fn update_transaction(
        &self,
        id: i64,
        changes: UpdateTransactionRequest,
    ) -> DbResult<Transaction> {
        let mut tx = self.pool.begin().await?;
        let date = Self::today();

        let old = transaction::lock(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("transaction", id))?;

        let mut new = old.clone();
        match old.kind {
            TransactionKind::Sale => {
                let amounts = old.amounts().with_changes(
                    changes.quantity,
                    changes.cost_price,
                    changes.selling_price,
                );
                new.quantity = amounts.quantity;
                new.cost_price = amounts.cost_price;
                new.selling_price = amounts.selling_price;
                new.profit_per_unit = amounts.profit_per_unit();
                new.total = amounts.total()?;
            }
            TransactionKind::Withdrawal => {
                new.total = changes.amount.unwrap_or(old.total);
            }
        }
        if let Some(description) = changes.description {
            new.description = Some(description).filter(|d| !d.is_empty());
        }

        let correction = old.effect()?.inverse().then(new.effect()?);
        apply_effect(&mut tx, &correction, date).await?;

        let updated = transaction::update(&mut tx, &new).await?;
        tx.commit().await?;

        info!(
            id,
            old_total = %old.total,
            new_total = %updated.total,
            "Transaction corrected"
        );
        Ok(updated)
    }

    /// Deletes a transaction and reverses every effect it had.
    #[instrument(skip(self))]
    pub async fn delete_transaction(&self, id: i64) -> DbResult<Transaction> {
        let mut tx = self.pool.begin().await?;

        let record = transaction::lock(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("transaction", id))?;

        apply_effect(&mut tx, &record.effect()?.inverse(), Self::today()).await?;
        transaction::delete(&mut tx, id).await?;

        tx.commit().await?;

        info!(id, kind = %record.kind, total = %record.total, "Transaction reversed");
        Ok(record)
    }

    // =========================================================================
    // Expenses
    // =========================================================================

    #[instrument(skip(self, request))]
    pub async fn record_expense(&self, request: &CreateExpenseRequest) -> DbResult<Expense> {
        let mut tx = self.pool.begin().await?;
        let date = Self::today();

        let account_id = match request.account_name.as_deref() {
            Some(name) => Some(account::require_by_name(&mut tx, name).await?.id),
            None => None,
        };

        apply_effect(&mut tx, &expense_effect(request.amount, account_id), date).await?;
        let created =
            expense::insert(&mut tx, &request.description, request.amount, date, account_id)
                .await?;

        tx.commit().await?;

        info!(id = created.id, amount = %created.amount, account = ?created.account_name, "Expense recorded");
        Ok(created)
    }

    /// Reverses the original amount, then applies the new one.
    ///
    /// Two capital rows are appended (add original, subtract new); the
    /// account sees only the net difference.
    #[instrument(skip(self, changes))]
    pub async fn update_expense(&self, id: i64, changes: &UpdateExpenseRequest) -> DbResult<Expense> {
        let mut tx = self.pool.begin().await?;

        let old = expense::lock(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("expense", id))?;

        let new = Expense {
            description: changes.description.clone().unwrap_or_else(|| old.description.clone()),
            amount: changes.amount.unwrap_or(old.amount),
            ..old.clone()
        };

        let correction = old.effect()?.inverse().then(new.effect()?);
        apply_effect(&mut tx, &correction, Self::today()).await?;

        let updated = expense::update(&mut tx, id, &new.description, new.amount).await?;
        tx.commit().await?;

        info!(id, old_amount = %old.amount, new_amount = %updated.amount, "Expense corrected");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_expense(&self, id: i64) -> DbResult<Expense> {
        let mut tx = self.pool.begin().await?;

        let record = expense::lock(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("expense", id))?;

        apply_effect(&mut tx, &record.effect()?.inverse(), Self::today()).await?;
        expense::delete(&mut tx, id).await?;

        tx.commit().await?;

        info!(id, amount = %record.amount, "Expense reversed");
        Ok(record)
    }

    // =========================================================================
    // Purchases
    // =========================================================================

    /// Buys stock: debit the account (guarded), add units, overwrite the
    /// product's cost price.
    #[instrument(skip(self, request))]
    pub async fn record_purchase(&self, request: &CreatePurchaseRequest) -> DbResult<Purchase> {
        let mut tx = self.pool.begin().await?;
        let date = Self::today();

        let effect = purchase_effect(
            request.product_id,
            request.account_id,
            request.quantity,
            request.purchase_price,
        )?;
        apply_effect(&mut tx, &effect, date).await?;
        product::write_cost_price(&mut tx, request.product_id, request.purchase_price).await?;

        let created = purchase::insert(
            &mut tx,
            request.product_id,
            request.account_id,
            request.quantity,
            request.purchase_price,
            date,
        )
        .await?;

        tx.commit().await?;

        info!(
            id = created.id,
            product = %created.product_name,
            quantity = created.quantity,
            total = %created.total,
            "Purchase recorded"
        );
        Ok(created)
    }

    /// Reverses a purchase's stock and balance movement.
    ///
    /// Fails with `InsufficientStock` if the bought units were already sold.
    /// The product's cost price is left as is.
    #[instrument(skip(self))]
    pub async fn delete_purchase(&self, id: i64) -> DbResult<Purchase> {
        let mut tx = self.pool.begin().await?;

        let record = purchase::lock(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("purchase", id))?;

        apply_effect(&mut tx, &record.effect()?.inverse(), Self::today()).await?;
        purchase::delete(&mut tx, id).await?;

        tx.commit().await?;

        info!(id, product = %record.product_name, "Purchase reversed");
        Ok(record)
    }

    // =========================================================================
    // Capital and Accounts
    // =========================================================================

    /// Moves money in or out of the reserve account and records it as capital.
    ///
    /// Returns the reserve account after the adjustment.
    #[instrument(skip(self))]
    pub async fn adjust_capital(&self, adjustment: CapitalAdjustment) -> DbResult<Account> {
        let mut tx = self.pool.begin().await?;

        let reserve = self.reserve(&mut tx).await?;
        let effect = capital_adjustment_effect(reserve.id, adjustment.kind, adjustment.amount);
        apply_effect(&mut tx, &effect, Self::today()).await?;

        let updated = account::lock(&mut tx, reserve.id)
            .await?
            .ok_or_else(|| DbError::not_found("account", reserve.id))?;
        tx.commit().await?;

        info!(
            kind = %adjustment.kind,
            amount = %adjustment.amount,
            balance = %updated.balance,
            "Capital adjusted"
        );
        Ok(updated)
    }

    /// Guarded debit with no capital row (cash taken out for non-ledger use).
    #[instrument(skip(self, request))]
    pub async fn deduct(&self, request: &DeductRequest) -> DbResult<Account> {
        let mut tx = self.pool.begin().await?;

        let target = account::require_by_name(&mut tx, &request.account_name).await?;
        let effect = LedgerEffect::new().debit(target.id, request.amount);
        apply_effect(&mut tx, &effect, Self::today()).await?;

        let updated = account::lock(&mut tx, target.id)
            .await?
            .ok_or_else(|| DbError::not_found("account", target.id))?;
        tx.commit().await?;

        info!(account = %updated.name, amount = %request.amount, "Account deducted");
        Ok(updated)
    }
}
