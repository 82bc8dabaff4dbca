//! # Ledger Effects
//!
//! Every money- or stock-moving operation in Warung is described here as a
//! pure [`LedgerEffect`] before anything touches the database.
//!
//! ## Forward, Reverse, Correct
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       One Effect, Three Uses                            │
//! │                                                                         │
//! │   stored row ──► LedgerRecord::effect() ──► LedgerEffect               │
//! │                                                  │                      │
//! │         ┌────────────────────────┬───────────────┴──────────┐          │
//! │         ▼                        ▼                          ▼          │
//! │   create: effect          delete: effect.inverse()   update:           │
//! │                                                       old.inverse()    │
//! │                                                         .then(new)     │
//! │         │                        │                          │          │
//! │         └────────────────────────┴──────────────────────────┘          │
//! │                                  ▼                                      │
//! │             warung-db apply_effect (locks, guards, writes)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Because reversal is derived from the same function that built the forward
//! effect, a delete always restores exactly what the create moved.
//!
//! ## Effects per Operation
//! ```text
//! Operation            stock          balances                     capital
//! ───────────────────  ─────────────  ───────────────────────────  ────────────
//! Sale (Cash)          product −qty   account −qty×cost            add total
//! Sale (Transfer)      product −qty   account +total,              add total
//!                                     reserve −qty×cost
//! Withdrawal           -              account −amount              subtract amt
//! Expense              -              account −amount (optional)   subtract amt
//! Purchase             product +qty   account −qty×price           -
//! Capital adjustment   -              reserve ±amount              same type
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CapitalType, Expense, PaymentMethod, Purchase, Transaction, TransactionKind};

// =============================================================================
// Capital Entry
// =============================================================================

/// A capital_history row waiting to be appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalEntry {
    pub kind: CapitalType,
    pub amount: Money,
}

impl CapitalEntry {
    pub fn signed(&self) -> Money {
        self.kind.signed(self.amount)
    }
}

// =============================================================================
// Ledger Effect
// =============================================================================

/// The complete set of mutations one ledger operation performs.
///
/// Deltas are keyed by entity id in `BTreeMap`s, so iteration is always in
/// ascending id order. The database layer locks rows in exactly that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerEffect {
    stock: BTreeMap<i64, i64>,
    balances: BTreeMap<i64, Money>,
    capital: Vec<CapitalEntry>,
}

impl LedgerEffect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a signed stock change for a product.
    pub fn adjust_stock(mut self, product_id: i64, delta: i64) -> Self {
        *self.stock.entry(product_id).or_insert(0) += delta;
        self.stock.retain(|_, d| *d != 0);
        self
    }

    /// Adds a signed balance change for an account.
    pub fn adjust_balance(mut self, account_id: i64, delta: Money) -> Self {
        *self.balances.entry(account_id).or_default() += delta;
        self.balances.retain(|_, d| !d.is_zero());
        self
    }

    pub fn credit(self, account_id: i64, amount: Money) -> Self {
        self.adjust_balance(account_id, amount)
    }

    pub fn debit(self, account_id: i64, amount: Money) -> Self {
        self.adjust_balance(account_id, -amount)
    }

    /// Appends a capital movement. Zero amounts are still recorded.
    pub fn record_capital(mut self, kind: CapitalType, amount: Money) -> Self {
        self.capital.push(CapitalEntry { kind, amount });
        self
    }

    /// The exact algebraic undo of this effect.
    ///
    /// Stock and balance deltas are negated; every capital entry is kept with
    /// its type flipped, so the audit trail shows the compensation.
    ///
    /// ```rust
    /// use warung_core::ledger::LedgerEffect;
    /// use warung_core::money::Money;
    /// use warung_core::types::CapitalType;
    ///
    /// let sale = LedgerEffect::new()
    ///     .adjust_stock(1, -3)
    ///     .debit(2, Money::from_major(15))
    ///     .record_capital(CapitalType::Add, Money::from_major(24));
    ///
    /// let undo = sale.inverse();
    /// assert_eq!(undo.stock_delta(1), 3);
    /// assert_eq!(undo.balance_delta(2), Money::from_major(15));
    /// assert_eq!(undo.capital_net(), Money::from_major(-24));
    /// ```
    pub fn inverse(&self) -> Self {
        LedgerEffect {
            stock: self.stock.iter().map(|(&id, &d)| (id, -d)).collect(),
            balances: self.balances.iter().map(|(&id, &d)| (id, -d)).collect(),
            capital: self
                .capital
                .iter()
                .map(|entry| CapitalEntry {
                    kind: entry.kind.flipped(),
                    amount: entry.amount,
                })
                .collect(),
        }
    }

    /// Sequential composition: this effect, then `next`.
    ///
    /// Deltas on the same entity are netted, so guards see the combined
    /// change. Capital entries are concatenated.
    pub fn then(mut self, next: LedgerEffect) -> Self {
        for (id, delta) in next.stock {
            self = self.adjust_stock(id, delta);
        }
        for (id, delta) in next.balances {
            self = self.adjust_balance(id, delta);
        }
        self.capital.extend(next.capital);
        self
    }

    /// Stock deltas in ascending product id order.
    pub fn stock_deltas(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.stock.iter().map(|(&id, &d)| (id, d))
    }

    /// Balance deltas in ascending account id order.
    pub fn balance_deltas(&self) -> impl Iterator<Item = (i64, Money)> + '_ {
        self.balances.iter().map(|(&id, &d)| (id, d))
    }

    pub fn capital_entries(&self) -> &[CapitalEntry] {
        &self.capital
    }

    pub fn stock_delta(&self, product_id: i64) -> i64 {
        self.stock.get(&product_id).copied().unwrap_or(0)
    }

    pub fn balance_delta(&self, account_id: i64) -> Money {
        self.balances.get(&account_id).copied().unwrap_or_default()
    }

    /// Net change to total capital.
    pub fn capital_net(&self) -> Money {
        self.capital.iter().map(CapitalEntry::signed).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.stock.is_empty() && self.balances.is_empty() && self.capital.is_empty()
    }
}

// =============================================================================
// Guards
// =============================================================================

/// Checks a stock change against the locked stock level.
///
/// Returns the new stock on success.
pub fn guard_stock(product: &str, stock: i64, delta: i64) -> CoreResult<i64> {
    let next = stock.checked_add(delta).ok_or_else(|| ValidationError::OutOfRange {
        field: "stock".to_string(),
        reason: format!("{product} would pass {}", i64::MAX),
    })?;
    if next < 0 {
        return Err(CoreError::InsufficientStock {
            product: product.to_string(),
            available: stock,
            requested: -delta,
        });
    }
    Ok(next)
}

/// Checks a balance change against the locked balance.
///
/// Debits must not take the account below zero; a credit on an account an
/// administrator has set below zero still succeeds. Either way the new
/// balance has to fit the store.
pub fn guard_balance(account: &str, balance: Money, delta: Money) -> CoreResult<Money> {
    let next = balance
        .checked_add(delta)
        .ok_or_else(|| Money::out_of_range("balance"))?;
    if delta.is_negative() && next.is_negative() {
        return Err(CoreError::InsufficientFunds {
            account: account.to_string(),
            balance,
            requested: -delta,
        });
    }
    if !next.fits_store_range() {
        return Err(Money::out_of_range("balance").into());
    }
    Ok(next)
}

// =============================================================================
// Sale Amounts
// =============================================================================

/// Quantity and unit prices of one sale line, plus everything derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleAmounts {
    pub quantity: i64,
    pub cost_price: Money,
    pub selling_price: Money,
}

impl SaleAmounts {
    /// `quantity × selling_price`
    pub fn total(&self) -> CoreResult<Money> {
        self.selling_price.multiply_quantity(self.quantity)
    }

    /// `quantity × cost_price`
    pub fn total_cost(&self) -> CoreResult<Money> {
        self.cost_price.multiply_quantity(self.quantity)
    }

    pub fn profit_per_unit(&self) -> Money {
        self.selling_price - self.cost_price
    }

    /// Overlays the provided fields, keeping the stored value for the rest.
    pub fn with_changes(
        &self,
        quantity: Option<i64>,
        cost_price: Option<Money>,
        selling_price: Option<Money>,
    ) -> Self {
        SaleAmounts {
            quantity: quantity.unwrap_or(self.quantity),
            cost_price: cost_price.unwrap_or(self.cost_price),
            selling_price: selling_price.unwrap_or(self.selling_price),
        }
    }
}

// =============================================================================
// Effect Builders
// =============================================================================

/// Effect of selling one line.
///
/// `reserve_account_id` is required for [`PaymentMethod::Transfer`].
pub fn sale_effect(
    product_id: i64,
    amounts: &SaleAmounts,
    method: PaymentMethod,
    account_id: i64,
    reserve_account_id: Option<i64>,
) -> CoreResult<LedgerEffect> {
    let total = amounts.total()?;
    let total_cost = amounts.total_cost()?;
    let effect = LedgerEffect::new().adjust_stock(product_id, -amounts.quantity);

    let effect = match method {
        PaymentMethod::Cash => effect.debit(account_id, total_cost),
        PaymentMethod::Transfer => {
            let reserve = reserve_account_id
                .ok_or_else(|| CoreError::not_found("account", "reserve account"))?;
            effect.credit(account_id, total).debit(reserve, total_cost)
        }
    };

    Ok(effect.record_capital(CapitalType::Add, total))
}

pub fn withdrawal_effect(account_id: i64, amount: Money) -> LedgerEffect {
    LedgerEffect::new()
        .debit(account_id, amount)
        .record_capital(CapitalType::Subtract, amount)
}

pub fn expense_effect(amount: Money, account_id: Option<i64>) -> LedgerEffect {
    let effect = LedgerEffect::new().record_capital(CapitalType::Subtract, amount);
    match account_id {
        Some(id) => effect.debit(id, amount),
        None => effect,
    }
}

/// Purchases move stock and cash only; they do not touch capital.
pub fn purchase_effect(
    product_id: i64,
    account_id: i64,
    quantity: i64,
    purchase_price: Money,
) -> CoreResult<LedgerEffect> {
    Ok(LedgerEffect::new()
        .adjust_stock(product_id, quantity)
        .debit(account_id, purchase_price.multiply_quantity(quantity)?))
}

pub fn capital_adjustment_effect(
    reserve_account_id: i64,
    kind: CapitalType,
    amount: Money,
) -> LedgerEffect {
    LedgerEffect::new()
        .adjust_balance(reserve_account_id, kind.signed(amount))
        .record_capital(kind, amount)
}

// =============================================================================
// Stored Records
// =============================================================================

/// A persisted row whose ledger effect can be rebuilt from its own columns.
pub trait LedgerRecord {
    fn effect(&self) -> CoreResult<LedgerEffect>;
}

impl Transaction {
    pub fn amounts(&self) -> SaleAmounts {
        SaleAmounts {
            quantity: self.quantity,
            cost_price: self.cost_price,
            selling_price: self.selling_price,
        }
    }
}

impl LedgerRecord for Transaction {
    fn effect(&self) -> CoreResult<LedgerEffect> {
        match self.kind {
            TransactionKind::Sale => {
                let product_id = self
                    .product_id
                    .ok_or_else(|| CoreError::not_found("product", format!("transaction {}", self.id)))?;
                sale_effect(
                    product_id,
                    &self.amounts(),
                    self.payment_method,
                    self.account_id,
                    self.reserve_account_id,
                )
            }
            TransactionKind::Withdrawal => Ok(withdrawal_effect(self.account_id, self.total)),
        }
    }
}

impl LedgerRecord for Expense {
    fn effect(&self) -> CoreResult<LedgerEffect> {
        Ok(expense_effect(self.amount, self.account_id))
    }
}

impl LedgerRecord for Purchase {
    fn effect(&self) -> CoreResult<LedgerEffect> {
        purchase_effect(
            self.product_id,
            self.account_id,
            self.quantity,
            self.purchase_price,
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
