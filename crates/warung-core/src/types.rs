//! # Domain Types
//!
//! Core domain types used throughout Warung.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   Transaction   │   │    Account      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  product_id     │   │  id             │       │
//! │  │  name (unique)  │   │  account_id ────┼──►│  name (unique)  │       │
//! │  │  stock ≥ 0      │   │  kind           │   │  balance        │       │
//! │  │  price          │   │  total          │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘            ▲                │
//! │                                                        │                │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌────────┴────────┐       │
//! │  │ CapitalHistory  │   │    Expense      │   │    Purchase     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  kind add/sub   │   │  amount         │   │  product_id     │       │
//! │  │  amount         │   │  account_id?    │   │  account_id     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity has a database-assigned `id`. Names on transactions and
//! purchases are display snapshots; relations always go through ids.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::access::Role;
use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A sellable item with tracked stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    pub id: i64,

    /// Unique (case-insensitive) display name; sales look products up by it.
    pub name: String,

    /// Units on hand. Never negative after a committed operation.
    pub stock: i64,

    /// Default selling price.
    pub price: Money,

    /// Most recent purchase cost (overwritten by every purchase).
    pub cost_price: Money,
}

// =============================================================================
// Account
// =============================================================================

/// A cash or bank pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub balance: Money,
}

// =============================================================================
// Transaction Kind
// =============================================================================

/// Discriminates the rows of the `transactions` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum TransactionKind {
    Sale,
    Withdrawal,
}

impl TransactionKind {
    pub const ALLOWED: &'static [&'static str] = &["sale", "withdrawal"];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Sale => "sale",
            TransactionKind::Withdrawal => "withdrawal",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sale" => Ok(TransactionKind::Sale),
            "withdrawal" => Ok(TransactionKind::Withdrawal),
            _ => Err(CoreError::InvalidArgument {
                field: "type",
                value: s.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale is settled, which decides where its money moves.
///
/// ```text
/// Cash      named account  −= quantity × costPrice
/// Transfer  named account  += quantity × sellingPrice
///           reserve account −= quantity × costPrice
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMethod {
    #[default]
    Cash,
    Transfer,
}

impl PaymentMethod {
    pub const ALLOWED: &'static [&'static str] = &["Cash", "Transfer"];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Transfer => "Transfer",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive: `"cash"`, `"CASH"` and `"Cash"` are the same method.
impl FromStr for PaymentMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "transfer" => Ok(PaymentMethod::Transfer),
            _ => Err(CoreError::InvalidArgument {
                field: "paymentMethod",
                value: s.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// One row of the sale/withdrawal history.
///
/// Withdrawals carry no product, a zero quantity and zero prices; their
/// `total` is the withdrawn amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Transaction {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub product_id: Option<i64>,
    pub product_name: Option<String>,
    pub quantity: i64,
    pub cost_price: Money,
    pub selling_price: Money,
    pub profit_per_unit: Money,
    pub total: Money,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub account_id: i64,
    pub account_name: String,
    /// Account that absorbed the cost of goods on a transfer sale.
    pub reserve_account_id: Option<i64>,
    pub payment_method: PaymentMethod,
    pub description: Option<String>,
    pub idempotency_key: Option<String>,
}

// =============================================================================
// Expense
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Expense {
    pub id: i64,
    pub description: String,
    pub amount: Money,
    #[ts(as = "String")]
    pub date: NaiveDate,
    /// Account debited alongside the capital entry, if any.
    pub account_id: Option<i64>,
    pub account_name: Option<String>,
}

// =============================================================================
// Capital History
// =============================================================================

/// Direction of a capital movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum CapitalType {
    Add,
    Subtract,
}

impl CapitalType {
    pub const ALLOWED: &'static [&'static str] = &["add", "subtract"];

    pub fn as_str(&self) -> &'static str {
        match self {
            CapitalType::Add => "add",
            CapitalType::Subtract => "subtract",
        }
    }

    /// The opposite direction, used when reversing an entry.
    pub fn flipped(&self) -> Self {
        match self {
            CapitalType::Add => CapitalType::Subtract,
            CapitalType::Subtract => CapitalType::Add,
        }
    }

    /// Applies the direction to an unsigned amount.
    pub fn signed(&self, amount: Money) -> Money {
        match self {
            CapitalType::Add => amount,
            CapitalType::Subtract => -amount,
        }
    }
}

impl fmt::Display for CapitalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapitalType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(CapitalType::Add),
            "subtract" => Ok(CapitalType::Subtract),
            _ => Err(CoreError::InvalidArgument {
                field: "type",
                value: s.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

/// One append-only row of `capital_history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CapitalHistory {
    pub id: i64,
    pub amount: Money,
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: CapitalType,
}

/// Total capital: the sum of `add` rows minus the sum of `subtract` rows.
pub fn total_capital<'a>(history: impl IntoIterator<Item = &'a CapitalHistory>) -> Money {
    history
        .into_iter()
        .map(|row| row.kind.signed(row.amount))
        .sum()
}

// =============================================================================
// Purchase
// =============================================================================

/// Stock bought into inventory, joined with product and account names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Purchase {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub account_id: i64,
    pub account_name: String,
    pub quantity: i64,
    pub purchase_price: Money,
    pub total: Money,
    #[ts(as = "String")]
    pub date: NaiveDate,
}

// =============================================================================
// User
// =============================================================================

/// A login identity. The password hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip)]
    #[ts(skip)]
    pub password_hash: String,
    pub role: Role,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Listing Filters
// =============================================================================

/// Inclusive date window for history listings. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_parse_is_case_insensitive() {
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!(" TRANSFER ".parse::<PaymentMethod>().unwrap(), PaymentMethod::Transfer);
        assert!(matches!(
            "qris".parse::<PaymentMethod>(),
            Err(CoreError::InvalidArgument { field: "paymentMethod", .. })
        ));
    }

    #[test]
    fn test_capital_type_parse_and_flip() {
        assert_eq!("add".parse::<CapitalType>().unwrap(), CapitalType::Add);
        assert_eq!(CapitalType::Add.flipped(), CapitalType::Subtract);
        assert!("withdraw".parse::<CapitalType>().is_err());
    }

    #[test]
    fn test_total_capital_is_order_independent() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let add = CapitalHistory {
            id: 1,
            amount: Money::from_major(100),
            date,
            kind: CapitalType::Add,
        };
        let sub = CapitalHistory {
            id: 2,
            amount: Money::from_major(30),
            date,
            kind: CapitalType::Subtract,
        };

        assert_eq!(total_capital([&add, &sub]), Money::from_major(70));
        assert_eq!(total_capital([&sub, &add]), Money::from_major(70));
        assert_eq!(total_capital([]), Money::zero());
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
        let range = DateRange {
            start: Some(d(2)),
            end: Some(d(4)),
        };
        assert!(!range.contains(d(1)));
        assert!(range.contains(d(2)));
        assert!(range.contains(d(4)));
        assert!(!range.contains(d(5)));
        assert!(DateRange::default().contains(d(1)));
    }

    #[test]
    fn test_transaction_serializes_type_field() {
        let tx = Transaction {
            id: 7,
            kind: TransactionKind::Sale,
            product_id: Some(1),
            product_name: Some("Kopi".to_string()),
            quantity: 3,
            cost_price: Money::from_major(5),
            selling_price: Money::from_major(8),
            profit_per_unit: Money::from_major(3),
            total: Money::from_major(24),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            account_id: 2,
            account_name: "Kas".to_string(),
            reserve_account_id: None,
            payment_method: PaymentMethod::Cash,
            description: None,
            idempotency_key: None,
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "sale");
        assert_eq!(json["total"], "24");
        assert_eq!(json["paymentMethod"], "Cash");
        assert_eq!(json["date"], "2024-05-01");
    }
}
