//! # Access Policy
//!
//! Which role may run which operation, as one declarative table.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  request ──► bearer token ──► Role ──► authorize(role, Operation)      │
//! │                                              │                          │
//! │                                 ┌────────────┴────────────┐            │
//! │                                 ▼                         ▼            │
//! │                           allowed: run the          denied: 403,       │
//! │                           ledger operation          nothing locked     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Public endpoints (login, health) are not operations and never consult
//! this table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;

// =============================================================================
// Role
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    /// Owner: full bookkeeping rights, including corrections.
    Admin,
    /// Cashier: records sales and expenses, reads lists.
    Kasir,
}

impl Role {
    pub const ALLOWED: &'static [&'static str] = &["admin", "kasir"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Kasir => "kasir",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "kasir" => Ok(Role::Kasir),
            _ => Err(CoreError::InvalidArgument {
                field: "role",
                value: s.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

// =============================================================================
// Operation
// =============================================================================

/// Every authenticated operation the API exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    RegisterUser,

    CreateTransaction,
    ListTransactions,
    UpdateTransaction,
    DeleteTransaction,

    CreateProduct,
    ListProducts,
    UpdateProduct,
    DeleteProduct,

    CreateExpense,
    ListExpenses,
    UpdateExpense,
    DeleteExpense,

    CreateAccount,
    ListAccounts,
    UpdateAccount,
    DeductAccount,
    DeleteAccount,

    AdjustCapital,
    ListCapital,
    TotalCapital,

    CreatePurchase,
    ListPurchases,
    DeletePurchase,
}

// =============================================================================
// Policy Table
// =============================================================================

const ADMIN: &[Role] = &[Role::Admin];
const STAFF: &[Role] = &[Role::Admin, Role::Kasir];

/// `(operation, roles allowed)`. An operation missing here is denied to all.
pub const POLICY: &[(Operation, &[Role])] = &[
    (Operation::RegisterUser, ADMIN),
    // Transactions
    (Operation::CreateTransaction, STAFF),
    (Operation::ListTransactions, STAFF),
    (Operation::UpdateTransaction, ADMIN),
    (Operation::DeleteTransaction, ADMIN),
    // Products
    (Operation::CreateProduct, ADMIN),
    (Operation::ListProducts, STAFF),
    (Operation::UpdateProduct, ADMIN),
    (Operation::DeleteProduct, ADMIN),
    // Expenses
    (Operation::CreateExpense, STAFF),
    (Operation::ListExpenses, STAFF),
    (Operation::UpdateExpense, ADMIN),
    (Operation::DeleteExpense, ADMIN),
    // Accounts
    (Operation::CreateAccount, ADMIN),
    (Operation::ListAccounts, STAFF),
    (Operation::UpdateAccount, ADMIN),
    (Operation::DeductAccount, ADMIN),
    (Operation::DeleteAccount, ADMIN),
    // Capital
    (Operation::AdjustCapital, ADMIN),
    (Operation::ListCapital, ADMIN),
    (Operation::TotalCapital, STAFF),
    // Purchases
    (Operation::CreatePurchase, ADMIN),
    (Operation::ListPurchases, ADMIN),
    (Operation::DeletePurchase, ADMIN),
];

/// Looks the operation up in [`POLICY`].
///
/// ```rust
/// use warung_core::access::{is_allowed, Operation, Role};
///
/// assert!(is_allowed(Role::Kasir, Operation::CreateTransaction));
/// assert!(!is_allowed(Role::Kasir, Operation::DeleteTransaction));
/// ```
pub fn is_allowed(role: Role, operation: Operation) -> bool {
    POLICY
        .iter()
        .find(|(op, _)| *op == operation)
        .is_some_and(|(_, roles)| roles.contains(&role))
}

// =============================================================================
// Unit Tests
// =============================================================================
