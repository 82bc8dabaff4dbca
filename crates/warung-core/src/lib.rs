//! # warung-core: Pure Ledger Logic for Warung
//!
//! This crate is the **heart** of Warung. It decides what every bookkeeping
//! operation does to stock, balances and capital, with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Warung Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │    auth ──► policy check ──► ledger operation ──► JSON          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ warung-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  ledger   │  │  access   │  │   │
//! │  │   │  Product  │  │   Money   │  │  Effect   │  │  POLICY   │  │   │
//! │  │   │  Account  │  │  Decimal  │  │  inverse  │  │   Role    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   warung-db (Database Layer)                    │   │
//! │  │        PostgreSQL, row locks, apply_effect, repositories        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Account, Transaction, ...)
//! - [`money`] - Exact decimal `Money`
//! - [`ledger`] - `LedgerEffect`, inverses, guards, effect builders
//! - [`requests`] - Client input shapes and their validation
//! - [`access`] - Role/operation policy table
//! - [`error`] - Domain error types
//! - [`validation`] - Field validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use warung_core::ledger::{sale_effect, SaleAmounts};
//! use warung_core::{Money, PaymentMethod};
//!
//! let amounts = SaleAmounts {
//!     quantity: 3,
//!     cost_price: Money::from_major(5),
//!     selling_price: Money::from_major(8),
//! };
//! let effect = sale_effect(1, &amounts, PaymentMethod::Cash, 7, None).unwrap();
//!
//! assert_eq!(effect.stock_delta(1), -3);
//! assert_eq!(effect.balance_delta(7), Money::from_major(-15));
//! assert_eq!(effect.capital_net(), Money::from_major(24));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod error;
pub mod ledger;
pub mod money;
pub mod requests;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use warung_core::Money` instead of
// `use warung_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::{LedgerEffect, LedgerRecord};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Name of the reserve ("remaining capital") account when none is configured.
pub const DEFAULT_RESERVE_ACCOUNT: &str = "Remaining Capital";

/// Maximum length of product, account and user names.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum units moved by one sale line or purchase.
///
/// ## Business Reason
/// Catches typos like 10000 instead of 100 before they empty the shelf.
pub const MAX_QUANTITY: i64 = 100_000;

/// Maximum lines in one multi-item sale.
pub const MAX_SALE_LINES: usize = 100;
