//! # Warung API
//!
//! REST server for the Warung bookkeeping ledger.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Warung API Services                             │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  Auth          │  │  Transactions  │  │  Catalogue                 ││
//! │  │                │  │                │  │                            ││
//! │  │ • register     │  │ • sale         │  │ • products                 ││
//! │  │ • login        │  │ • withdrawal   │  │ • accounts (+ deduct)      ││
//! │  │                │  │ • correct/undo │  │                            ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────┐            │
//! │  │  Expenses      │  │  Capital       │  │  Purchases     │            │
//! │  │                │  │                │  │                │            │
//! │  │ • record       │  │ • adjust       │  │ • record       │            │
//! │  │ • correct/undo │  │ • history/total│  │ • reverse      │            │
//! │  └────────────────┘  └────────────────┘  └────────────────┘            │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │                                                                   │  │
//! │  │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────────┐│  │
//! │  │  │  warung-db   │  │  JWT + argon2    │  │  Access policy       ││  │
//! │  │  │              │  │                  │  │                      ││  │
//! │  │  │ Ledger +     │  │ Bearer tokens    │  │ warung_core::access  ││  │
//! │  │  │ repositories │  │ Password hashes  │  │ POLICY table         ││  │
//! │  │  └──────────────┘  └──────────────────┘  └──────────────────────┘│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! `warung.toml` (optional) and environment variables:
//! - `WARUNG_DATABASE_URL` - PostgreSQL connection string
//! - `WARUNG_PORT` - HTTP port (default: 3000)
//! - `WARUNG_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `WARUNG_JWT_SECRET` - Secret for JWT signing
//! - `WARUNG_JWT_LIFETIME_SECS` - Token lifetime (default: 28800)
//! - `WARUNG_RESERVE_ACCOUNT_NAME` - Reserve account (default: "Remaining Capital")
//! - `WARUNG_REQUEST_TIMEOUT_SECS` - Request timeout (default: 30)

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod services;
pub mod state;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use services::create_router;
pub use state::AppState;
