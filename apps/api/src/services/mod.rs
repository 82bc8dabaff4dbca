//! HTTP service handlers and the router.
//!
//! Every protected handler takes a [`CurrentUser`](crate::auth::CurrentUser)
//! and calls `authorize` before touching the ledger.

pub mod account_service;
pub mod auth_service;
pub mod capital_service;
pub mod expense_service;
pub mod health_service;
pub mod product_service;
pub mod purchase_service;
pub mod transaction_service;

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::state::AppState;

/// Builds the full route table.
pub fn create_router(state: AppState) -> Router {
    let auth = Router::<AppState>::new()
        .route("/register", post(auth_service::register))
        .route("/login", post(auth_service::login));

    let transactions = Router::<AppState>::new()
        .route(
            "/transactions",
            post(transaction_service::create_transaction)
                .get(transaction_service::list_transactions),
        )
        .route(
            "/transactions/{id}",
            put(transaction_service::update_transaction)
                .delete(transaction_service::delete_transaction),
        );

    let products = Router::<AppState>::new()
        .route(
            "/products",
            post(product_service::create_product).get(product_service::list_products),
        )
        .route(
            "/products/{id}",
            put(product_service::update_product).delete(product_service::delete_product),
        );

    let expenses = Router::<AppState>::new()
        .route(
            "/expenses",
            post(expense_service::create_expense).get(expense_service::list_expenses),
        )
        .route(
            "/expenses/{id}",
            put(expense_service::update_expense).delete(expense_service::delete_expense),
        );

    // `/accounts/deduct` is a static segment and wins over `{id}`.
    let accounts = Router::<AppState>::new()
        .route(
            "/accounts",
            post(account_service::create_account).get(account_service::list_accounts),
        )
        .route("/accounts/deduct", put(account_service::deduct_account))
        .route(
            "/accounts/{id}",
            put(account_service::update_account).delete(account_service::delete_account),
        );

    let capital = Router::<AppState>::new()
        .route(
            "/capital",
            post(capital_service::adjust_capital).get(capital_service::list_capital),
        )
        .route("/capital/total", get(capital_service::total_capital));

    let purchases = Router::<AppState>::new()
        .route(
            "/purchases",
            post(purchase_service::create_purchase).get(purchase_service::list_purchases),
        )
        .route("/purchases/{id}", delete(purchase_service::delete_purchase));

    Router::new()
        .route("/health", get(health_service::health_check))
        .merge(auth)
        .merge(transactions)
        .merge(products)
        .merge(expenses)
        .merge(accounts)
        .merge(capital)
        .merge(purchases)
        .with_state(state)
}
