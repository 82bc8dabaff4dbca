//! # Ledger Integration Tests
//!
//! Run against a real PostgreSQL server. Each test creates its own schema,
//! so tests run in parallel against one database.
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/warung_test cargo test -p warung-db --test ledger_tests
//! ```
//!
//! Without `DATABASE_URL` every test returns early.

use sqlx::postgres::PgPoolOptions;
use warung_core::ledger::SaleAmounts;
use warung_core::requests::{
    CapitalAdjustment, CreateAccountRequest, CreateExpenseRequest, CreateProductRequest,
    CreatePurchaseRequest, CreateTransactionRequest, DeductRequest, SaleCommand, SaleLine,
    SaleLineInput, TransactionCommand, UpdateAccountRequest, UpdateExpenseRequest,
    UpdateTransactionRequest,
};
use warung_core::{
    Account, CapitalType, CoreError, DateRange, Money, PaymentMethod, Product, ValidationError,
};
use warung_db::{Database, DbConfig, DbError, Ledger};

const RESERVE: &str = "Remaining Capital";

// =============================================================================
// Fixtures
// =============================================================================

async fn test_db() -> Option<(Database, Ledger)> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set, skipping");
            return None;
        }
    };

    let schema = format!("test_{}", uuid::Uuid::new_v4().simple());

    let admin = PgPoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .expect("connect for schema setup");
    sqlx::query(&format!("CREATE SCHEMA {schema}"))
        .execute(&admin)
        .await
        .expect("create schema");
    admin.close().await;

    let db = Database::new(DbConfig::new(url).schema(schema))
        .await
        .expect("connect and migrate");
    let ledger = db.ledger(RESERVE);
    ledger.ensure_reserve_account().await.expect("reserve account");
    Some((db, ledger))
}

async fn product(db: &Database, name: &str, stock: i64, cost: i64, price: i64) -> Product {
    db.products()
        .create(&CreateProductRequest {
            name: name.to_string(),
            stock,
            price: Money::from_major(price),
            cost_price: Money::from_major(cost),
        })
        .await
        .expect("create product")
}

async fn account(db: &Database, name: &str, balance: i64) -> Account {
    db.accounts()
        .create(&CreateAccountRequest {
            name: name.to_string(),
            balance: Money::from_major(balance),
        })
        .await
        .expect("create account")
}

async fn balance_of(db: &Database, id: i64) -> Money {
    db.accounts().get_by_id(id).await.unwrap().unwrap().balance
}

async fn stock_of(db: &Database, id: i64) -> i64 {
    db.products().get_by_id(id).await.unwrap().unwrap().stock
}

fn sale(product: &str, quantity: i64, cost: i64, price: i64, account: &str) -> TransactionCommand {
    CreateTransactionRequest {
        product_name: Some(product.to_string()),
        quantity: Some(quantity),
        cost_price: Some(Money::from_major(cost)),
        selling_price: Some(Money::from_major(price)),
        account_name: Some(account.to_string()),
        ..Default::default()
    }
    .validate()
    .unwrap()
}

// =============================================================================
// Sales
// =============================================================================

#[tokio::test]
async fn test_sale_then_delete_restores_everything() {
    let Some((db, ledger)) = test_db().await else { return };
    let kopi = product(&db, "Kopi", 10, 5, 8).await;
    let kas = account(&db, "Kas", 100).await;

    let recorded = ledger
        .record_transaction(sale("Kopi", 3, 5, 8, "Kas"), None)
        .await
        .unwrap();
    assert!(!recorded.replayed);
    let tx = &recorded.transactions[0];
    assert_eq!(tx.total, Money::from_major(24));
    assert_eq!(tx.profit_per_unit, Money::from_major(3));
    assert_eq!(tx.product_id, Some(kopi.id));

    assert_eq!(stock_of(&db, kopi.id).await, 7);
    assert_eq!(balance_of(&db, kas.id).await, Money::from_major(85));
    assert_eq!(db.capital().total().await.unwrap(), Money::from_major(24));

    ledger.delete_transaction(tx.id).await.unwrap();

    assert_eq!(stock_of(&db, kopi.id).await, 10);
    assert_eq!(balance_of(&db, kas.id).await, Money::from_major(100));
    assert_eq!(db.capital().total().await.unwrap(), Money::zero());
    assert_eq!(db.capital().list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_insufficient_stock_changes_nothing() {
    let Some((db, ledger)) = test_db().await else { return };
    let kopi = product(&db, "Kopi", 2, 5, 8).await;
    let kas = account(&db, "Kas", 100).await;

    let err = ledger
        .record_transaction(sale("Kopi", 3, 5, 8, "Kas"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Rule(CoreError::InsufficientStock { .. })));

    assert_eq!(stock_of(&db, kopi.id).await, 2);
    assert_eq!(balance_of(&db, kas.id).await, Money::from_major(100));
    assert!(db.capital().list().await.unwrap().is_empty());
    assert!(db.transactions().list(DateRange::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_insufficient_funds_changes_nothing() {
    let Some((db, ledger)) = test_db().await else { return };
    let kopi = product(&db, "Kopi", 10, 5, 8).await;
    let kas = account(&db, "Kas", 10).await;

    let err = ledger
        .record_transaction(sale("Kopi", 3, 5, 8, "Kas"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Rule(CoreError::InsufficientFunds { .. })));

    assert_eq!(stock_of(&db, kopi.id).await, 10);
    assert_eq!(balance_of(&db, kas.id).await, Money::from_major(10));
    assert!(db.capital().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let Some((db, ledger)) = test_db().await else { return };
    account(&db, "Kas", 100).await;

    let err = ledger
        .record_transaction(sale("Nothing", 1, 5, 8, "Kas"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Rule(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn test_multi_line_sale_is_all_or_nothing() {
    let Some((db, ledger)) = test_db().await else { return };
    let kopi = product(&db, "Kopi", 10, 5, 8).await;
    let teh = product(&db, "Teh", 1, 3, 5).await;
    let kas = account(&db, "Kas", 100).await;

    let line = |name: &str, quantity: i64, cost: i64, price: i64| SaleLineInput {
        product_name: name.to_string(),
        quantity,
        cost_price: Money::from_major(cost),
        selling_price: Money::from_major(price),
    };
    let command = |items| {
        CreateTransactionRequest {
            items,
            account_name: Some("Kas".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap()
    };

    let err = ledger
        .record_transaction(command(vec![line("Kopi", 2, 5, 8), line("Teh", 2, 3, 5)]), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Rule(CoreError::InsufficientStock { .. })));
    assert_eq!(stock_of(&db, kopi.id).await, 10);
    assert_eq!(stock_of(&db, teh.id).await, 1);

    let recorded = ledger
        .record_transaction(command(vec![line("Kopi", 2, 5, 8), line("Teh", 1, 3, 5)]), None)
        .await
        .unwrap();
    assert_eq!(recorded.transactions.len(), 2);
    assert_eq!(stock_of(&db, kopi.id).await, 8);
    assert_eq!(stock_of(&db, teh.id).await, 0);
    assert_eq!(balance_of(&db, kas.id).await, Money::from_major(87));
    assert_eq!(db.capital().total().await.unwrap(), Money::from_major(21));
}

#[tokio::test]
async fn test_transfer_sale_debits_reserve() {
    let Some((db, ledger)) = test_db().await else { return };
    let kopi = product(&db, "Kopi", 10, 5, 8).await;
    let bank = account(&db, "Bank", 0).await;
    let reserve = db.accounts().get_by_name(RESERVE).await.unwrap().unwrap();
    db.accounts()
        .update(
            reserve.id,
            &warung_core::requests::UpdateAccountRequest {
                name: None,
                balance: Some(Money::from_major(50)),
            },
            RESERVE,
        )
        .await
        .unwrap();

    let command = CreateTransactionRequest {
        product_name: Some("Kopi".to_string()),
        quantity: Some(3),
        cost_price: Some(Money::from_major(5)),
        selling_price: Some(Money::from_major(8)),
        account_name: Some("Bank".to_string()),
        payment_method: Some("transfer".to_string()),
        ..Default::default()
    }
    .validate()
    .unwrap();

    let recorded = ledger.record_transaction(command, None).await.unwrap();
    assert_eq!(recorded.transactions[0].reserve_account_id, Some(reserve.id));

    assert_eq!(stock_of(&db, kopi.id).await, 7);
    assert_eq!(balance_of(&db, bank.id).await, Money::from_major(24));
    assert_eq!(balance_of(&db, reserve.id).await, Money::from_major(35));

    ledger.delete_transaction(recorded.transactions[0].id).await.unwrap();
    assert_eq!(balance_of(&db, bank.id).await, Money::zero());
    assert_eq!(balance_of(&db, reserve.id).await, Money::from_major(50));
}

#[tokio::test]
async fn test_update_sale_applies_net_difference() {
    let Some((db, ledger)) = test_db().await else { return };
    let kopi = product(&db, "Kopi", 10, 5, 8).await;
    let kas = account(&db, "Kas", 100).await;

    let recorded = ledger
        .record_transaction(sale("Kopi", 3, 5, 8, "Kas"), None)
        .await
        .unwrap();
    let id = recorded.transactions[0].id;

    let updated = ledger
        .update_transaction(
            id,
            UpdateTransactionRequest {
                quantity: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.quantity, 5);
    assert_eq!(updated.total, Money::from_major(40));
    assert_eq!(stock_of(&db, kopi.id).await, 5);
    assert_eq!(balance_of(&db, kas.id).await, Money::from_major(75));
    assert_eq!(db.capital().total().await.unwrap(), Money::from_major(40));

    let err = ledger
        .update_transaction(
            id,
            UpdateTransactionRequest {
                quantity: Some(50),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Rule(CoreError::InsufficientStock { .. })));
    assert_eq!(stock_of(&db, kopi.id).await, 5);
}

#[tokio::test]
async fn test_withdrawal() {
    let Some((db, ledger)) = test_db().await else { return };
    let kas = account(&db, "Kas", 100).await;

    let command = CreateTransactionRequest {
        kind: Some("withdrawal".to_string()),
        account_name: Some("Kas".to_string()),
        amount: Some(Money::from_major(30)),
        ..Default::default()
    }
    .validate()
    .unwrap();

    let recorded = ledger.record_transaction(command, None).await.unwrap();
    assert_eq!(balance_of(&db, kas.id).await, Money::from_major(70));
    assert_eq!(db.capital().total().await.unwrap(), Money::from_major(-30));

    ledger.delete_transaction(recorded.transactions[0].id).await.unwrap();
    assert_eq!(balance_of(&db, kas.id).await, Money::from_major(100));
    assert_eq!(db.capital().total().await.unwrap(), Money::zero());
}

// =============================================================================
// Idempotency and Concurrency
// =============================================================================

#[tokio::test]
async fn test_idempotent_replay_applies_once() {
    let Some((db, ledger)) = test_db().await else { return };
    let kopi = product(&db, "Kopi", 10, 5, 8).await;
    account(&db, "Kas", 100).await;

    let first = ledger
        .record_transaction(sale("Kopi", 3, 5, 8, "Kas"), Some("pos-1-0001"))
        .await
        .unwrap();
    let second = ledger
        .record_transaction(sale("Kopi", 3, 5, 8, "Kas"), Some("pos-1-0001"))
        .await
        .unwrap();

    assert!(!first.replayed);
    assert!(second.replayed);
    assert_eq!(first.transactions[0].id, second.transactions[0].id);
    assert_eq!(stock_of(&db, kopi.id).await, 7);
    assert_eq!(db.transactions().list(DateRange::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_sales_on_one_account_never_overdraw() {
    let Some((db, ledger)) = test_db().await else { return };
    let kopi = product(&db, "Kopi", 10, 5, 8).await;
    let kas = account(&db, "Kas", 15).await;

    // Each sale costs 15; only one can fit in the balance.
    let tasks: Vec<_> = (0..2)
        .map(|_| {
            let ledger = ledger.clone();
            tokio::spawn(async move {
                ledger
                    .record_transaction(sale("Kopi", 3, 5, 8, "Kas"), None)
                    .await
            })
        })
        .collect();

    let mut results = Vec::new();
    for task in tasks {
        results.push(task.await.expect("sale task panicked"));
    }

    let (won, lost): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    assert_eq!(won.len(), 1);
    assert_eq!(lost.len(), 1);
    assert!(matches!(
        lost[0],
        Err(DbError::Rule(CoreError::InsufficientFunds { .. }))
    ));
    assert_eq!(balance_of(&db, kas.id).await, Money::zero());
    assert_eq!(stock_of(&db, kopi.id).await, 7);
}

// =============================================================================
// Expenses, Capital, Purchases
// =============================================================================

#[tokio::test]
async fn test_expense_correction_moves_only_the_difference() {
    let Some((db, ledger)) = test_db().await else { return };
    let kas = account(&db, "Kas", 200).await;

    let expense = ledger
        .record_expense(&CreateExpenseRequest {
            description: "Listrik".to_string(),
            amount: Money::from_major(50),
            account_name: Some("Kas".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(balance_of(&db, kas.id).await, Money::from_major(150));

    let updated = ledger
        .update_expense(
            expense.id,
            &UpdateExpenseRequest {
                description: None,
                amount: Some(Money::from_major(80)),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.amount, Money::from_major(80));
    assert_eq!(updated.description, "Listrik");
    assert_eq!(balance_of(&db, kas.id).await, Money::from_major(120));
    assert_eq!(db.capital().total().await.unwrap(), Money::from_major(-80));

    ledger.delete_expense(expense.id).await.unwrap();
    assert_eq!(balance_of(&db, kas.id).await, Money::from_major(200));
    assert_eq!(db.capital().total().await.unwrap(), Money::zero());
}

#[tokio::test]
async fn test_expense_without_account_touches_only_capital() {
    let Some((db, ledger)) = test_db().await else { return };

    ledger
        .record_expense(&CreateExpenseRequest {
            description: "Parkir".to_string(),
            amount: Money::from_major(5),
            account_name: None,
        })
        .await
        .unwrap();

    assert_eq!(db.capital().total().await.unwrap(), Money::from_major(-5));
}

#[tokio::test]
async fn test_capital_adjustments() {
    let Some((db, ledger)) = test_db().await else { return };

    ledger
        .adjust_capital(CapitalAdjustment {
            amount: Money::from_major(100),
            kind: CapitalType::Add,
        })
        .await
        .unwrap();
    let reserve = ledger
        .adjust_capital(CapitalAdjustment {
            amount: Money::from_major(30),
            kind: CapitalType::Subtract,
        })
        .await
        .unwrap();

    assert_eq!(reserve.balance, Money::from_major(70));
    assert_eq!(db.capital().total().await.unwrap(), Money::from_major(70));

    let err = ledger
        .adjust_capital(CapitalAdjustment {
            amount: Money::from_major(100),
            kind: CapitalType::Subtract,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Rule(CoreError::InsufficientFunds { .. })));
}

#[tokio::test]
async fn test_deduct_has_no_capital_row() {
    let Some((db, ledger)) = test_db().await else { return };
    account(&db, "Kas", 40).await;

    let updated = ledger
        .deduct(&DeductRequest {
            account_name: "kas".to_string(),
            amount: Money::from_major(15),
        })
        .await
        .unwrap();

    assert_eq!(updated.balance, Money::from_major(25));
    assert!(db.capital().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_purchase_and_reversal() {
    let Some((db, ledger)) = test_db().await else { return };
    let kopi = product(&db, "Kopi", 2, 5, 8).await;
    let kas = account(&db, "Kas", 100).await;

    let purchase = ledger
        .record_purchase(&CreatePurchaseRequest {
            product_id: kopi.id,
            account_id: kas.id,
            quantity: 10,
            purchase_price: Money::from_major(6),
        })
        .await
        .unwrap();

    assert_eq!(purchase.total, Money::from_major(60));
    assert_eq!(purchase.product_name, "Kopi");
    assert_eq!(stock_of(&db, kopi.id).await, 12);
    assert_eq!(balance_of(&db, kas.id).await, Money::from_major(40));
    let updated = db.products().get_by_id(kopi.id).await.unwrap().unwrap();
    assert_eq!(updated.cost_price, Money::from_major(6));
    assert!(db.capital().list().await.unwrap().is_empty());

    ledger.delete_purchase(purchase.id).await.unwrap();
    assert_eq!(stock_of(&db, kopi.id).await, 2);
    assert_eq!(balance_of(&db, kas.id).await, Money::from_major(100));
}

#[tokio::test]
async fn test_purchase_insufficient_funds() {
    let Some((db, ledger)) = test_db().await else { return };
    let kopi = product(&db, "Kopi", 2, 5, 8).await;
    let kas = account(&db, "Kas", 10).await;

    let err = ledger
        .record_purchase(&CreatePurchaseRequest {
            product_id: kopi.id,
            account_id: kas.id,
            quantity: 10,
            purchase_price: Money::from_major(6),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::Rule(CoreError::InsufficientFunds { .. })));
    assert_eq!(stock_of(&db, kopi.id).await, 2);
    assert!(db.purchases().list().await.unwrap().is_empty());
}

// =============================================================================
// Delete Guards
// =============================================================================

#[tokio::test]
async fn test_referenced_rows_cannot_be_deleted() {
    let Some((db, ledger)) = test_db().await else { return };
    let kopi = product(&db, "Kopi", 10, 5, 8).await;
    let kas = account(&db, "Kas", 100).await;
    ledger
        .record_transaction(sale("Kopi", 1, 5, 8, "Kas"), None)
        .await
        .unwrap();

    let err = db.products().delete(kopi.id).await.unwrap_err();
    assert!(matches!(err, DbError::Rule(CoreError::Conflict(_))));

    let err = db.accounts().delete(kas.id, RESERVE).await.unwrap_err();
    assert!(matches!(err, DbError::Rule(CoreError::Conflict(_))));

    let reserve = db.accounts().get_by_name(RESERVE).await.unwrap().unwrap();
    let err = db.accounts().delete(reserve.id, RESERVE).await.unwrap_err();
    assert!(matches!(err, DbError::Rule(CoreError::Conflict(_))));
}

#[tokio::test]
async fn test_duplicate_names_are_rejected_case_insensitively() {
    let Some((db, _ledger)) = test_db().await else { return };
    product(&db, "Kopi", 10, 5, 8).await;
    account(&db, "Kas", 0).await;

    let err = db
        .products()
        .create(&CreateProductRequest {
            name: "KOPI".to_string(),
            stock: 1,
            price: Money::from_major(1),
            cost_price: Money::zero(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Rule(CoreError::Validation(_))));

    let err = db
        .accounts()
        .create(&CreateAccountRequest {
            name: "kas".to_string(),
            balance: Money::zero(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Rule(CoreError::Validation(_))));
}

#[tokio::test]
async fn test_reserve_account_cannot_be_renamed() {
    let Some((db, _ledger)) = test_db().await else { return };
    let reserve = db.accounts().get_by_name(RESERVE).await.unwrap().unwrap();
    let kas = account(&db, "Kas", 0).await;

    let err = db
        .accounts()
        .update(
            reserve.id,
            &UpdateAccountRequest {
                name: Some("Modal".to_string()),
                balance: None,
            },
            RESERVE,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Rule(CoreError::Conflict(_))));

    // Case-only renames and balance corrections keep the reserve findable.
    let updated = db
        .accounts()
        .update(
            reserve.id,
            &UpdateAccountRequest {
                name: Some(RESERVE.to_uppercase()),
                balance: Some(Money::from_major(10)),
            },
            RESERVE,
        )
        .await
        .unwrap();
    assert_eq!(updated.balance, Money::from_major(10));
    assert!(db.accounts().get_by_name(RESERVE).await.unwrap().is_some());

    let renamed = db
        .accounts()
        .update(
            kas.id,
            &UpdateAccountRequest {
                name: Some("Laci".to_string()),
                balance: None,
            },
            RESERVE,
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Laci");
}

// =============================================================================
// Store Range
// =============================================================================

fn is_out_of_range(err: &DbError) -> bool {
    matches!(
        err,
        DbError::Rule(CoreError::Validation(ValidationError::OutOfRange { .. }))
    )
}

#[tokio::test]
async fn test_line_total_past_store_range_changes_nothing() {
    let Some((db, ledger)) = test_db().await else { return };
    let kopi = product(&db, "Kopi", 10, 5, 8).await;
    let kas = account(&db, "Kas", 100).await;

    let command = TransactionCommand::Sale(SaleCommand {
        lines: vec![SaleLine {
            product_name: "Kopi".to_string(),
            amounts: SaleAmounts {
                quantity: 2,
                cost_price: Money::zero(),
                selling_price: "999999999999.99".parse().unwrap(),
            },
        }],
        account_name: "Kas".to_string(),
        payment_method: PaymentMethod::Cash,
        description: None,
    });

    let err = ledger.record_transaction(command, None).await.unwrap_err();
    assert!(is_out_of_range(&err));
    assert_eq!(stock_of(&db, kopi.id).await, 10);
    assert_eq!(balance_of(&db, kas.id).await, Money::from_major(100));
    assert_eq!(db.capital().total().await.unwrap(), Money::zero());
}

#[tokio::test]
async fn test_balance_past_store_range_changes_nothing() {
    let Some((db, ledger)) = test_db().await else { return };
    let reserve = db.accounts().get_by_name(RESERVE).await.unwrap().unwrap();
    let full = Money::from_major(999_999_999_999);
    db.accounts()
        .update(
            reserve.id,
            &UpdateAccountRequest {
                name: None,
                balance: Some(full),
            },
            RESERVE,
        )
        .await
        .unwrap();

    let err = ledger
        .adjust_capital(CapitalAdjustment {
            amount: Money::from_major(1),
            kind: CapitalType::Add,
        })
        .await
        .unwrap_err();

    assert!(is_out_of_range(&err));
    assert_eq!(balance_of(&db, reserve.id).await, full);
    assert!(db.capital().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stock_overflow_changes_nothing() {
    let Some((db, ledger)) = test_db().await else { return };
    let kopi = product(&db, "Kopi", 0, 5, 8).await;
    let kas = account(&db, "Kas", 100).await;
    db.products().set_stock(kopi.id, i64::MAX).await.unwrap();

    let err = ledger
        .record_purchase(&CreatePurchaseRequest {
            product_id: kopi.id,
            account_id: kas.id,
            quantity: 1,
            purchase_price: Money::from_major(1),
        })
        .await
        .unwrap_err();

    assert!(is_out_of_range(&err));
    assert_eq!(stock_of(&db, kopi.id).await, i64::MAX);
    assert_eq!(balance_of(&db, kas.id).await, Money::from_major(100));
}

#[tokio::test]
async fn test_numeric_overflow_from_store_is_a_validation_error() {
    let Some((db, _ledger)) = test_db().await else { return };

    let err = sqlx::query("SELECT CAST(10000000000000 AS NUMERIC(14, 2))")
        .execute(db.pool())
        .await
        .unwrap_err();

    let err = DbError::from(err);
    assert!(is_out_of_range(&err));
    assert!(err.rule().is_some());
}

#[tokio::test]
async fn test_capital_total_past_column_width_still_sums() {
    let Some((db, ledger)) = test_db().await else { return };
    let amount = Money::from_major(900_000_000_000);

    let reserve = db.accounts().get_by_name(RESERVE).await.unwrap().unwrap();
    for _ in 0..2 {
        ledger
            .adjust_capital(CapitalAdjustment {
                amount,
                kind: CapitalType::Add,
            })
            .await
            .unwrap();
        ledger
            .deduct(&DeductRequest {
                account_name: reserve.name.clone(),
                amount,
            })
            .await
            .unwrap();
    }

    assert_eq!(
        db.capital().total().await.unwrap(),
        Money::from_major(1_800_000_000_000)
    );
}
