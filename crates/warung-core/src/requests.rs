//! # Request Types
//!
//! Input shapes for every ledger and catalogue operation, as received from
//! clients, and their validated forms.
//!
//! ```text
//! JSON body ──serde──► *Request ──validate()──► command / normalized request
//!                                      │
//!                                      └── ValidationError / InvalidArgument
//!                                          (400, before any row is locked)
//! ```
//!
//! Enumerated values (`type`, `paymentMethod`) arrive as plain strings and
//! are parsed here so an unknown value is reported as `InvalidArgument`
//! instead of a generic body-parsing failure.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::ledger::SaleAmounts;
use crate::money::Money;
use crate::types::{CapitalType, PaymentMethod, TransactionKind};
use crate::validation::{
    validate_description, validate_line_count, validate_name, validate_positive_amount,
    validate_price, validate_quantity, validate_stock,
};

fn required<T>(field: &str, value: Option<T>) -> CoreResult<T> {
    value.ok_or_else(|| {
        ValidationError::Required {
            field: field.to_string(),
        }
        .into()
    })
}

// =============================================================================
// Transactions
// =============================================================================

/// One line of a sale as sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleLineInput {
    pub product_name: String,
    pub quantity: i64,
    pub cost_price: Money,
    pub selling_price: Money,
}

/// Body of `POST /transactions`.
///
/// A sale is either a single line (`productName`, `quantity`, ...) or an
/// `items` array; a withdrawal uses `amount`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateTransactionRequest {
    /// `"sale"` (default) or `"withdrawal"`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub product_name: Option<String>,
    pub quantity: Option<i64>,
    pub cost_price: Option<Money>,
    pub selling_price: Option<Money>,
    #[serde(default)]
    pub items: Vec<SaleLineInput>,
    pub account_name: Option<String>,
    pub payment_method: Option<String>,
    pub amount: Option<Money>,
    pub description: Option<String>,
}

/// A validated sale line.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleLine {
    pub product_name: String,
    pub amounts: SaleAmounts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaleCommand {
    pub lines: Vec<SaleLine>,
    pub account_name: String,
    pub payment_method: PaymentMethod,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawalCommand {
    pub account_name: String,
    pub amount: Money,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionCommand {
    Sale(SaleCommand),
    Withdrawal(WithdrawalCommand),
}

fn validate_line(input: SaleLineInput) -> CoreResult<SaleLine> {
    validate_quantity(input.quantity)?;
    validate_price("costPrice", input.cost_price)?;
    validate_price("sellingPrice", input.selling_price)?;
    let amounts = SaleAmounts {
        quantity: input.quantity,
        cost_price: input.cost_price,
        selling_price: input.selling_price,
    };
    amounts.total()?;
    amounts.total_cost()?;
    Ok(SaleLine {
        product_name: validate_name("productName", &input.product_name)?,
        amounts,
    })
}

impl CreateTransactionRequest {
    pub fn validate(self) -> CoreResult<TransactionCommand> {
        let kind = match self.kind.as_deref() {
            None => TransactionKind::Sale,
            Some(raw) => raw.parse()?,
        };
        let account_name = validate_name("accountName", &required("accountName", self.account_name)?)?;
        let description = validate_description(self.description.as_deref())?;

        match kind {
            TransactionKind::Withdrawal => {
                let amount = required("amount", self.amount)?;
                validate_positive_amount("amount", amount)?;
                Ok(TransactionCommand::Withdrawal(WithdrawalCommand {
                    account_name,
                    amount,
                    description,
                }))
            }
            TransactionKind::Sale => {
                let payment_method = match self.payment_method.as_deref() {
                    None => PaymentMethod::default(),
                    Some(raw) => raw.parse()?,
                };

                let inputs = if self.items.is_empty() {
                    vec![SaleLineInput {
                        product_name: required("productName", self.product_name)?,
                        quantity: required("quantity", self.quantity)?,
                        cost_price: required("costPrice", self.cost_price)?,
                        selling_price: required("sellingPrice", self.selling_price)?,
                    }]
                } else {
                    self.items
                };
                validate_line_count(inputs.len())?;

                let lines = inputs
                    .into_iter()
                    .map(validate_line)
                    .collect::<CoreResult<Vec<_>>>()?;

                Ok(TransactionCommand::Sale(SaleCommand {
                    lines,
                    account_name,
                    payment_method,
                    description,
                }))
            }
        }
    }
}

/// Body of `PUT /transactions/:id`. Missing fields keep their stored value.
///
/// Sales take `quantity`, `costPrice`, `sellingPrice`; withdrawals take
/// `amount`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateTransactionRequest {
    pub quantity: Option<i64>,
    pub cost_price: Option<Money>,
    pub selling_price: Option<Money>,
    pub amount: Option<Money>,
    pub description: Option<String>,
}

impl UpdateTransactionRequest {
    pub fn validate(mut self) -> CoreResult<Self> {
        if let Some(quantity) = self.quantity {
            validate_quantity(quantity)?;
        }
        if let Some(cost) = self.cost_price {
            validate_price("costPrice", cost)?;
        }
        if let Some(selling) = self.selling_price {
            validate_price("sellingPrice", selling)?;
        }
        if let Some(amount) = self.amount {
            validate_positive_amount("amount", amount)?;
        }
        if self.description.is_some() {
            // An explicit blank clears the description.
            self.description = Some(validate_description(self.description.as_deref())?.unwrap_or_default());
        }
        Ok(self)
    }
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub stock: i64,
    pub price: Money,
    #[serde(default)]
    pub cost_price: Money,
}

impl CreateProductRequest {
    pub fn validate(self) -> CoreResult<Self> {
        validate_stock(self.stock)?;
        validate_price("price", self.price)?;
        validate_price("costPrice", self.cost_price)?;
        Ok(CreateProductRequest {
            name: validate_name("name", &self.name)?,
            ..self
        })
    }
}

/// Body of `PUT /products/:id`: a direct stock count correction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateStockRequest {
    pub stock: i64,
}

impl UpdateStockRequest {
    pub fn validate(self) -> CoreResult<Self> {
        validate_stock(self.stock)?;
        Ok(self)
    }
}

// =============================================================================
// Accounts
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateAccountRequest {
    pub name: String,
    #[serde(default)]
    pub balance: Money,
}

impl CreateAccountRequest {
    pub fn validate(self) -> CoreResult<Self> {
        crate::validation::validate_money_scale("balance", self.balance)?;
        Ok(CreateAccountRequest {
            name: validate_name("name", &self.name)?,
            balance: self.balance,
        })
    }
}

/// Body of `PUT /accounts/:id`. Sets values directly; no capital row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    pub balance: Option<Money>,
}

impl UpdateAccountRequest {
    pub fn validate(self) -> CoreResult<Self> {
        if let Some(balance) = self.balance {
            crate::validation::validate_money_scale("balance", balance)?;
        }
        let name = self
            .name
            .as_deref()
            .map(|name| validate_name("name", name))
            .transpose()?;
        Ok(UpdateAccountRequest {
            name,
            balance: self.balance,
        })
    }
}

/// Body of `PUT /accounts/deduct`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DeductRequest {
    pub account_name: String,
    pub amount: Money,
}

impl DeductRequest {
    pub fn validate(self) -> CoreResult<Self> {
        validate_positive_amount("amount", self.amount)?;
        Ok(DeductRequest {
            account_name: validate_name("accountName", &self.account_name)?,
            amount: self.amount,
        })
    }
}

// =============================================================================
// Expenses
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateExpenseRequest {
    pub description: String,
    pub amount: Money,
    pub account_name: Option<String>,
}

impl CreateExpenseRequest {
    pub fn validate(self) -> CoreResult<Self> {
        validate_positive_amount("amount", self.amount)?;
        let description = validate_description(Some(&self.description))?.ok_or_else(|| {
            CoreError::from(ValidationError::Required {
                field: "description".to_string(),
            })
        })?;
        let account_name = match self.account_name.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(name) => Some(validate_name("accountName", name)?),
        };
        Ok(CreateExpenseRequest {
            description,
            amount: self.amount,
            account_name,
        })
    }
}

/// Body of `PUT /expenses/:id`. Missing fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateExpenseRequest {
    pub description: Option<String>,
    pub amount: Option<Money>,
}

impl UpdateExpenseRequest {
    pub fn validate(self) -> CoreResult<Self> {
        if let Some(amount) = self.amount {
            validate_positive_amount("amount", amount)?;
        }
        let description = match self.description.as_deref() {
            None => None,
            Some(text) => Some(validate_description(Some(text))?.ok_or_else(|| {
                CoreError::from(ValidationError::Required {
                    field: "description".to_string(),
                })
            })?),
        };
        Ok(UpdateExpenseRequest {
            description,
            amount: self.amount,
        })
    }
}

// =============================================================================
// Capital
// =============================================================================

/// Body of `POST /capital`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CapitalAdjustmentRequest {
    pub amount: Money,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapitalAdjustment {
    pub amount: Money,
    pub kind: CapitalType,
}

impl CapitalAdjustmentRequest {
    pub fn validate(self) -> CoreResult<CapitalAdjustment> {
        let kind: CapitalType = self.kind.parse()?;
        validate_positive_amount("amount", self.amount)?;
        Ok(CapitalAdjustment {
            amount: self.amount,
            kind,
        })
    }
}

// =============================================================================
// Purchases
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreatePurchaseRequest {
    pub product_id: i64,
    pub account_id: i64,
    pub quantity: i64,
    pub purchase_price: Money,
}

impl CreatePurchaseRequest {
    pub fn validate(self) -> CoreResult<Self> {
        validate_quantity(self.quantity)?;
        validate_positive_amount("purchasePrice", self.purchase_price)?;
        self.purchase_price.multiply_quantity(self.quantity)?;
        Ok(self)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sale_body() -> CreateTransactionRequest {
        serde_json::from_str(
            r#"{
                "productName": " Kopi ",
                "quantity": 3,
                "costPrice": "5",
                "sellingPrice": 8,
                "accountName": "Kas"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_single_line_sale_defaults_to_cash() {
        let TransactionCommand::Sale(sale) = sale_body().validate().unwrap() else {
            panic!("expected a sale");
        };
        assert_eq!(sale.payment_method, PaymentMethod::Cash);
        assert_eq!(sale.lines.len(), 1);
        assert_eq!(sale.lines[0].product_name, "Kopi");
        assert_eq!(sale.lines[0].amounts.total().unwrap(), Money::from_major(24));
    }

    #[test]
    fn test_items_array_sale() {
        let body: CreateTransactionRequest = serde_json::from_str(
            r#"{
                "accountName": "Bank",
                "paymentMethod": "transfer",
                "items": [
                    {"productName": "Kopi", "quantity": 1, "costPrice": 5, "sellingPrice": 8},
                    {"productName": "Teh", "quantity": 2, "costPrice": 2, "sellingPrice": 4}
                ]
            }"#,
        )
        .unwrap();

        let TransactionCommand::Sale(sale) = body.validate().unwrap() else {
            panic!("expected a sale");
        };
        assert_eq!(sale.payment_method, PaymentMethod::Transfer);
        assert_eq!(sale.lines.len(), 2);
    }

    #[test]
    fn test_sale_prices_past_store_range_are_rejected() {
        let body = CreateTransactionRequest {
            quantity: Some(2),
            selling_price: Some("79228162514264337593543950335".parse().unwrap()),
            ..sale_body()
        };
        assert!(matches!(
            body.validate(),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));

        // Each price fits the store; the line total does not.
        let body = CreateTransactionRequest {
            quantity: Some(2),
            selling_price: Some("999999999999.99".parse().unwrap()),
            ..sale_body()
        };
        assert!(matches!(
            body.validate(),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn test_purchase_total_past_store_range_is_rejected() {
        let request = CreatePurchaseRequest {
            product_id: 1,
            account_id: 1,
            quantity: 2,
            purchase_price: "600000000000".parse().unwrap(),
        };
        assert!(matches!(
            request.validate(),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn test_unknown_payment_method_is_invalid_argument() {
        let body = CreateTransactionRequest {
            payment_method: Some("Kredit".to_string()),
            ..sale_body()
        };
        assert!(matches!(
            body.validate(),
            Err(CoreError::InvalidArgument { field: "paymentMethod", .. })
        ));
    }

    #[test]
    fn test_sale_missing_quantity_is_required() {
        let body = CreateTransactionRequest {
            quantity: None,
            ..sale_body()
        };
        assert!(matches!(
            body.validate(),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));
    }

    #[test]
    fn test_withdrawal_command() {
        let body: CreateTransactionRequest = serde_json::from_str(
            r#"{"type": "withdrawal", "accountName": "Kas", "amount": "12.50"}"#,
        )
        .unwrap();
        let command = body.validate().unwrap();
        assert_eq!(
            command,
            TransactionCommand::Withdrawal(WithdrawalCommand {
                account_name: "Kas".to_string(),
                amount: Money::from_minor(1250),
                description: None,
            })
        );
    }

    #[test]
    fn test_capital_adjustment_rejects_unknown_type() {
        let request = CapitalAdjustmentRequest {
            amount: Money::from_major(10),
            kind: "multiply".to_string(),
        };
        assert!(matches!(
            request.validate(),
            Err(CoreError::InvalidArgument { field: "type", .. })
        ));
    }

    #[test]
    fn test_expense_blank_account_is_none() {
        let request = CreateExpenseRequest {
            description: "Listrik".to_string(),
            amount: Money::from_major(50),
            account_name: Some("  ".to_string()),
        }
        .validate()
        .unwrap();
        assert_eq!(request.account_name, None);
    }

    #[test]
    fn test_purchase_requires_positive_price() {
        let request = CreatePurchaseRequest {
            product_id: 1,
            account_id: 1,
            quantity: 2,
            purchase_price: Money::zero(),
        };
        assert!(request.validate().is_err());
    }
}
