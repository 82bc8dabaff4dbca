//! Sales and withdrawals.
//!
//! ```text
//! POST   /transactions       staff   sale (single line or items[]) or withdrawal
//! GET    /transactions       staff   ?startDate=YYYY-MM-DD&endDate=YYYY-MM-DD
//! PUT    /transactions/{id}  admin   correction (undo old effect, apply new)
//! DELETE /transactions/{id}  admin   reversal
//! ```

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use warung_core::access::Operation;
use warung_core::requests::{CreateTransactionRequest, UpdateTransactionRequest};
use warung_core::validation::validate_date_range;
use warung_core::{DateRange, Transaction};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::{idempotency_key, ApiJson, ApiQuery, Id};
use crate::state::AppState;

/// `?startDate&endDate` filter shared by the history listings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl DateRangeQuery {
    pub fn range(self) -> ApiResult<DateRange> {
        Ok(validate_date_range(self.start_date, self.end_date)?)
    }
}

/// Returns every row written (one per sale line). A replayed idempotency
/// key answers 200 with the rows from the first request.
pub async fn create_transaction(
    State(state): State<AppState>,
    user: CurrentUser,
    headers: HeaderMap,
    ApiJson(request): ApiJson<CreateTransactionRequest>,
) -> ApiResult<(StatusCode, Json<Vec<Transaction>>)> {
    user.authorize(Operation::CreateTransaction)?;

    let key = idempotency_key(&headers)?;
    let command = request.validate()?;

    let recorded = state
        .ledger
        .record_transaction(command, key.as_deref())
        .await?;

    let status = if recorded.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(recorded.transactions)))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<DateRangeQuery>,
) -> ApiResult<Json<Vec<Transaction>>> {
    user.authorize(Operation::ListTransactions)?;

    let transactions = state.db.transactions().list(query.range()?).await?;
    Ok(Json(transactions))
}

pub async fn update_transaction(
    State(state): State<AppState>,
    user: CurrentUser,
    Id(id): Id,
    ApiJson(request): ApiJson<UpdateTransactionRequest>,
) -> ApiResult<Json<Transaction>> {
    user.authorize(Operation::UpdateTransaction)?;

    let changes = request.validate()?;
    let updated = state.ledger.update_transaction(id, changes).await?;
    Ok(Json(updated))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    user: CurrentUser,
    Id(id): Id,
) -> ApiResult<Json<Transaction>> {
    user.authorize(Operation::DeleteTransaction)?;

    let deleted = state.ledger.delete_transaction(id).await?;
    Ok(Json(deleted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range_query() {
        let query = DateRangeQuery {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31),
        };
        let range = query.range().unwrap();
        assert!(range.contains(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()));

        let reversed = DateRangeQuery {
            start_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 1),
        };
        let err: ApiError = reversed.range().unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        assert_eq!(DateRangeQuery::default().range().unwrap(), DateRange::default());
    }
}
