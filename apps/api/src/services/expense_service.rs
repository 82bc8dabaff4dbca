//! Operating expenses.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use warung_core::access::Operation;
use warung_core::requests::{CreateExpenseRequest, UpdateExpenseRequest};
use warung_core::Expense;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery, Id};
use crate::services::transaction_service::DateRangeQuery;
use crate::state::AppState;

pub async fn create_expense(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<CreateExpenseRequest>,
) -> ApiResult<(StatusCode, Json<Expense>)> {
    user.authorize(Operation::CreateExpense)?;

    let expense = state.ledger.record_expense(&request.validate()?).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn list_expenses(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<DateRangeQuery>,
) -> ApiResult<Json<Vec<Expense>>> {
    user.authorize(Operation::ListExpenses)?;

    Ok(Json(state.db.expenses().list(query.range()?).await?))
}

pub async fn update_expense(
    State(state): State<AppState>,
    user: CurrentUser,
    Id(id): Id,
    ApiJson(request): ApiJson<UpdateExpenseRequest>,
) -> ApiResult<Json<Expense>> {
    user.authorize(Operation::UpdateExpense)?;

    let expense = state.ledger.update_expense(id, &request.validate()?).await?;
    Ok(Json(expense))
}

pub async fn delete_expense(
    State(state): State<AppState>,
    user: CurrentUser,
    Id(id): Id,
) -> ApiResult<Json<Expense>> {
    user.authorize(Operation::DeleteExpense)?;

    Ok(Json(state.ledger.delete_expense(id).await?))
}
