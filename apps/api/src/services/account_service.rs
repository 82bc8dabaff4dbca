//! Money accounts (cash drawer, bank, the reserve account).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use warung_core::access::Operation;
use warung_core::requests::{CreateAccountRequest, DeductRequest, UpdateAccountRequest};
use warung_core::Account;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::extract::{ApiJson, Id};
use crate::state::AppState;

pub async fn create_account(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<CreateAccountRequest>,
) -> ApiResult<(StatusCode, Json<Account>)> {
    user.authorize(Operation::CreateAccount)?;

    let account = state.db.accounts().create(&request.validate()?).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn list_accounts(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<Account>>> {
    user.authorize(Operation::ListAccounts)?;

    Ok(Json(state.db.accounts().list().await?))
}

/// Renames and/or sets the balance directly. Renaming the reserve account
/// is a conflict.
pub async fn update_account(
    State(state): State<AppState>,
    user: CurrentUser,
    Id(id): Id,
    ApiJson(request): ApiJson<UpdateAccountRequest>,
) -> ApiResult<Json<Account>> {
    user.authorize(Operation::UpdateAccount)?;

    let account = state
        .db
        .accounts()
        .update(id, &request.validate()?, state.ledger.reserve_account_name())
        .await?;
    Ok(Json(account))
}

/// `PUT /accounts/deduct`: guarded debit by account name.
pub async fn deduct_account(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<DeductRequest>,
) -> ApiResult<Json<Account>> {
    user.authorize(Operation::DeductAccount)?;

    let account = state.ledger.deduct(&request.validate()?).await?;
    Ok(Json(account))
}

pub async fn delete_account(
    State(state): State<AppState>,
    user: CurrentUser,
    Id(id): Id,
) -> ApiResult<Json<Account>> {
    user.authorize(Operation::DeleteAccount)?;

    let account = state
        .db
        .accounts()
        .delete(id, state.ledger.reserve_account_name())
        .await?;
    Ok(Json(account))
}
