//! Stock purchases.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use warung_core::access::Operation;
use warung_core::requests::CreatePurchaseRequest;
use warung_core::Purchase;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::extract::{ApiJson, Id};
use crate::state::AppState;

pub async fn create_purchase(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<CreatePurchaseRequest>,
) -> ApiResult<(StatusCode, Json<Purchase>)> {
    user.authorize(Operation::CreatePurchase)?;

    let purchase = state.ledger.record_purchase(&request.validate()?).await?;
    Ok((StatusCode::CREATED, Json(purchase)))
}

pub async fn list_purchases(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<Purchase>>> {
    user.authorize(Operation::ListPurchases)?;

    Ok(Json(state.db.purchases().list().await?))
}

pub async fn delete_purchase(
    State(state): State<AppState>,
    user: CurrentUser,
    Id(id): Id,
) -> ApiResult<Json<Purchase>> {
    user.authorize(Operation::DeletePurchase)?;

    Ok(Json(state.ledger.delete_purchase(id).await?))
}
