//! Capital adjustments and the capital ledger.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use warung_core::access::Operation;
use warung_core::requests::CapitalAdjustmentRequest;
use warung_core::{Account, CapitalHistory, Money};

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalCapitalResponse {
    pub total_capital: Money,
}

/// `POST /capital {amount, type}`: moves money in or out of the reserve
/// account. Returns the reserve account afterwards.
pub async fn adjust_capital(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<CapitalAdjustmentRequest>,
) -> ApiResult<(StatusCode, Json<Account>)> {
    user.authorize(Operation::AdjustCapital)?;

    let reserve = state.ledger.adjust_capital(request.validate()?).await?;
    Ok((StatusCode::CREATED, Json(reserve)))
}

pub async fn list_capital(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<CapitalHistory>>> {
    user.authorize(Operation::ListCapital)?;

    Ok(Json(state.db.capital().list().await?))
}

/// Sum of `add` rows minus `subtract` rows.
pub async fn total_capital(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<TotalCapitalResponse>> {
    user.authorize(Operation::TotalCapital)?;

    let total_capital = state.db.capital().total().await?;
    Ok(Json(TotalCapitalResponse { total_capital }))
}
