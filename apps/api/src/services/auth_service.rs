//! Registration and login.
//!
//! `POST /register` is open while the user table is empty so the owner can
//! create the first (admin) account; after that it requires an admin token.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use warung_core::access::{Operation, Role};
use warung_core::validation::{validate_password, validate_username};
use warung_core::User;

use crate::auth::{hash_password, verify_password, CurrentUser};
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    /// Defaults to `kasir`. Ignored for the first user, who is always admin.
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    pub expires_in: i64,
}

pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let username = validate_username(&request.username)?;
    validate_password(&request.password)?;
    let role = match request.role.as_deref() {
        Some(raw) => raw.parse()?,
        None => Role::Kasir,
    };

    let users = state.db.users();

    // Bootstrap: the first account is created without a token.
    if users.count().await? == 0 {
        let hash = hash_password(&request.password).await?;
        if let Some(user) = users.create_first(&username, &hash, Role::Admin).await? {
            info!(username = %user.username, "Bootstrap admin registered");
            return Ok((StatusCode::CREATED, Json(user)));
        }
    }

    let caller = CurrentUser::from_headers(&headers, &state.jwt)?;
    caller.authorize(Operation::RegisterUser)?;

    let hash = hash_password(&request.password).await?;
    let user = users.create(&username, &hash, role).await?;

    info!(by = %caller.username, username = %user.username, role = %user.role, "User registered");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let invalid = || ApiError::unauthorized("Invalid username or password");

    let Some(user) = state.db.users().find_by_username(&request.username).await? else {
        warn!(username = %request.username, "Login failed: unknown user");
        return Err(invalid());
    };

    if !verify_password(&request.password, &user.password_hash).await? {
        warn!(username = %user.username, "Login failed: wrong password");
        return Err(invalid());
    }

    let token = state.jwt.generate_token(&user)?;
    info!(username = %user.username, role = %user.role, "Login");

    Ok(Json(LoginResponse {
        token,
        role: user.role,
        expires_in: state.jwt.lifetime_secs(),
    }))
}
