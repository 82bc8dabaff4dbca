//! Product catalogue.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use warung_core::access::Operation;
use warung_core::requests::{CreateProductRequest, UpdateStockRequest};
use warung_core::validation::validate_search_query;
use warung_core::Product;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery, Id};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

pub async fn create_product(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    user.authorize(Operation::CreateProduct)?;

    let product = state.db.products().create(&request.validate()?).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `GET /products?search=kopi`: case-insensitive substring match.
pub async fn list_products(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Json<Vec<Product>>> {
    user.authorize(Operation::ListProducts)?;

    let search = query
        .search
        .as_deref()
        .map(validate_search_query)
        .transpose()?;
    let products = state.db.products().list(search.as_deref()).await?;
    Ok(Json(products))
}

/// Sets the stock count directly (stock-take correction).
pub async fn update_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Id(id): Id,
    ApiJson(request): ApiJson<UpdateStockRequest>,
) -> ApiResult<Json<Product>> {
    user.authorize(Operation::UpdateProduct)?;

    let request = request.validate()?;
    let product = state.db.products().set_stock(id, request.stock).await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Id(id): Id,
) -> ApiResult<Json<Product>> {
    user.authorize(Operation::DeleteProduct)?;

    let product = state.db.products().delete(id).await?;
    Ok(Json(product))
}
