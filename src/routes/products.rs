//! Public catalog reads.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::error::ApiError;
use crate::models::{Product, ProductKey};
use crate::routes::{ApiResponse, PaginatedResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<String>,
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedResponse<Product>>, ApiError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(20).min(100);

    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products \
         WHERE is_public = TRUE AND ($1::text IS NULL OR category ILIKE $1) \
         ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(&params.category)
    .bind(i64::from(limit))
    .bind(crate::routes::page_offset(page, limit))
    .fetch_all(&state.db)
    .await?;

    let (total,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM products WHERE is_public = TRUE AND ($1::text IS NULL OR category ILIKE $1)",
    )
    .bind(&params.category)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(PaginatedResponse::new(products, total, page, limit)))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let key = ProductKey::from(key);
    let mut conn = state.db.acquire().await?;
    let product = Product::resolve(&mut conn, &key)
        .await?
        .filter(|p| p.is_public)
        .ok_or_else(|| ApiError::NotFound(format!("Product {key} not found")))?;
    Ok(Json(ApiResponse::new(product)))
}
