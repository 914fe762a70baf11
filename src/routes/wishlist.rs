//! Per-user wishlist.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::{Product, ProductKey, User};
use crate::routes::ListResponse;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ListResponse<Product>>, ApiError> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT p.* FROM wishlist_items wi JOIN products p ON p.id = wi.product_id \
         WHERE wi.user_id = $1 ORDER BY wi.added_at DESC",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(ListResponse::new(products)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToWishlistRequest {
    pub product_id: ProductKey,
}

pub async fn add(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<AddToWishlistRequest>,
) -> Result<Json<ListResponse<Product>>, ApiError> {
    let mut conn = state.db.acquire().await?;
    User::require(&mut conn, user.id).await?;
    let product = Product::resolve(&mut conn, &req.product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    sqlx::query(
        "INSERT INTO wishlist_items (user_id, product_id, added_at) VALUES ($1, $2, NOW()) \
         ON CONFLICT (user_id, product_id) DO NOTHING",
    )
    .bind(user.id)
    .bind(product.id)
    .execute(&mut *conn)
    .await?;
    drop(conn);

    list(State(state), user).await
}

pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path(key): Path<String>,
) -> Result<Json<ListResponse<Product>>, ApiError> {
    let mut conn = state.db.acquire().await?;
    if let Some(product) = Product::resolve(&mut conn, &ProductKey::from(key)).await? {
        sqlx::query("DELETE FROM wishlist_items WHERE user_id = $1 AND product_id = $2")
            .bind(user.id)
            .bind(product.id)
            .execute(&mut *conn)
            .await?;
    }
    drop(conn);

    list(State(state), user).await
}
