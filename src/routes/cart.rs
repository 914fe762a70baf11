//! Per-user cart. Carts are independent resources per user; the subtotal is
//! recomputed from the items on every read, never stored.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::{Product, ProductKey, User};
use crate::routes::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub brand: String,
    pub image_url: Option<String>,
    pub quantity: i32,
    pub price: i64,
    pub subtotal: i64,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub subtotal: i64,
}

async fn load_cart(conn: &mut PgConnection, user_id: Uuid) -> Result<CartView, ApiError> {
    let items = sqlx::query_as::<_, CartLine>(
        "SELECT ci.product_id, p.name, p.brand, p.image_url, ci.quantity, ci.price, \
                ci.quantity::bigint * ci.price AS subtotal, ci.added_at \
         FROM cart_items ci JOIN products p ON p.id = ci.product_id \
         WHERE ci.user_id = $1 ORDER BY ci.added_at",
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    let subtotal = items.iter().map(|i| i.subtotal).sum();
    Ok(CartView { items, subtotal })
}

pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<CartView>>, ApiError> {
    let mut conn = state.db.acquire().await?;
    let cart = load_cart(&mut conn, user.id).await?;
    Ok(Json(ApiResponse::new(cart)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductKey,
    pub quantity: Option<i32>,
}

pub async fn add_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<AddToCartRequest>,
) -> Result<Json<ApiResponse<CartView>>, ApiError> {
    let quantity = req.quantity.unwrap_or(1);
    if quantity < 1 {
        return Err(ApiError::validation("Quantity must be at least 1"));
    }

    let mut conn = state.db.acquire().await?;
    User::require(&mut conn, user.id).await?;
    let product = Product::resolve(&mut conn, &req.product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    // Re-adding merges quantities and refreshes the captured price.
    sqlx::query(
        "INSERT INTO cart_items (user_id, product_id, quantity, price, added_at) \
         VALUES ($1, $2, $3, $4, NOW()) \
         ON CONFLICT (user_id, product_id) \
         DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity, price = EXCLUDED.price",
    )
    .bind(user.id)
    .bind(product.id)
    .bind(quantity)
    .bind(product.price)
    .execute(&mut *conn)
    .await?;

    let cart = load_cart(&mut conn, user.id).await?;
    Ok(Json(ApiResponse::new(cart)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

pub async fn update_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(key): Path<String>,
    Json(req): Json<UpdateCartItemRequest>,
) -> Result<Json<ApiResponse<CartView>>, ApiError> {
    if req.quantity < 1 {
        return Err(ApiError::validation("Quantity must be at least 1"));
    }

    let mut conn = state.db.acquire().await?;
    let product = Product::resolve(&mut conn, &ProductKey::from(key))
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    let result = sqlx::query(
        "UPDATE cart_items SET quantity = $3 WHERE user_id = $1 AND product_id = $2",
    )
    .bind(user.id)
    .bind(product.id)
    .bind(req.quantity)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Item not found in cart".to_string()));
    }

    let cart = load_cart(&mut conn, user.id).await?;
    Ok(Json(ApiResponse::new(cart)))
}

pub async fn remove_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<CartView>>, ApiError> {
    let mut conn = state.db.acquire().await?;
    if let Some(product) = Product::resolve(&mut conn, &ProductKey::from(key)).await? {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
            .bind(user.id)
            .bind(product.id)
            .execute(&mut *conn)
            .await?;
    }
    let cart = load_cart(&mut conn, user.id).await?;
    Ok(Json(ApiResponse::new(cart)))
}

pub async fn clear_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<CartView>>, ApiError> {
    let mut conn = state.db.acquire().await?;
    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user.id)
        .execute(&mut *conn)
        .await?;
    let cart = load_cart(&mut conn, user.id).await?;
    Ok(Json(ApiResponse::new(cart)))
}
