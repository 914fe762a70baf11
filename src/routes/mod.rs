//! HTTP surface: route table and response envelopes.

pub mod admin;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;
pub mod wishlist;

use axum::{
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { success: true, data }
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self { success: true, count: data.len(), data }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub success: bool,
    pub count: usize,
    pub total: i64,
    pub page: u32,
    pub total_pages: i64,
    pub data: Vec<T>,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: i64, page: u32, per_page: u32) -> Self {
        Self {
            success: true,
            count: data.len(),
            total,
            page,
            total_pages: (total + i64::from(per_page) - 1) / i64::from(per_page).max(1),
            data,
        }
    }
}

/// SQL OFFSET for a 1-based page, widened before the multiply so oversized
/// page numbers cannot overflow.
pub(crate) fn page_offset(page: u32, limit: u32) -> i64 {
    i64::from(page.max(1) - 1) * i64::from(limit)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/health",
            get(|| async { Json(serde_json::json!({"status": "healthy", "service": "storefront"})) }),
        )
        .route("/api/products", get(products::list_products))
        .route("/api/products/:key", get(products::get_product))
        .route("/api/categories", get(categories::list_categories))
        .route("/api/categories/:key", get(categories::get_category))
        .route(
            "/api/cart",
            get(cart::get_cart).post(cart::add_item).delete(cart::clear_cart),
        )
        .route(
            "/api/cart/:key",
            put(cart::update_item).delete(cart::remove_item),
        )
        .route("/api/wishlist", get(wishlist::list).post(wishlist::add))
        .route("/api/wishlist/:key", delete(wishlist::remove))
        .route("/api/orders", post(orders::create_order))
        .route("/api/orders/my-orders", get(orders::my_orders))
        .route("/api/orders/:id", get(orders::get_order))
        .route("/api/admin/orders", get(admin::list_orders))
        .route("/api/admin/orders/:id/status", put(admin::update_order_status))
        .route("/api/admin/inventory", get(admin::list_inventory))
        .route("/api/admin/inventory/low-stock", get(admin::low_stock))
        .route("/api/admin/inventory/sync", post(admin::sync_inventory))
        .route(
            "/api/admin/inventory/:id",
            get(admin::get_inventory).put(admin::update_inventory),
        )
        .route(
            "/api/admin/categories",
            get(admin::list_categories).post(admin::create_category),
        )
        .route(
            "/api/admin/categories/:id",
            put(admin::update_category).delete(admin::delete_category),
        )
        .route("/api/admin/products", post(admin::create_product))
        .route(
            "/api/admin/products/:id",
            put(admin::update_product).delete(admin::delete_product),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_offset_is_zero_based_and_overflow_safe() {
        assert_eq!(page_offset(1, 20), 0);
        assert_eq!(page_offset(3, 20), 40);
        assert_eq!(page_offset(0, 20), 0);
        assert_eq!(page_offset(u32::MAX, 100), (i64::from(u32::MAX) - 1) * 100);
    }
}
