//! Admin console: order lifecycle, inventory management, product CRUD.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AdminUser;
use crate::domain::ledger::{self, MovementType, StockStatus};
use crate::domain::lifecycle::OrderStatus;
use crate::error::ApiError;
use crate::models::{Category, Inventory, Order, Product, StatusHistoryEntry, StockMovement, User};
use crate::notify;
use crate::routes::{categories, ApiResponse, ListResponse, PaginatedResponse};
use crate::state::AppState;

// ==================== ORDERS ====================

#[derive(Debug, Deserialize)]
pub struct AdminOrderParams {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn list_orders(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<AdminOrderParams>,
) -> Result<Json<PaginatedResponse<Order>>, ApiError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(20).min(100);

    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE ($1::text IS NULL OR status = $1) \
         ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(&params.status)
    .bind(i64::from(limit))
    .bind(crate::routes::page_offset(page, limit))
    .fetch_all(&state.db)
    .await?;

    let (total,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM orders WHERE ($1::text IS NULL OR status = $1)")
            .bind(&params.status)
            .fetch_one(&state.db)
            .await?;

    Ok(Json(PaginatedResponse::new(orders, total, page, limit)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    pub status: String,
    pub tracking_number: Option<String>,
    pub note: Option<String>,
}

pub async fn update_order_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<Json<ApiResponse<Order>>, ApiError> {
    let target: OrderStatus = req
        .status
        .parse()
        .map_err(|_| ApiError::validation(format!("Invalid order status '{}'", req.status)))?;

    let mut tx = state.db.begin().await?;

    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;
    let current: OrderStatus = order
        .status
        .parse()
        .map_err(|_| anyhow::anyhow!("order {} has corrupt status '{}'", order.id, order.status))?;
    if !current.can_transition_to(target) {
        return Err(ApiError::validation(format!(
            "Cannot transition order from {current} to {target}"
        )));
    }

    let order = sqlx::query_as::<_, Order>(
        "UPDATE orders SET status = $2, tracking_number = COALESCE($3, tracking_number), \
                           updated_at = NOW() \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(target.to_string())
    .bind(&req.tracking_number)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query_as::<_, StatusHistoryEntry>(
        "INSERT INTO order_status_history (id, order_id, status, note, created_at) \
         VALUES ($1, $2, $3, $4, NOW()) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(id)
    .bind(target.to_string())
    .bind(req.note.unwrap_or_else(|| format!("Order status updated to {target}")))
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    let customer = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(order.user_id)
        .fetch_optional(&state.db)
        .await?;
    if let Some(customer) = customer {
        notify::dispatch(state.mailer.clone(), notify::order_status_email(&order, &customer));
    }
    notify::publish_event(state.nats.clone(), "orders.status_updated", &order);

    Ok(Json(ApiResponse::new(order)))
}

// ==================== INVENTORY ====================

/// Inventory record plus the derived fields the admin console displays.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryView {
    #[serde(flatten)]
    pub record: Inventory,
    pub available_stock: i32,
    pub total_value: i64,
    pub status: StockStatus,
}

impl From<Inventory> for InventoryView {
    fn from(record: Inventory) -> Self {
        Self {
            available_stock: record.available_stock(),
            total_value: record.total_value(),
            status: record.status(),
            record,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryDetail {
    #[serde(flatten)]
    pub view: InventoryView,
    pub movements: Vec<StockMovement>,
    pub reconciled: bool,
}

#[derive(Debug, Deserialize)]
pub struct InventoryParams {
    pub status: Option<String>,
    pub search: Option<String>,
}

pub async fn list_inventory(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<InventoryParams>,
) -> Result<Json<ListResponse<InventoryView>>, ApiError> {
    let records = sqlx::query_as::<_, Inventory>(
        "SELECT * FROM inventory \
         WHERE ($1::text IS NULL OR product_name ILIKE '%' || $1 || '%' OR sku ILIKE '%' || $1 || '%') \
         ORDER BY updated_at DESC",
    )
    .bind(&params.search)
    .fetch_all(&state.db)
    .await?;

    // Status is derived, so the filter is applied after the read.
    let views: Vec<InventoryView> = records
        .into_iter()
        .map(InventoryView::from)
        .filter(|v| match &params.status {
            Some(wanted) => v.status.to_string() == *wanted,
            None => true,
        })
        .collect();
    Ok(Json(ListResponse::new(views)))
}

#[derive(Debug, Deserialize)]
pub struct LowStockParams {
    pub limit: Option<u32>,
}

pub async fn low_stock(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<LowStockParams>,
) -> Result<Json<ListResponse<InventoryView>>, ApiError> {
    let limit = params.limit.unwrap_or(5) as usize;
    let records = sqlx::query_as::<_, Inventory>(
        "SELECT * FROM inventory ORDER BY current_stock ASC",
    )
    .fetch_all(&state.db)
    .await?;
    let views: Vec<InventoryView> = records
        .into_iter()
        .map(InventoryView::from)
        .filter(|v| matches!(v.status, StockStatus::LowStock | StockStatus::OutOfStock))
        .take(limit)
        .collect();
    Ok(Json(ListResponse::new(views)))
}

pub async fn get_inventory(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<InventoryDetail>>, ApiError> {
    let record = sqlx::query_as::<_, Inventory>("SELECT * FROM inventory WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Inventory item not found".to_string()))?;
    let movements = sqlx::query_as::<_, StockMovement>(
        "SELECT * FROM stock_movements WHERE product_id = $1 ORDER BY created_at",
    )
    .bind(record.product_id)
    .fetch_all(&state.db)
    .await?;

    let reconciled = ledger::is_consistent(
        record.baseline_stock,
        movements.iter().map(|m| m.quantity),
        record.current_stock,
    );
    if !reconciled {
        tracing::warn!(
            inventory_id = %record.id,
            sku = %record.sku,
            current_stock = record.current_stock,
            "stock ledger does not reconcile with current stock"
        );
    }

    Ok(Json(ApiResponse::new(InventoryDetail {
        view: InventoryView::from(record),
        movements,
        reconciled,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInventoryRequest {
    pub current_stock: Option<i32>,
    pub reorder_level: Option<i32>,
    pub discontinued: Option<bool>,
    #[serde(rename = "type")]
    pub movement_type: Option<String>,
    pub reason: Option<String>,
}

pub async fn update_inventory(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateInventoryRequest>,
) -> Result<Json<ApiResponse<InventoryView>>, ApiError> {
    if matches!(req.current_stock, Some(stock) if stock < 0) {
        return Err(ApiError::validation("currentStock cannot be negative"));
    }
    if matches!(req.reorder_level, Some(level) if level < 0) {
        return Err(ApiError::validation("reorderLevel cannot be negative"));
    }

    let mut tx = state.db.begin().await?;

    let record = sqlx::query_as::<_, Inventory>("SELECT * FROM inventory WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NotFound("Inventory item not found".to_string()))?;

    // Every stock correction is recorded in the ledger before the new value
    // is applied; a bare stock edit becomes a generic adjustment.
    let mut restocked = false;
    if let Some((movement_type, delta, reason)) =
        correction_movement(record.current_stock, &req)?
    {
        sqlx::query(
            "INSERT INTO stock_movements (id, product_id, movement_type, quantity, reason, performed_by, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW())",
        )
        .bind(Uuid::now_v7())
        .bind(record.product_id)
        .bind(movement_type.to_string())
        .bind(delta)
        .bind(&reason)
        .bind(admin.id)
        .execute(&mut *tx)
        .await?;
        restocked = movement_type == MovementType::Restock;
    }

    let updated = sqlx::query_as::<_, Inventory>(
        "UPDATE inventory SET current_stock = COALESCE($2::int, current_stock), \
                              reorder_level = COALESCE($3::int, reorder_level), \
                              discontinued = COALESCE($4::bool, discontinued), \
                              last_restock_date = CASE WHEN $5 THEN NOW() ELSE last_restock_date END, \
                              updated_at = NOW() \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(req.current_stock)
    .bind(req.reorder_level)
    .bind(req.discontinued)
    .bind(restocked)
    .fetch_one(&mut *tx)
    .await?;

    if req.current_stock.is_some() {
        sqlx::query("UPDATE products SET stock = $2, updated_at = NOW() WHERE id = $1")
            .bind(updated.product_id)
            .bind(updated.current_stock)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(Json(ApiResponse::new(InventoryView::from(updated))))
}

/// The ledger movement a stock correction produces: the explicit type and
/// reason when supplied, otherwise a generic adjustment. No movement when
/// the stock is untouched or unchanged.
fn correction_movement(
    old_stock: i32,
    req: &UpdateInventoryRequest,
) -> Result<Option<(MovementType, i32, String)>, ApiError> {
    let Some(new_stock) = req.current_stock else { return Ok(None) };
    let movement_type = match &req.movement_type {
        Some(raw) => raw
            .parse()
            .map_err(|_| ApiError::validation(format!("Invalid movement type '{raw}'")))?,
        None => MovementType::Adjustment,
    };
    let delta = new_stock - old_stock;
    if delta == 0 {
        return Ok(None);
    }
    let reason = req
        .reason
        .clone()
        .unwrap_or_else(|| "Inventory correction".to_string());
    Ok(Some((movement_type, delta, reason)))
}

pub async fn sync_inventory(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let missing = sqlx::query_as::<_, Product>(
        "SELECT p.* FROM products p LEFT JOIN inventory i ON i.product_id = p.id \
         WHERE i.id IS NULL",
    )
    .fetch_all(&state.db)
    .await?;

    // Movements may predate the inventory record (checkout writes them even
    // when no row exists yet), so the baseline backs them out: baseline +
    // sum(movements) must still equal the current stock.
    let mut synced = 0u64;
    for product in missing {
        let result = sqlx::query(
            "INSERT INTO inventory (id, product_id, sku, product_name, category, baseline_stock, \
                                    current_stock, unit_cost, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, \
                     $6 - COALESCE((SELECT SUM(quantity) FROM stock_movements WHERE product_id = $2), 0)::int, \
                     $6, $7, NOW(), NOW()) \
             ON CONFLICT (product_id) DO NOTHING",
        )
        .bind(Uuid::now_v7())
        .bind(product.id)
        .bind(derived_sku(product.id))
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.stock)
        .bind(assumed_unit_cost(product.price))
        .execute(&state.db)
        .await?;
        synced += result.rows_affected();
    }

    tracing::info!(synced, "inventory sync complete");
    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("Synced {synced} products to inventory"),
    })))
}

// ==================== CATEGORIES ====================

pub async fn list_categories(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<ListResponse<Category>>, ApiError> {
    let categories =
        sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY sort_order, name")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(ListResponse::new(categories)))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, message = "Category name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
    pub image_url: Option<String>,
}

pub async fn create_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Category>>), ApiError> {
    req.validate()?;

    if let Some(parent_id) = req.parent_id {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
                .bind(parent_id)
                .fetch_one(&state.db)
                .await?;
        if !exists {
            return Err(ApiError::NotFound("Category not found".to_string()));
        }
    }

    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (id, name, slug, description, parent_id, is_active, sort_order, image_url, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW()) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&req.name)
    .bind(categories::slugify(&req.name))
    .bind(&req.description)
    .bind(req.parent_id)
    .bind(req.is_active.unwrap_or(true))
    .bind(req.sort_order.unwrap_or(0))
    .bind(&req.image_url)
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(category))))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
    pub image_url: Option<String>,
}

pub async fn update_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCategoryRequest>,
) -> Result<Json<ApiResponse<Category>>, ApiError> {
    if matches!(&req.name, Some(name) if name.is_empty()) {
        return Err(ApiError::validation("Category name is required"));
    }

    // A renamed category gets a fresh slug.
    let slug = req.name.as_deref().map(categories::slugify);
    let category = sqlx::query_as::<_, Category>(
        "UPDATE categories SET name = COALESCE($2, name), slug = COALESCE($3, slug), \
                               description = COALESCE($4, description), \
                               parent_id = COALESCE($5, parent_id), \
                               is_active = COALESCE($6, is_active), \
                               sort_order = COALESCE($7::int, sort_order), \
                               image_url = COALESCE($8, image_url), updated_at = NOW() \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&req.name)
    .bind(slug)
    .bind(&req.description)
    .bind(req.parent_id)
    .bind(req.is_active)
    .bind(req.sort_order)
    .bind(&req.image_url)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;
    Ok(Json(ApiResponse::new(category)))
}

pub async fn delete_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Category not found".to_string()));
    }
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Category deleted successfully",
    })))
}

// ==================== PRODUCTS ====================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Brand is required"))]
    pub brand: String,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    pub subcategory: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price: i64,
    pub original_price: Option<i64>,
    pub image_url: Option<String>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,
    pub sku: Option<String>,
    pub external_id: Option<i64>,
    pub is_public: Option<bool>,
}

pub async fn create_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), ApiError> {
    req.validate()?;

    let mut tx = state.db.begin().await?;

    let id = Uuid::now_v7();
    let external_id = req
        .external_id
        .unwrap_or_else(|| (Uuid::new_v4().as_u128() % 100_000_000) as i64);
    let stock = req.stock.unwrap_or(0);

    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (id, external_id, name, brand, category, subcategory, description, \
                               price, original_price, image_url, stock, is_public, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NOW(), NOW()) RETURNING *",
    )
    .bind(id)
    .bind(external_id)
    .bind(&req.name)
    .bind(&req.brand)
    .bind(&req.category)
    .bind(&req.subcategory)
    .bind(&req.description)
    .bind(req.price)
    .bind(req.original_price)
    .bind(&req.image_url)
    .bind(stock)
    .bind(req.is_public.unwrap_or(true))
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO inventory (id, product_id, sku, product_name, category, baseline_stock, \
                                current_stock, unit_cost, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $6, $7, NOW(), NOW())",
    )
    .bind(Uuid::now_v7())
    .bind(product.id)
    .bind(req.sku.unwrap_or_else(|| derived_sku(product.id)))
    .bind(&product.name)
    .bind(&product.category)
    .bind(stock)
    .bind(assumed_unit_cost(product.price))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(product))))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price: Option<i64>,
    pub original_price: Option<i64>,
    pub image_url: Option<String>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,
    pub is_public: Option<bool>,
}

pub async fn update_product(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    req.validate()?;

    let mut tx = state.db.begin().await?;

    let existing = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    let product = sqlx::query_as::<_, Product>(
        "UPDATE products SET name = COALESCE($2, name), brand = COALESCE($3, brand), \
                             category = COALESCE($4, category), subcategory = COALESCE($5, subcategory), \
                             description = COALESCE($6, description), price = COALESCE($7, price), \
                             original_price = COALESCE($8, original_price), \
                             image_url = COALESCE($9, image_url), stock = COALESCE($10, stock), \
                             is_public = COALESCE($11, is_public), updated_at = NOW() \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.brand)
    .bind(&req.category)
    .bind(&req.subcategory)
    .bind(&req.description)
    .bind(req.price)
    .bind(req.original_price)
    .bind(&req.image_url)
    .bind(req.stock)
    .bind(req.is_public)
    .fetch_one(&mut *tx)
    .await?;

    // A stock edit through the product form is still a ledger event.
    if let Some(new_stock) = req.stock {
        let delta = new_stock - existing.stock;
        if delta != 0 {
            sqlx::query(
                "INSERT INTO stock_movements (id, product_id, movement_type, quantity, reason, performed_by, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, NOW())",
            )
            .bind(Uuid::now_v7())
            .bind(id)
            .bind(MovementType::Adjustment.to_string())
            .bind(delta)
            .bind("Product update")
            .bind(admin.id)
            .execute(&mut *tx)
            .await?;
        }
    }

    sqlx::query(
        "UPDATE inventory SET product_name = $2, category = $3, \
                              current_stock = COALESCE($4::int, current_stock), updated_at = NOW() \
         WHERE product_id = $1",
    )
    .bind(id)
    .bind(&product.name)
    .bind(&product.category)
    .bind(req.stock)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Json(ApiResponse::new(product)))
}

pub async fn delete_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Product not found".to_string()));
    }
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Product deleted successfully",
    })))
}

fn derived_sku(product_id: Uuid) -> String {
    let hex = product_id.simple().to_string();
    format!("SKU-{}", hex[hex.len() - 8..].to_uppercase())
}

/// Unit cost assumed at 60% of the selling price (40% margin) when no cost
/// data exists yet.
fn assumed_unit_cost(price: i64) -> i64 {
    price * 60 / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_sku_uses_id_tail() {
        let id = Uuid::parse_str("0191e4a0-0000-7000-8000-0123456789ab").unwrap();
        assert_eq!(derived_sku(id), "SKU-456789AB");
    }

    #[test]
    fn assumed_unit_cost_is_sixty_percent_of_price() {
        assert_eq!(assumed_unit_cost(1000), 600);
        assert_eq!(assumed_unit_cost(0), 0);
        assert_eq!(assumed_unit_cost(99), 59);
    }

    fn correction(stock: Option<i32>, movement_type: Option<&str>, reason: Option<&str>) -> UpdateInventoryRequest {
        UpdateInventoryRequest {
            current_stock: stock,
            reorder_level: None,
            discontinued: None,
            movement_type: movement_type.map(String::from),
            reason: reason.map(String::from),
        }
    }

    #[test]
    fn bare_stock_edit_still_produces_an_adjustment_movement() {
        let movement = correction_movement(10, &correction(Some(7), None, None)).unwrap();
        assert_eq!(
            movement,
            Some((MovementType::Adjustment, -3, "Inventory correction".to_string()))
        );
    }

    #[test]
    fn explicit_movement_type_and_reason_are_kept() {
        let movement =
            correction_movement(10, &correction(Some(60), Some("restock"), Some("Weekly delivery")))
                .unwrap();
        assert_eq!(movement, Some((MovementType::Restock, 50, "Weekly delivery".to_string())));
    }

    #[test]
    fn untouched_or_unchanged_stock_produces_no_movement() {
        assert_eq!(correction_movement(10, &correction(None, None, None)).unwrap(), None);
        assert_eq!(correction_movement(10, &correction(Some(10), Some("restock"), None)).unwrap(), None);
    }

    #[test]
    fn unknown_movement_type_is_rejected() {
        assert!(correction_movement(10, &correction(Some(5), Some("theft"), None)).is_err());
    }
}
