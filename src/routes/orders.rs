//! Order placement and order reads.
//!
//! Checkout is one database transaction: stock reservation for every line,
//! order + items + initial history insert, user stat update and cart clear
//! either all commit or all roll back. The stock check-and-decrement is a
//! single conditional UPDATE, so two concurrent checkouts can never
//! oversell a product.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthUser;
use crate::domain::ledger::MovementType;
use crate::domain::lifecycle::{OrderStatus, PaymentMethod, PaymentStatus};
use crate::domain::totals::{self, LineInput};
use crate::error::ApiError;
use crate::models::{Order, OrderItem, Product, ProductKey, StatusHistoryEntry, User};
use crate::notify;
use crate::routes::{ApiResponse, ListResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub status_history: Vec<StatusHistoryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    pub last_name: String,
    #[validate(length(min = 1, message = "Address line is required"))]
    pub address1: String,
    pub address2: Option<String>,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    pub state: Option<String>,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub transaction_id: Option<String>,
    pub payment_gateway: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "No items in order"))]
    pub items: Vec<OrderItemRequest>,
    #[validate]
    pub shipping_address: Address,
    pub billing_address: Option<Address>,
    pub payment_method: String,
    pub payment_status: Option<String>,
    pub payment_details: Option<PaymentDetails>,
    pub customer_notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: ProductKey,
    pub quantity: i32,
}

pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>), ApiError> {
    req.validate()?;
    let payment_method: PaymentMethod = req
        .payment_method
        .parse()
        .map_err(|_| ApiError::validation(format!("Invalid payment method '{}'", req.payment_method)))?;
    let payment_status = match req.payment_status.as_deref() {
        Some(raw) => raw
            .parse::<PaymentStatus>()
            .map_err(|_| ApiError::validation(format!("Invalid payment status '{raw}'")))?,
        None => PaymentStatus::Pending,
    };
    if req.items.iter().any(|i| i.quantity < 1) {
        return Err(ApiError::validation("Quantity must be at least 1"));
    }

    // The number is allocated outside the transaction so the per-day counter
    // row lock is released immediately; a rolled-back checkout just leaves a
    // gap in the sequence.
    let order_number = next_order_number(&state.db).await?;

    let mut tx = state.db.begin().await?;

    let buyer = User::require(&mut tx, user.id).await?;

    // Reserve stock line by line. The conditional decrement is the atomic
    // guard; a miss on a resolvable product means insufficient stock, and
    // the error rolls back every earlier decrement.
    let mut lines: Vec<(Product, i32)> = Vec::with_capacity(req.items.len());
    for item in &req.items {
        let product = Product::resolve(&mut tx, &item.product_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Product {} not found", item.product_id)))?;

        let reserved = sqlx::query_as::<_, Product>(
            "UPDATE products SET stock = stock - $2, updated_at = NOW() \
             WHERE id = $1 AND stock >= $2 RETURNING *",
        )
        .bind(product.id)
        .bind(item.quantity)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(reserved) = reserved else {
            // A reservation miss re-checks the predicate against the latest
            // committed row, while the resolve above read an older snapshot.
            // Report the quantity from a fresh read, not the stale one.
            let (available,): (i32,) =
                sqlx::query_as("SELECT stock FROM products WHERE id = $1")
                    .bind(product.id)
                    .fetch_one(&mut *tx)
                    .await?;
            return Err(ApiError::InsufficientStock { product: product.name, available });
        };

        sqlx::query(
            "UPDATE inventory SET current_stock = current_stock - $2, updated_at = NOW() \
             WHERE product_id = $1",
        )
        .bind(reserved.id)
        .bind(item.quantity)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO stock_movements (id, product_id, movement_type, quantity, reason, performed_by, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW())",
        )
        .bind(Uuid::now_v7())
        .bind(reserved.id)
        .bind(MovementType::Sale.to_string())
        .bind(-item.quantity)
        .bind(format!("Order {order_number}"))
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

        lines.push((reserved, item.quantity));
    }

    let line_inputs: Vec<LineInput> = lines
        .iter()
        .map(|(p, q)| LineInput { price: p.price, quantity: *q })
        .collect();
    let totals = totals::calculate(&line_inputs, &state.policy, 0);

    let order_id = Uuid::now_v7();
    let shipping_address =
        serde_json::to_value(&req.shipping_address).map_err(anyhow::Error::from)?;
    let billing_address =
        serde_json::to_value(req.billing_address.as_ref().unwrap_or(&req.shipping_address))
            .map_err(anyhow::Error::from)?;
    let details = req.payment_details.unwrap_or_default();

    let order = sqlx::query_as::<_, Order>(
        "INSERT INTO orders (id, order_number, user_id, subtotal, tax, shipping_cost, discount, total, \
                             status, payment_method, payment_status, transaction_id, payment_gateway, \
                             paid_at, customer_notes, shipping_address, billing_address, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, NOW(), NOW()) \
         RETURNING *",
    )
    .bind(order_id)
    .bind(&order_number)
    .bind(user.id)
    .bind(totals.subtotal)
    .bind(totals.tax)
    .bind(totals.shipping_cost)
    .bind(totals.discount)
    .bind(totals.total)
    .bind(OrderStatus::Pending.to_string())
    .bind(payment_method.to_string())
    .bind(payment_status.to_string())
    .bind(&details.transaction_id)
    .bind(&details.payment_gateway)
    .bind(details.paid_at)
    .bind(&req.customer_notes)
    .bind(&shipping_address)
    .bind(&billing_address)
    .fetch_one(&mut *tx)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for ((product, quantity), line_subtotal) in lines.iter().zip(&totals.line_subtotals) {
        let item = sqlx::query_as::<_, OrderItem>(
            "INSERT INTO order_items (id, order_id, product_id, name, brand, image_url, quantity, price, subtotal) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(order_id)
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.brand)
        .bind(&product.image_url)
        .bind(*quantity)
        .bind(product.price)
        .bind(*line_subtotal)
        .fetch_one(&mut *tx)
        .await?;
        items.push(item);
    }

    let note = if payment_status == PaymentStatus::Completed {
        "Order placed and paid"
    } else {
        "Order placed"
    };
    let history = sqlx::query_as::<_, StatusHistoryEntry>(
        "INSERT INTO order_status_history (id, order_id, status, note, created_at) \
         VALUES ($1, $2, $3, $4, NOW()) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(order_id)
    .bind(OrderStatus::Pending.to_string())
    .bind(note)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE users SET total_orders = total_orders + 1, total_spent = total_spent + $2, \
                          average_order_value = (total_spent + $2) / (total_orders + 1), \
                          updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(user.id)
    .bind(totals.total)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    notify::dispatch(
        state.mailer.clone(),
        notify::order_confirmation_email(&order, &items, &buyer),
    );
    notify::publish_event(state.nats.clone(), "orders.created", &order);

    let response = OrderResponse { order, items, status_history: vec![history] };
    Ok((StatusCode::CREATED, Json(ApiResponse::new(response))))
}

pub async fn my_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ListResponse<OrderResponse>>, ApiError> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;
    let responses = attach_details(&state, orders).await?;
    Ok(Json(ListResponse::new(responses)))
}

pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;
    if order.user_id != user.id {
        return Err(ApiError::Forbidden("Not authorized to access this order".to_string()));
    }
    let mut responses = attach_details(&state, vec![order]).await?;
    let response = responses.pop().ok_or_else(|| anyhow::anyhow!("order vanished"))?;
    Ok(Json(ApiResponse::new(response)))
}

async fn attach_details(
    state: &AppState,
    orders: Vec<Order>,
) -> Result<Vec<OrderResponse>, ApiError> {
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut items = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_items WHERE order_id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(&state.db)
    .await?;
    let history = sqlx::query_as::<_, StatusHistoryEntry>(
        "SELECT * FROM order_status_history WHERE order_id = ANY($1) ORDER BY created_at",
    )
    .bind(&ids)
    .fetch_all(&state.db)
    .await?;

    Ok(orders
        .into_iter()
        .map(|order| {
            let (own_items, rest): (Vec<_>, Vec<_>) =
                items.drain(..).partition(|i| i.order_id == order.id);
            items = rest;
            let own_history = history.iter().filter(|h| h.order_id == order.id).cloned().collect();
            OrderResponse { order, items: own_items, status_history: own_history }
        })
        .collect())
}

async fn next_order_number(db: &sqlx::PgPool) -> Result<String, sqlx::Error> {
    let today = Utc::now().date_naive();
    let (seq,): (i32,) = sqlx::query_as(
        "INSERT INTO order_counters (day, counter) VALUES ($1, 1) \
         ON CONFLICT (day) DO UPDATE SET counter = order_counters.counter + 1 \
         RETURNING counter",
    )
    .bind(today)
    .fetch_one(db)
    .await?;
    Ok(format_order_number(today, seq))
}

/// Human-readable, date-encoded business identifier: `ORD-YYYYMMDD-NNNNN`.
pub fn format_order_number(day: NaiveDate, seq: i32) -> String {
    format!("ORD-{}-{:05}", day.format("%Y%m%d"), seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_numbers_encode_day_and_sequence() {
        let day = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        assert_eq!(format_order_number(day, 1), "ORD-20260829-00001");
        assert_eq!(format_order_number(day, 41_237), "ORD-20260829-41237");
    }

    #[test]
    fn create_order_request_rejects_empty_items() {
        let req = CreateOrderRequest {
            items: vec![],
            shipping_address: Address {
                first_name: "Rhea".into(),
                last_name: "Kapoor".into(),
                address1: "12 Hill Road".into(),
                address2: None,
                city: "Mumbai".into(),
                state: Some("MH".into()),
                postal_code: "400050".into(),
                country: "India".into(),
                phone: None,
            },
            billing_address: None,
            payment_method: "cod".into(),
            payment_status: None,
            payment_details: None,
            customer_notes: None,
        };
        let err = req.validate().unwrap_err();
        let api: ApiError = err.into();
        assert_eq!(api.to_string(), "items: No items in order");
    }
}
