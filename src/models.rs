//! Persistent records and the shared product identifier resolution.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::domain::ledger::{self, StockStatus};
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub external_id: i64,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub description: Option<String>,
    pub price: i64,
    pub original_price: Option<i64>,
    pub image_url: Option<String>,
    pub stock: i32,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product reference as supplied by a client: either the internal UUID or
/// the externally-assigned numeric id. Accepted as a JSON string, a JSON
/// number, or a raw path segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductKey {
    Id(Uuid),
    External(i64),
    Raw(String),
}

impl ProductKey {
    fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Raw(s) => Uuid::parse_str(s).ok(),
            Self::External(_) => None,
        }
    }

    fn as_external(&self) -> Option<i64> {
        match self {
            Self::External(n) => Some(*n),
            Self::Raw(s) => s.parse().ok(),
            Self::Id(_) => None,
        }
    }
}

impl From<String> for ProductKey {
    fn from(raw: String) -> Self {
        Self::Raw(raw)
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::External(n) => write!(f, "{n}"),
            Self::Raw(s) => f.write_str(s),
        }
    }
}

impl Product {
    /// Resolves a product by internal UUID first, then by external numeric
    /// id. Every caller keys downstream records by the internal UUID of the
    /// returned row, so both paths converge on the same record.
    pub async fn resolve(
        conn: &mut PgConnection,
        key: &ProductKey,
    ) -> Result<Option<Product>, sqlx::Error> {
        if let Some(id) = key.as_uuid() {
            let found = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;
            if found.is_some() {
                return Ok(found);
            }
        }
        if let Some(external_id) = key.as_external() {
            return sqlx::query_as::<_, Product>("SELECT * FROM products WHERE external_id = $1")
                .bind(external_id)
                .fetch_optional(&mut *conn)
                .await;
        }
        Ok(None)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub is_active: bool,
    pub sort_order: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub subtotal: i64,
    pub tax: i64,
    pub shipping_cost: i64,
    pub discount: i64,
    pub total: i64,
    pub status: String,
    pub payment_method: String,
    pub payment_status: String,
    pub transaction_id: Option<String>,
    pub payment_gateway: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub tracking_number: Option<String>,
    pub customer_notes: Option<String>,
    pub shipping_address: serde_json::Value,
    pub billing_address: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub quantity: i32,
    pub price: i64,
    pub subtotal: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
    pub id: Uuid,
    pub order_id: Uuid,
    pub status: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    pub id: Uuid,
    pub product_id: Uuid,
    pub sku: String,
    pub product_name: String,
    pub category: String,
    pub baseline_stock: i32,
    pub current_stock: i32,
    pub reserved_stock: i32,
    pub reorder_level: i32,
    pub unit_cost: i64,
    pub discontinued: bool,
    pub last_restock_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Inventory {
    /// Stock not allocated to unfulfilled orders.
    pub fn available_stock(&self) -> i32 {
        self.current_stock - self.reserved_stock
    }

    /// Value of stock on hand at unit cost, in minor units.
    pub fn total_value(&self) -> i64 {
        i64::from(self.current_stock) * self.unit_cost
    }

    pub fn status(&self) -> StockStatus {
        ledger::stock_status(self.current_stock, self.reorder_level, self.discontinued)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub movement_type: String,
    pub quantity: i32,
    pub reason: Option<String>,
    pub performed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: i64,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub total_orders: i32,
    pub total_spent: i64,
    pub average_order_value: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Loads the profile row for an authenticated id; the identity header is
    /// only trusted when the auth service has provisioned the user here.
    pub async fn require(conn: &mut PgConnection, id: Uuid) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or(ApiError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_key_accepts_uuid_and_numeric_forms() {
        let id = Uuid::new_v4();
        let key = ProductKey::Raw(id.to_string());
        assert_eq!(key.as_uuid(), Some(id));
        assert_eq!(key.as_external(), None);

        let key = ProductKey::Raw("12345678".to_string());
        assert_eq!(key.as_uuid(), None);
        assert_eq!(key.as_external(), Some(12345678));

        let key: ProductKey = serde_json::from_str("42").unwrap();
        assert_eq!(key.as_external(), Some(42));
    }

    #[test]
    fn inventory_derives_available_stock_value_and_status() {
        let inv = Inventory {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            sku: "SKU-TEST".into(),
            product_name: "Test".into(),
            category: "misc".into(),
            baseline_stock: 0,
            current_stock: 8,
            reserved_stock: 3,
            reorder_level: 10,
            unit_cost: 600,
            discontinued: false,
            last_restock_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(inv.available_stock(), 5);
        assert_eq!(inv.total_value(), 4800);
        assert_eq!(inv.status(), StockStatus::LowStock);
    }
}
