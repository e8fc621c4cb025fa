//! Order persistence. Append-only creation; only `status` and
//! `tracking_number` ever change after insert.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::aggregates::order::{Order, OrderItemRecord, OrderRecord, ShippingAddress};
use crate::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    items: serde_json::Value,
    total_amount: Decimal,
    status: String,
    shipping_address: serde_json::Value,
    tracking_number: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl OrderRow {
    fn into_domain(self) -> Result<Order, AppError> {
        let items: Vec<OrderItemRecord> = serde_json::from_value(self.items)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("stored order items unreadable: {e}")))?;
        let shipping_address: ShippingAddress = serde_json::from_value(self.shipping_address)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("stored shipping address unreadable: {e}")))?;
        Ok(Order::from_record(OrderRecord {
            id: self.id,
            user_id: self.user_id,
            items,
            total_amount: self.total_amount,
            status: self.status.parse()?,
            shipping_address,
            tracking_number: self.tracking_number,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }))
    }
}

const SELECT: &str =
    "SELECT id, user_id, items, total_amount, status, shipping_address, tracking_number, created_at, updated_at FROM orders";

pub async fn insert(pool: &PgPool, order: &Order) -> Result<(), AppError> {
    let record = order.to_record();
    sqlx::query(
        "INSERT INTO orders (id, user_id, items, total_amount, status, shipping_address, tracking_number, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(record.id)
    .bind(record.user_id)
    .bind(serde_json::to_value(&record.items).map_err(anyhow::Error::from)?)
    .bind(record.total_amount)
    .bind(record.status.as_str())
    .bind(serde_json::to_value(&record.shipping_address).map_err(anyhow::Error::from)?)
    .bind(record.tracking_number)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<Order>, AppError> {
    let row = sqlx::query_as::<_, OrderRow>(&format!("{SELECT} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(OrderRow::into_domain).transpose()
}

pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Order>, AppError> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!("{SELECT} WHERE user_id = $1 ORDER BY created_at DESC"))
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    rows.into_iter().map(OrderRow::into_domain).collect()
}

/// Persists the outcome of a domain `transition`.
pub async fn update_status(pool: &PgPool, order: &Order) -> Result<bool, AppError> {
    let result = sqlx::query("UPDATE orders SET status = $2, tracking_number = $3, updated_at = $4 WHERE id = $1")
        .bind(order.id())
        .bind(order.status().as_str())
        .bind(order.tracking_number())
        .bind(order.updated_at())
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
