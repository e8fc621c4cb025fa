//! Product persistence. Seller and reviews are document-shaped and live in
//! JSONB columns; scalar fields get their own columns.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::aggregates::product::{Category, Condition, Product, Review, Seller};
use crate::domain::value_objects::{Money, CURRENCY};
use crate::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    price: Decimal,
    category: String,
    condition: Option<String>,
    image: String,
    quantity: i32,
    seller: serde_json::Value,
    reviews: serde_json::Value,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl ProductRow {
    fn into_domain(self) -> Result<Product, AppError> {
        let category: Category = self.category.parse()?;
        let condition = self.condition.as_deref().map(|s| s.parse::<Condition>()).transpose()?;
        let seller: Seller = serde_json::from_value(self.seller)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("stored seller unreadable: {e}")))?;
        let reviews: Vec<Review> = serde_json::from_value(self.reviews)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("stored reviews unreadable: {e}")))?;
        Ok(Product::from_stored(
            self.id, self.name, self.description, Money::new(self.price, CURRENCY),
            category, condition, self.image, self.quantity.max(0) as u32,
            seller, reviews, self.created_at, self.updated_at,
        ))
    }
}

const SELECT: &str =
    "SELECT id, name, description, price, category, condition, image, quantity, seller, reviews, created_at, updated_at FROM products";

/// Full-scan listing, newest first.
pub async fn list(pool: &PgPool) -> Result<Vec<Product>, AppError> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!("{SELECT} ORDER BY created_at DESC"))
        .fetch_all(pool)
        .await?;
    rows.into_iter().map(ProductRow::into_domain).collect()
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<Product>, AppError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!("{SELECT} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(ProductRow::into_domain).transpose()
}

pub async fn insert(pool: &PgPool, product: &Product) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO products (id, name, description, price, category, condition, image, quantity, seller, reviews, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(product.id())
    .bind(product.name())
    .bind(product.description())
    .bind(product.price().amount())
    .bind(product.category().as_str())
    .bind(product.condition().map(|c| c.as_str()))
    .bind(product.image())
    .bind(product.quantity().value() as i32)
    .bind(serde_json::to_value(product.seller()).map_err(anyhow::Error::from)?)
    .bind(serde_json::to_value(product.reviews()).map_err(anyhow::Error::from)?)
    .bind(product.created_at())
    .bind(product.updated_at())
    .execute(pool)
    .await?;
    Ok(())
}

/// Writes every mutable column back; used after edits, review appends, and
/// stock decrements alike.
pub async fn update(pool: &PgPool, product: &Product) -> Result<bool, AppError> {
    let result = sqlx::query(
        "UPDATE products SET name = $2, description = $3, price = $4, category = $5, condition = $6,
         image = $7, quantity = $8, seller = $9, reviews = $10, updated_at = $11 WHERE id = $1",
    )
    .bind(product.id())
    .bind(product.name())
    .bind(product.description())
    .bind(product.price().amount())
    .bind(product.category().as_str())
    .bind(product.condition().map(|c| c.as_str()))
    .bind(product.image())
    .bind(product.quantity().value() as i32)
    .bind(serde_json::to_value(product.seller()).map_err(anyhow::Error::from)?)
    .bind(serde_json::to_value(product.reviews()).map_err(anyhow::Error::from)?)
    .bind(product.updated_at())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
