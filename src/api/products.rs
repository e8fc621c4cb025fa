//! Catalog handlers: listing, CRUD, and review appends.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::{publish_events, AppState};
use crate::auth::{AuthUser, Role};
use crate::domain::aggregates::product::{Category, Condition, Product, Review, Seller, SellerKind};
use crate::domain::value_objects::{Money, Rating};
use crate::error::AppError;
use crate::store;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    pub image: String,
    pub quantity: u32,
    pub seller: Seller,
    pub reviews: Vec<Review>,
    pub average_rating: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Product> for ProductResponse {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id(),
            name: p.name().to_string(),
            description: p.description().to_string(),
            price: p.price().amount(),
            category: p.category(),
            condition: p.condition(),
            image: p.image().to_string(),
            quantity: p.quantity().value(),
            seller: p.seller().clone(),
            reviews: p.reviews().to_vec(),
            average_rating: p.average_rating(),
            created_at: p.created_at(),
            updated_at: p.updated_at(),
        }
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let products = store::products::list(&state.db).await?;
    Ok(Json(products.iter().map(ProductResponse::from).collect()))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = store::products::get(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Product"))?;
    Ok(Json(ProductResponse::from(&product)))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertProductRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub price: Decimal,
    pub category: Category,
    pub condition: Option<Condition>,
    #[validate(length(min = 1, message = "Image is required"))]
    pub image: String,
    pub quantity: u32,
    /// Display name shown next to the listing; seller identity comes from
    /// the session, never the body.
    #[validate(length(min = 1, message = "Seller name is required"))]
    pub seller_name: String,
}

impl UpsertProductRequest {
    fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        if self.price.is_sign_negative() {
            return Err(AppError::Validation("Price cannot be negative".into()));
        }
        Ok(())
    }
}

fn seller_kind(role: Role) -> SellerKind {
    match role {
        Role::Society => SellerKind::Society,
        Role::Student | Role::Admin => SellerKind::Student,
    }
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<UpsertProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    req.check()?;
    let seller = Seller { id: user.user_id, name: req.seller_name.clone(), kind: seller_kind(user.role) };
    let mut product = Product::create(
        req.name, req.description, Money::usd(req.price),
        req.category, req.condition, req.image, req.quantity, seller,
    );
    store::products::insert(&state.db, &product).await?;
    publish_events(&state, product.take_events()).await;
    Ok((StatusCode::CREATED, Json(ProductResponse::from(&product))))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
    Json(req): Json<UpsertProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    req.check()?;
    let mut product = store::products::get(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Product"))?;
    if product.seller().id != user.user_id && user.role != Role::Admin {
        return Err(AppError::Forbidden);
    }
    product.update_details(req.name, req.description, Money::usd(req.price),
                           req.category, req.condition, req.image, req.quantity);
    if !store::products::update(&state.db, &product).await? {
        return Err(AppError::NotFound("Product"));
    }
    Ok(Json(ProductResponse::from(&product)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<StatusCode, AppError> {
    let product = store::products::get(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Product"))?;
    if product.seller().id != user.user_id && user.role != Role::Admin {
        return Err(AppError::Forbidden);
    }
    if !store::products::delete(&state.db, id).await? {
        return Err(AppError::NotFound("Product"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddReviewRequest {
    pub rating: u8,
    #[validate(length(min = 1, message = "Comment is required"))]
    pub comment: String,
    #[validate(length(min = 1, message = "Reviewer name is required"))]
    pub user_name: String,
}

pub async fn add_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
    Json(req): Json<AddReviewRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    req.validate()?;
    let rating = Rating::new(req.rating).map_err(|e| AppError::Validation(e.to_string()))?;
    let mut product = store::products::get(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Product"))?;
    product.add_review(Review::new(user.user_id, req.user_name, rating, req.comment));
    if !store::products::update(&state.db, &product).await? {
        return Err(AppError::NotFound("Product"));
    }
    publish_events(&state, product.take_events()).await;
    Ok((StatusCode::CREATED, Json(ProductResponse::from(&product))))
}
