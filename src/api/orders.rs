//! Checkout, order history, and admin status transitions.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::{publish_events, AppState};
use crate::auth::AuthUser;
use crate::domain::aggregates::cart::Cart;
use crate::domain::aggregates::order::{CheckoutSummary, Order, OrderRecord, OrderStatus, ShippingAddress};
use crate::error::AppError;
use crate::store;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutLine>,
    #[validate]
    pub shipping_address: ShippingAddressRequest,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    pub product_id: Uuid,
    pub quantity: u32,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddressRequest {
    #[validate(length(min = 1, message = "Street is required"))]
    pub street: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    #[validate(length(min = 1, message = "Postal code is required"))]
    pub postal_code: String,
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
}

impl From<ShippingAddressRequest> for ShippingAddress {
    fn from(req: ShippingAddressRequest) -> Self {
        Self {
            street: req.street, city: req.city, state: req.state,
            postal_code: req.postal_code, country: req.country,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order: OrderRecord,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

/// Rebuilds the session cart from client-held lines against current catalog
/// rows, freezes it into a pending order, and decrements stock.
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), AppError> {
    req.validate()?;

    // Merge duplicate lines before touching the catalog, so each product is
    // fetched and decremented once.
    let mut merged: Vec<(Uuid, u32)> = Vec::new();
    for line in &req.items {
        if line.quantity == 0 {
            continue;
        }
        match merged.iter_mut().find(|(id, _)| *id == line.product_id) {
            Some((_, qty)) => *qty += line.quantity,
            None => merged.push((line.product_id, line.quantity)),
        }
    }

    let mut cart = Cart::new();
    let mut touched = Vec::with_capacity(merged.len());
    for (product_id, quantity) in merged {
        let mut product = store::products::get(&state.db, product_id)
            .await?
            .ok_or(AppError::NotFound("Product"))?;
        product.reduce_stock(quantity)?;
        cart.add_to_cart(&product);
        cart.update_quantity(product.id(), quantity);
        touched.push(product);
    }

    let summary = CheckoutSummary::for_cart(&cart)?;
    let mut order = Order::checkout(&cart, user.user_id, req.shipping_address.into())?;
    store::orders::insert(&state.db, &order).await?;
    for product in &mut touched {
        store::products::update(&state.db, product).await?;
        publish_events(&state, product.take_events()).await;
    }
    publish_events(&state, order.take_events()).await;

    tracing::info!(order_id = %order.id(), user_id = %user.user_id, total = %summary.total, "order placed");
    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            order: order.to_record(),
            subtotal: summary.subtotal.amount(),
            tax: summary.tax.amount(),
            shipping: summary.shipping.amount(),
            total: summary.total.amount(),
        }),
    ))
}

pub async fn list_mine(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<OrderRecord>>, AppError> {
    let orders = store::orders::list_by_user(&state.db, user.user_id).await?;
    Ok(Json(orders.iter().map(Order::to_record).collect()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderRecord>, AppError> {
    user.require_admin()?;
    let mut order = store::orders::get(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Order"))?;
    order.transition(req.status, req.tracking_number)?;
    if !store::orders::update_status(&state.db, &order).await? {
        return Err(AppError::NotFound("Order"));
    }
    publish_events(&state, order.take_events()).await;
    Ok(Json(order.to_record()))
}
