//! Domain events raised by aggregates, published to NATS when configured
use crate::domain::aggregates::order::OrderStatus;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum DomainEvent {
    Product(ProductEvent),
    Order(OrderEvent),
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: Uuid, seller_id: Uuid },
    Reviewed { product_id: Uuid, rating: u8 },
    StockReduced { product_id: Uuid, remaining: u32 },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrderEvent {
    Created { order_id: Uuid, user_id: Uuid, total: Decimal },
    StatusChanged { order_id: Uuid, from: OrderStatus, to: OrderStatus },
}

impl DomainEvent {
    /// NATS subject this event is published under.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Product(ProductEvent::Created { .. }) => "market.products.created",
            Self::Product(ProductEvent::Reviewed { .. }) => "market.products.reviewed",
            Self::Product(ProductEvent::StockReduced { .. }) => "market.products.stock_reduced",
            Self::Order(OrderEvent::Created { .. }) => "market.orders.created",
            Self::Order(OrderEvent::StatusChanged { .. }) => "market.orders.status_changed",
        }
    }
}
