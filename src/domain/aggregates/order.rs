//! Order Aggregate
//!
//! The lifecycle is `pending -> shipped -> delivered`, with `cancelled`
//! reachable from `pending` only. Checkout freezes a cart into an order;
//! after that only `status` and `tracking_number` may change.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use crate::domain::aggregates::cart::Cart;
use crate::domain::value_objects::{Money, CURRENCY};
use crate::domain::events::{DomainEvent, OrderEvent};

/// Flat 10% tax on the cart subtotal. Policy constant, not configurable.
fn tax_rate() -> Decimal { Decimal::new(10, 2) }

/// Flat free-shipping policy.
fn shipping_fee() -> Money { Money::zero(CURRENCY) }

#[derive(Clone, Debug)]
pub struct Order {
    id: Uuid,
    user_id: Uuid,
    items: Vec<OrderItem>,
    total_amount: Money,
    status: OrderStatus,
    shipping_address: ShippingAddress,
    tracking_number: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

/// A cart line frozen at checkout, detached from any later product mutation.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
    pub image: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(rename = "postalCode")]
    pub postal_code: String,
    pub country: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending", Self::Shipped => "shipped",
            Self::Delivered => "delivered", Self::Cancelled => "cancelled",
        }
    }

    /// No transition leaves `delivered` or `cancelled`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Shipped)
                | (Self::Pending, Self::Cancelled)
                | (Self::Shipped, Self::Delivered)
        )
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending), "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered), "cancelled" => Ok(Self::Cancelled),
            _ => Err(OrderError::UnknownStatus(s.to_string())),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str()) }
}

/// Totals derived from a cart at checkout time.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckoutSummary {
    pub subtotal: Money,
    pub tax: Money,
    pub shipping: Money,
    pub total: Money,
}

impl CheckoutSummary {
    pub fn for_cart(cart: &Cart) -> Result<Self, CheckoutError> {
        if cart.is_empty() { return Err(CheckoutError::EmptyCart); }
        let subtotal = cart.total();
        let tax = subtotal.scale(tax_rate());
        let shipping = shipping_fee();
        // Everything is minted in CURRENCY, so the adds cannot mismatch.
        let total = subtotal.add(&tax).and_then(|t| t.add(&shipping)).unwrap_or_else(|_| subtotal.clone());
        Ok(Self { subtotal, tax, shipping, total })
    }
}

impl Order {
    /// Freezes a non-empty cart into a new `pending` order.
    pub fn checkout(cart: &Cart, user_id: Uuid, shipping_address: ShippingAddress) -> Result<Self, CheckoutError> {
        let summary = CheckoutSummary::for_cart(cart)?;
        let id = Uuid::new_v4();
        let now = Utc::now();
        let items = cart.lines().iter().map(|l| OrderItem {
            product_id: l.product_id,
            name: l.name.clone(),
            price: l.price.clone(),
            quantity: l.quantity,
            image: l.image.clone(),
        }).collect();
        let mut order = Self {
            id, user_id, items, total_amount: summary.total.clone(),
            status: OrderStatus::Pending, shipping_address, tracking_number: None,
            created_at: now, updated_at: now, events: vec![],
        };
        order.raise_event(DomainEvent::Order(OrderEvent::Created {
            order_id: id, user_id, total: summary.total.amount(),
        }));
        Ok(order)
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn user_id(&self) -> Uuid { self.user_id }
    pub fn items(&self) -> &[OrderItem] { &self.items }
    pub fn total_amount(&self) -> &Money { &self.total_amount }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn shipping_address(&self) -> &ShippingAddress { &self.shipping_address }
    pub fn tracking_number(&self) -> Option<&str> { self.tracking_number.as_deref() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    /// Moves the order to `target` if the lifecycle allows it. A disallowed
    /// pair fails without touching the order; there is no silent coercion.
    pub fn transition(&mut self, target: OrderStatus, tracking_number: Option<String>) -> Result<(), OrderError> {
        if !self.status.can_transition_to(target) {
            return Err(OrderError::InvalidTransition { from: self.status, to: target });
        }
        let from = self.status;
        self.status = target;
        if let Some(tracking) = tracking_number {
            self.tracking_number = Some(tracking);
        }
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::StatusChanged { order_id: self.id, from, to: target }));
        Ok(())
    }

    /// Persisted form, field-exact with the wire contract.
    pub fn to_record(&self) -> OrderRecord {
        OrderRecord {
            id: self.id,
            user_id: self.user_id,
            items: self.items.iter().map(|i| OrderItemRecord {
                product_id: i.product_id, name: i.name.clone(), price: i.price.amount(),
                quantity: i.quantity, image: i.image.clone(),
            }).collect(),
            total_amount: self.total_amount.amount(),
            status: self.status,
            shipping_address: self.shipping_address.clone(),
            tracking_number: self.tracking_number.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Rebuilds an order from its persisted form. No events are raised.
    pub fn from_record(record: OrderRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            items: record.items.into_iter().map(|i| OrderItem {
                product_id: i.product_id, name: i.name, price: Money::new(i.price, CURRENCY),
                quantity: i.quantity, image: i.image,
            }).collect(),
            total_amount: Money::new(record.total_amount, CURRENCY),
            status: record.status,
            shipping_address: record.shipping_address,
            tracking_number: record.tracking_number,
            created_at: record.created_at,
            updated_at: record.updated_at,
            events: vec![],
        }
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

/// Wire/persisted representation of an order.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItemRecord>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub shipping_address: ShippingAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRecord {
    pub product_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum CheckoutError { EmptyCart }
impl std::error::Error for CheckoutError {}
impl fmt::Display for CheckoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Cannot check out an empty cart") }
}

#[derive(Debug, Clone)]
pub enum OrderError {
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    UnknownStatus(String),
}
impl std::error::Error for OrderError {}
impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTransition { from, to } => write!(f, "Cannot move order from '{}' to '{}'", from, to),
            Self::UnknownStatus(s) => write!(f, "Unknown order status '{}'", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::cart::CartLine;

    fn address() -> ShippingAddress {
        ShippingAddress {
            street: "12 College Walk".into(), city: "Cambridge".into(), state: "MA".into(),
            postal_code: "02139".into(), country: "US".into(),
        }
    }

    fn cart_with(price_cents: i64, quantity: u32) -> Cart {
        Cart::from_lines(vec![CartLine {
            product_id: Uuid::new_v4(), name: "Textbook".into(),
            price: Money::usd(Decimal::new(price_cents, 2)), image: "/img.jpg".into(), quantity,
        }])
    }

    #[test]
    fn test_checkout_totals() {
        let cart = cart_with(3599, 1);
        let summary = CheckoutSummary::for_cart(&cart).unwrap();
        assert_eq!(summary.subtotal.amount(), Decimal::new(3599, 2)); // 35.99
        assert_eq!(summary.tax.amount(), Decimal::new(3599, 3)); // 3.599
        assert_eq!(summary.shipping.amount(), Decimal::ZERO);
        assert_eq!(summary.total.amount(), Decimal::new(39589, 3)); // 39.589
    }

    #[test]
    fn test_checkout_produces_pending_order() {
        let cart = cart_with(3599, 1);
        let order = Order::checkout(&cart, Uuid::new_v4(), address()).unwrap();
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.items().len(), 1);
        assert_eq!(order.total_amount().amount(), Decimal::new(39589, 3));
        assert!(order.tracking_number().is_none());
    }

    #[test]
    fn test_checkout_empty_cart_fails() {
        let err = Order::checkout(&Cart::new(), Uuid::new_v4(), address()).unwrap_err();
        assert_eq!(err, CheckoutError::EmptyCart);
    }

    #[test]
    fn test_order_items_are_frozen_copies() {
        let cart = cart_with(1000, 2);
        let snapshot = cart.lines()[0].clone();
        let order = Order::checkout(&cart, Uuid::new_v4(), address()).unwrap();
        drop(cart);
        assert_eq!(order.items()[0].product_id, snapshot.product_id);
        assert_eq!(order.items()[0].price, snapshot.price);
        assert_eq!(order.items()[0].quantity, 2);
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut order = Order::checkout(&cart_with(1000, 1), Uuid::new_v4(), address()).unwrap();
        order.transition(OrderStatus::Shipped, Some("TRK-001".into())).unwrap();
        assert_eq!(order.status(), OrderStatus::Shipped);
        assert_eq!(order.tracking_number(), Some("TRK-001"));
        order.transition(OrderStatus::Delivered, None).unwrap();
        assert_eq!(order.status(), OrderStatus::Delivered);
    }

    #[test]
    fn test_cancel_only_from_pending() {
        let mut order = Order::checkout(&cart_with(1000, 1), Uuid::new_v4(), address()).unwrap();
        order.transition(OrderStatus::Shipped, None).unwrap();
        let err = order.transition(OrderStatus::Cancelled, None).unwrap_err();
        match err {
            OrderError::InvalidTransition { from, to } => {
                assert_eq!(from, OrderStatus::Shipped);
                assert_eq!(to, OrderStatus::Cancelled);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(order.status(), OrderStatus::Shipped); // Unchanged on failure

        let mut cancellable = Order::checkout(&cart_with(1000, 1), Uuid::new_v4(), address()).unwrap();
        cancellable.transition(OrderStatus::Cancelled, None).unwrap();
        assert_eq!(cancellable.status(), OrderStatus::Cancelled);
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        let mut delivered = Order::checkout(&cart_with(1000, 1), Uuid::new_v4(), address()).unwrap();
        delivered.transition(OrderStatus::Shipped, None).unwrap();
        delivered.transition(OrderStatus::Delivered, None).unwrap();
        for target in [OrderStatus::Pending, OrderStatus::Shipped, OrderStatus::Delivered, OrderStatus::Cancelled] {
            assert!(delivered.transition(target, None).is_err());
        }
        assert_eq!(delivered.status(), OrderStatus::Delivered);
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_record_round_trip() {
        let mut order = Order::checkout(&cart_with(3599, 2), Uuid::new_v4(), address()).unwrap();
        order.transition(OrderStatus::Shipped, Some("TRK-9".into())).unwrap();
        let json = serde_json::to_string(&order.to_record()).unwrap();
        let reloaded = Order::from_record(serde_json::from_str(&json).unwrap());
        assert_eq!(reloaded.items(), order.items());
        assert_eq!(reloaded.total_amount(), order.total_amount());
        assert_eq!(reloaded.status(), order.status());
        assert_eq!(reloaded.tracking_number(), Some("TRK-9"));
    }

    #[test]
    fn test_record_uses_wire_field_names() {
        let order = Order::checkout(&cart_with(1000, 1), Uuid::new_v4(), address()).unwrap();
        let value = serde_json::to_value(order.to_record()).unwrap();
        assert!(value.get("userId").is_some());
        assert!(value.get("totalAmount").is_some());
        assert_eq!(value["status"], "pending");
        assert!(value["shippingAddress"].get("postalCode").is_some());
        assert!(value["items"][0].get("productId").is_some());
        // trackingNumber absent until a carrier assigns one
        assert!(value.get("trackingNumber").is_none());
    }

    #[test]
    fn test_status_parse_display_round_trip() {
        for s in [OrderStatus::Pending, OrderStatus::Shipped, OrderStatus::Delivered, OrderStatus::Cancelled] {
            assert_eq!(s.as_str().parse::<OrderStatus>().unwrap(), s);
        }
        assert!("refunded".parse::<OrderStatus>().is_err());
    }
}
