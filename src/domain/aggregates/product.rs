//! Product Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use crate::domain::value_objects::{Money, Quantity, Rating};
use crate::domain::events::{DomainEvent, ProductEvent};

#[derive(Clone, Debug)]
pub struct Product {
    id: Uuid,
    name: String,
    description: String,
    price: Money,
    category: Category,
    condition: Option<Condition>,
    image: String,
    quantity: Quantity,
    seller: Seller,
    reviews: Vec<Review>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

/// Who listed the product. Campus sellers are either societies or individual students.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Seller {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SellerKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SellerKind { Society, Student }

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category { Clothing, Books, Electronics, Phones, Other }

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition { New, LikeNew, Good, Fair }

/// Immutable once created; owned by exactly one product.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub rating: Rating,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(user_id: Uuid, user_name: impl Into<String>, rating: Rating, comment: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), user_id, user_name: user_name.into(), rating, comment: comment.into(), created_at: Utc::now() }
    }
}

impl Product {
    #[allow(clippy::too_many_arguments)]
    pub fn create(name: impl Into<String>, description: impl Into<String>, price: Money,
                  category: Category, condition: Option<Condition>, image: impl Into<String>,
                  quantity: u32, seller: Seller) -> Self {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let seller_id = seller.id;
        let mut product = Self {
            id, name: name.into(), description: description.into(), price, category, condition,
            image: image.into(), quantity: Quantity::new(quantity), seller, reviews: vec![],
            created_at: now, updated_at: now, events: vec![],
        };
        product.raise_event(DomainEvent::Product(ProductEvent::Created { product_id: id, seller_id }));
        product
    }

    /// Rebuilds a product from its persisted parts. No events are raised.
    #[allow(clippy::too_many_arguments)]
    pub fn from_stored(id: Uuid, name: String, description: String, price: Money,
                       category: Category, condition: Option<Condition>, image: String,
                       quantity: u32, seller: Seller, reviews: Vec<Review>,
                       created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        Self {
            id, name, description, price, category, condition, image,
            quantity: Quantity::new(quantity), seller, reviews, created_at, updated_at, events: vec![],
        }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn description(&self) -> &str { &self.description }
    pub fn price(&self) -> &Money { &self.price }
    pub fn category(&self) -> Category { self.category }
    pub fn condition(&self) -> Option<Condition> { self.condition }
    pub fn image(&self) -> &str { &self.image }
    pub fn quantity(&self) -> &Quantity { &self.quantity }
    pub fn seller(&self) -> &Seller { &self.seller }
    pub fn reviews(&self) -> &[Review] { &self.reviews }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }
    pub fn is_in_stock(&self) -> bool { !self.quantity.is_zero() }

    /// Mean of review ratings, or zero when the product has none.
    pub fn average_rating(&self) -> Decimal {
        if self.reviews.is_empty() { return Decimal::ZERO; }
        let sum: Decimal = self.reviews.iter().map(|r| Decimal::from(r.rating.value())).sum();
        sum / Decimal::from(self.reviews.len() as u64)
    }

    pub fn update_details(&mut self, name: impl Into<String>, description: impl Into<String>,
                          price: Money, category: Category, condition: Option<Condition>,
                          image: impl Into<String>, quantity: u32) {
        self.name = name.into();
        self.description = description.into();
        self.price = price;
        self.category = category;
        self.condition = condition;
        self.image = image.into();
        self.quantity = Quantity::new(quantity);
        self.touch();
    }

    /// Appends an immutable review; the rating mean shifts accordingly.
    pub fn add_review(&mut self, review: Review) {
        let rating = review.rating.value();
        self.reviews.push(review);
        self.touch();
        self.raise_event(DomainEvent::Product(ProductEvent::Reviewed { product_id: self.id, rating }));
    }

    /// Decrements available stock at purchase time.
    pub fn reduce_stock(&mut self, qty: u32) -> Result<(), ProductError> {
        self.quantity = self.quantity.subtract(qty).ok_or(ProductError::InsufficientStock {
            requested: qty,
            available: self.quantity.value(),
        })?;
        self.touch();
        self.raise_event(DomainEvent::Product(ProductEvent::StockReduced { product_id: self.id, remaining: self.quantity.value() }));
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clothing => "clothing", Self::Books => "books", Self::Electronics => "electronics",
            Self::Phones => "phones", Self::Other => "other",
        }
    }
}

impl FromStr for Category {
    type Err = ProductError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clothing" => Ok(Self::Clothing), "books" => Ok(Self::Books),
            "electronics" => Ok(Self::Electronics), "phones" => Ok(Self::Phones),
            "other" => Ok(Self::Other),
            _ => Err(ProductError::UnknownCategory(s.to_string())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str()) }
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new", Self::LikeNew => "like-new", Self::Good => "good", Self::Fair => "fair",
        }
    }
}

impl FromStr for Condition {
    type Err = ProductError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New), "like-new" => Ok(Self::LikeNew),
            "good" => Ok(Self::Good), "fair" => Ok(Self::Fair),
            _ => Err(ProductError::UnknownCondition(s.to_string())),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str()) }
}

#[derive(Debug, Clone)]
pub enum ProductError {
    InsufficientStock { requested: u32, available: u32 },
    UnknownCategory(String),
    UnknownCondition(String),
}
impl std::error::Error for ProductError {}
impl fmt::Display for ProductError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientStock { requested, available } => write!(f, "Requested {} but only {} in stock", requested, available),
            Self::UnknownCategory(s) => write!(f, "Unknown category '{}'", s),
            Self::UnknownCondition(s) => write!(f, "Unknown condition '{}'", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seller() -> Seller {
        Seller { id: Uuid::new_v4(), name: "Chess Society".into(), kind: SellerKind::Society }
    }

    fn textbook() -> Product {
        Product::create("Linear Algebra", "Barely opened", Money::usd(Decimal::new(3599, 2)),
                        Category::Books, Some(Condition::LikeNew), "/img/la.jpg", 3, seller())
    }

    #[test]
    fn test_average_rating_empty_is_zero() {
        assert_eq!(textbook().average_rating(), Decimal::ZERO);
    }

    #[test]
    fn test_average_rating_is_mean() {
        let mut p = textbook();
        p.add_review(Review::new(Uuid::new_v4(), "amy", Rating::new(4).unwrap(), "solid"));
        p.add_review(Review::new(Uuid::new_v4(), "ben", Rating::new(5).unwrap(), "great"));
        assert_eq!(p.average_rating(), Decimal::new(45, 1)); // 4.5
    }

    #[test]
    fn test_reduce_stock() {
        let mut p = textbook();
        p.reduce_stock(2).unwrap();
        assert_eq!(p.quantity().value(), 1);
        assert!(p.reduce_stock(2).is_err());
        assert_eq!(p.quantity().value(), 1); // Unchanged on failure
    }

    #[test]
    fn test_category_round_trip() {
        for c in [Category::Clothing, Category::Books, Category::Electronics, Category::Phones, Category::Other] {
            assert_eq!(c.as_str().parse::<Category>().unwrap(), c);
        }
        assert_eq!("like-new".parse::<Condition>().unwrap(), Condition::LikeNew);
    }
}
