//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;

pub use product::{Product, ProductError, Category, Condition, Review, Seller, SellerKind};
pub use order::{Order, OrderError, OrderStatus, OrderItem, OrderRecord, ShippingAddress, CheckoutError, CheckoutSummary};
pub use cart::{Cart, CartLine};
