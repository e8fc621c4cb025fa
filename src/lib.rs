//! Campus Market - Campus Marketplace Platform
//!
//! A small marketplace for students and societies: product catalog with
//! reviews, a session cart, simulated checkout, and order fulfilment.
//!
//! ## Features
//! - Product catalog with seller and condition metadata
//! - Shopping cart with snapshot pricing
//! - Checkout producing immutable orders (flat 10% tax, free shipping)
//! - Order lifecycle: pending -> shipped -> delivered, cancel from pending
//! - Session auth with student/society/admin roles

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod store;

pub use error::AppError;
