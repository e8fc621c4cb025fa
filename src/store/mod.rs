//! Postgres repositories. Rows stay here; handlers and the domain see only
//! domain types.
pub mod orders;
pub mod products;
pub mod users;
