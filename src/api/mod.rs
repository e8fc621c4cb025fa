//! HTTP surface: router, shared state, and event publishing.

use axum::{
    routing::{get, patch, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::domain::events::DomainEvent;

pub mod auth;
pub mod orders;
pub mod products;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub nats: Option<async_nats::Client>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "campus-market"})) }))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/products", get(products::list).post(products::create))
        .route("/api/products/:id", get(products::get_one).put(products::update).delete(products::delete))
        .route("/api/products/:id/reviews", post(products::add_review))
        .route("/api/checkout", post(orders::checkout))
        .route("/api/orders", get(orders::list_mine))
        .route("/api/orders/:id/status", patch(orders::update_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Best-effort fan-out of domain events; a missing or failing broker never
/// fails the request that raised them.
pub(crate) async fn publish_events(state: &AppState, events: Vec<DomainEvent>) {
    let Some(nats) = &state.nats else { return };
    for event in events {
        match serde_json::to_vec(&event) {
            Ok(payload) => {
                if let Err(err) = nats.publish(event.subject().to_string(), payload.into()).await {
                    tracing::warn!(error = %err, subject = event.subject(), "event publish failed");
                }
            }
            Err(err) => tracing::warn!(error = %err, "event serialization failed"),
        }
    }
}
