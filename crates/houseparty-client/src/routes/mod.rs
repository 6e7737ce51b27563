mod checkout;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use checkout::{CheckoutOutcome, CheckoutPage};

async fn health() -> &'static str {
    "ok"
}

/// Routes served to the browser while a checkout is open.
pub fn create_router(page: Arc<CheckoutPage>) -> Router {
    Router::new()
        .route("/", get(checkout::page))
        .route("/complete", post(checkout::complete))
        .route("/dismiss", post(checkout::dismiss))
        .route("/health", get(health))
        .with_state(page)
        .layer(TraceLayer::new_for_http())
}
