use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints any client may call, with or without a bearer token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for load balancers and monitoring.
        .route("/health", get(|| async { "ok" }))
        // GET /products
        .route("/products", get(handlers::list_products))
        // GET /products/{id}
        // 404 when the product does not exist.
        .route("/products/{id}", get(handlers::get_product))
}
