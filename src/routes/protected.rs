use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{patch, post},
};

/// Protected Router Module
///
/// Endpoints that mutate the catalog. No middleware guards this router: each handler passes
/// the request's bearer token to the `RequestGate`, which looks up the operation in its
/// policy table. Every rejection, including a missing role, surfaces as 401.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        // POST /products
        // Requires the `USER` role.
        .route("/products", post(handlers::create_product))
        // PATCH/DELETE /products/{id}
        // Any verified token.
        .route(
            "/products/{id}",
            patch(handlers::update_product).delete(handlers::delete_product),
        )
}
