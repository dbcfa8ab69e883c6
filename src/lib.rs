use std::sync::Arc;

use axum::{Router, extract::FromRef, http::HeaderName};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod authz;
pub mod config;
pub mod error;
pub mod extract;
pub mod gate;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub mod routes;
use routes::{protected, public};

// --- Public Re-exports ---

pub use auth::TokenCodec;
pub use authz::AuthorizationService;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use gate::{GateState, RequestGate};
pub use repository::{
    InMemoryRepository, InMemoryRoleRepository, PostgresRepository, RepositoryState, RoleState,
};
pub use service::ProductService;

/// ApiDoc
///
/// OpenAPI document for the catalog, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_products, handlers::get_product, handlers::create_product,
        handlers::update_product, handlers::delete_product
    ),
    components(schemas(models::Product, models::ProductData)),
    modifiers(&BearerSecurity),
    tags(
        (name = "product-gate", description = "Product catalog API")
    )
)]
struct ApiDoc;

/// Registers the `bearer` scheme referenced by the protected handlers.
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// AppState
///
/// Shared, immutable container handed to every handler. Configuration is consumed while
/// wiring and is not kept here.
#[derive(Clone)]
pub struct AppState {
    /// The gate, which owns the codec, authorization service and product service.
    pub gate: GateState,
}

impl AppState {
    /// Wires the gate from its collaborators. The codec is keyed by `config.jwt_secret`.
    pub fn new(config: &AppConfig, products: RepositoryState, roles: RoleState) -> Self {
        let codec = Arc::new(TokenCodec::new(&config.jwt_secret));
        let gate = RequestGate::new(
            codec,
            AuthorizationService::new(roles),
            ProductService::new(products),
        );

        Self {
            gate: Arc::new(gate),
        }
    }
}

impl FromRef<AppState> for GateState {
    fn from_ref(app_state: &AppState) -> GateState {
        app_state.gate.clone()
    }
}

/// create_router
///
/// Assembles the routes, documentation, and the request-id, tracing and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(protected::protected_routes())
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the `http_request` span for each request, tagged with method, uri and the
/// `x-request-id` set by the layer above.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
