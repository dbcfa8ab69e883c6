use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    auth::Bearer,
    error::AppResult,
    extract::ValidatedJson,
    gate::GateState,
    models::{Product, ProductData, ProductId},
};

// --- Handlers ---
//
// Each handler hands the caller's bearer token to the gate, which applies the operation's
// policy before touching the catalog.

/// list_products
///
/// [Public Route] Lists every product.
#[utoipa::path(
    get,
    path = "/products",
    responses((status = 200, description = "All products", body = [Product]))
)]
pub async fn list_products(
    State(gate): State<GateState>,
    bearer: Bearer,
) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(gate.list(&bearer).await?))
}

/// get_product
///
/// [Public Route] Retrieves a single product by id.
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = i64, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Found", body = Product),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_product(
    State(gate): State<GateState>,
    bearer: Bearer,
    Path(id): Path<ProductId>,
) -> AppResult<Json<Product>> {
    Ok(Json(gate.get(&bearer, id).await?))
}

/// create_product
///
/// [Protected Route] Registers a new product. Requires a valid token whose subject holds
/// the `USER` role.
#[utoipa::path(
    post,
    path = "/products",
    request_body = ProductData,
    responses(
        (status = 201, description = "Created", body = Product),
        (status = 400, description = "Invalid attributes"),
        (status = 401, description = "Missing, invalid, or under-privileged token")
    ),
    security(("bearer" = []))
)]
pub async fn create_product(
    State(gate): State<GateState>,
    bearer: Bearer,
    ValidatedJson(payload): ValidatedJson<ProductData>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = gate.create(&bearer, payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// update_product
///
/// [Protected Route] Replaces every field of an existing product. Any valid token.
#[utoipa::path(
    patch,
    path = "/products/{id}",
    params(("id" = i64, Path, description = "Product ID")),
    request_body = ProductData,
    responses(
        (status = 200, description = "Updated", body = Product),
        (status = 400, description = "Invalid attributes"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer" = []))
)]
pub async fn update_product(
    State(gate): State<GateState>,
    bearer: Bearer,
    Path(id): Path<ProductId>,
    ValidatedJson(payload): ValidatedJson<ProductData>,
) -> AppResult<Json<Product>> {
    Ok(Json(gate.update(&bearer, id, payload).await?))
}

/// delete_product
///
/// [Protected Route] Removes a product. Any valid token. Responds 200 with an empty body.
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = i64, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_product(
    State(gate): State<GateState>,
    bearer: Bearer,
    Path(id): Path<ProductId>,
) -> AppResult<StatusCode> {
    gate.delete(&bearer, id).await?;
    Ok(StatusCode::OK)
}
