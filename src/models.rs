use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::error::AppError;

/// Store-assigned product identifier.
pub type ProductId = i64;

// --- Catalog Schemas ---

/// Product
///
/// A catalog record as stored in the `products` table and returned by every read or write.
/// The `id` is assigned by the store on creation and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    #[ts(type = "number")]
    pub id: ProductId,
    pub name: String,
    pub maker: String,
    pub price: i32,
    pub image_url: Option<String>,
}

impl Product {
    /// Builds the stored form of `data` under an assigned identifier.
    pub fn from_data(id: ProductId, data: ProductData) -> Self {
        Self {
            id,
            name: data.name,
            maker: data.maker,
            price: data.price,
            image_url: data.image_url,
        }
    }
}

/// ProductData
///
/// Input payload for `POST /products` and `PATCH /products/{id}`. Updates replace every field,
/// so both operations share this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductData {
    #[schema(example = "Mouse")]
    pub name: String,
    #[schema(example = "Cat World")]
    pub maker: String,
    #[schema(example = 5000)]
    pub price: i32,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Validate
///
/// Field-level checks run on a request body before it reaches the gate.
pub trait Validate {
    fn validate(&self) -> Result<(), AppError>;
}

impl Validate for ProductData {
    fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::InvalidInput("name must not be blank".to_string()));
        }
        if self.maker.trim().is_empty() {
            return Err(AppError::InvalidInput("maker must not be blank".to_string()));
        }
        if self.price < 0 {
            return Err(AppError::InvalidInput("price must not be negative".to_string()));
        }
        Ok(())
    }
}

// --- Identity Schemas ---

/// SubjectId
///
/// The identity a verified token asserts. Exists only as the payload of a decoded token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectId(pub i64);

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role
///
/// A named permission grant held by a subject, e.g. `USER`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role(String);

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}
