use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::SubjectId,
};

/// Claims
///
/// Payload carried inside an access token. Tokens are issued elsewhere and only need to name
/// the subject; no expiry or issuer claims are required.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i64,
}

/// TokenCodec
///
/// Verifies HS256-signed bearer tokens and extracts the subject they assert. Holds only the
/// decoding key, so it is cheap to share and safe to call concurrently.
pub struct TokenCodec {
    key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// decode
    ///
    /// Returns the subject of a verified token. Empty, malformed, tampered, or foreign-key
    /// tokens all fail with the same `InvalidToken`; the cause is only logged.
    pub fn decode(&self, token: &str) -> AppResult<SubjectId> {
        if token.trim().is_empty() {
            return Err(AppError::InvalidToken);
        }

        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| SubjectId(data.claims.user_id))
            .map_err(|e| {
                tracing::debug!(kind = ?e.kind(), "token rejected");
                AppError::InvalidToken
            })
    }
}

/// Bearer
///
/// The raw bearer token of a request, if any. Never rejects: an absent header, or one that
/// does not use the `Bearer` scheme, yields `Bearer(None)` and the gate decides what that means
/// for the operation at hand. The scheme name is matched case-insensitively (RFC 7235).
#[derive(Debug, Clone, Default)]
pub struct Bearer(pub Option<String>);

impl Bearer {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim_start().split_once(' '))
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
            .map(|(_, token)| token.trim().to_string());
        Bearer(token)
    }

    pub fn token(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Bearer::from_headers(&parts.headers))
    }
}
