use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::{error::AppError, models::Validate};

/// ValidatedJson
///
/// JSON body extractor that also runs the payload's field checks. Syntax errors, missing or
/// mistyped fields, and failed checks all reject with `AppError::InvalidInput` (400), before
/// the handler or the gate runs.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;

        value.validate()?;
        Ok(ValidatedJson(value))
    }
}
