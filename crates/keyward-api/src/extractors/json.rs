//! `ValidJson` extractor: deserializes a JSON body and runs `validator` rules.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use keyward_core::error::AppError;

use crate::error::ApiError;

/// A JSON body that passed its validation rules.
///
/// Malformed JSON and failed rules both surface as `VALIDATION_ERROR`.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError(AppError::validation(rejection.body_text())))?;

        value
            .validate()
            .map_err(|errors| ApiError(AppError::validation(describe(&errors))))?;

        Ok(Self(value))
    }
}

/// Collapse validation errors into one stable message.
fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .map(|e| {
            e.message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid value ({})", e.code))
        })
        .collect();
    messages.sort();
    messages.dedup();
    messages.join("; ")
}
