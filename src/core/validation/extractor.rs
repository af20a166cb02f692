//! Axum extractor for validated request bodies
//!
//! `Validated<T>` reads the body, parses it as JSON and runs the payload's
//! `validator` rules. Failures are returned as [`BizError`] so they render
//! with the usual error envelope.

use crate::core::error::{BizError, ValidationError};
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Axum extractor that parses and validates a JSON body
///
/// An empty body is read as `{}` so that missing fields are reported by the
/// validation rules rather than as a parse failure.
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create_company(
///     State(state): State<AppState>,
///     Validated(payload): Validated<CreateCompanyRequest>,
/// ) -> BizResult<(StatusCode, Json<Value>)> {
///     // payload has passed CreateCompanyRequest's rules
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Validated<T>(pub T);

impl<T> Validated<T> {
    /// Get the inner payload
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Validated<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = BizError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ValidationError::InvalidJson {
                message: e.body_text(),
            })?;

        let payload = parse_body::<T>(&body)?;
        payload.validate()?;

        Ok(Validated(payload))
    }
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, BizError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_slice(b"{}")?);
    }
    Ok(serde_json::from_slice(body)?)
}
