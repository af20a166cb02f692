//! Request-level middleware

use crate::core::error::{BizError, RequestError};
use axum::extract::{Request, State};
use axum::http::{Method, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::time::Duration;

/// Abort a request that runs longer than the configured timeout
///
/// The timed-out request is answered with a 408 error envelope.
pub async fn request_timeout(
    State(timeout): State<Duration>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match tokio::time::timeout(timeout, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(%method, %path, timeout_secs = timeout.as_secs(), "Request timed out");
            BizError::from(RequestError::Timeout).into_response()
        }
    }
}

/// Fallback for routes no resource handles
pub async fn route_not_found(method: Method, uri: Uri) -> BizError {
    RequestError::RouteNotFound {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
    .into()
}
