//! Shared-secret authentication module.
//!
//! The sync endpoint is guarded by a fixed secret sent in the `secret` header.

use axum::{extract::Request, middleware::Next, response::IntoResponse, response::Response};
use subtle::ConstantTimeEq;

use crate::errors::AppError;

/// Header name for the shared secret.
pub const SECRET_HEADER: &str = "secret";

/// Secret authentication layer function that takes the expected secret as a parameter.
pub async fn secret_auth_layer(expected_secret: String, request: Request, next: Next) -> Response {
    let provided = request
        .headers()
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok());

    match provided {
        Some(secret) if constant_time_compare(secret, &expected_secret) => {
            next.run(request).await
        }
        _ => {
            tracing::warn!("Rejected request with missing or invalid secret");
            AppError::Unauthorized.into_response()
        }
    }
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
