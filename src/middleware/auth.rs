//! API key authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the API key from the `api-key` header
//! 2. Validate it against the key store (existence, activity, expiry)
//! 3. Reject unauthorized requests with HTTP 403
//!
//! Validation is read-only and re-runs on every request; validity is never
//! cached across requests. The gate runs before the dispatcher, so a bad
//! key costs one store lookup and no upstream I/O.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{db::DbPool, error::AppError, services::key_service};

/// Request header clients use to present their key.
pub const API_KEY_HEADER: &str = "api-key";

/// API key authentication middleware function.
///
/// # Flow
///
/// 1. Read the `api-key` header; a missing or non-UTF-8 header is rejected
///    the same way as an unknown key
/// 2. Look the key up and check `is_active` and `expires_at`
/// 3. On success, call the next handler in the chain
///
/// # Errors
///
/// - `InvalidApiKey` (403): header missing or no matching record
/// - `InactiveApiKey` (403): record deactivated
/// - `ExpiredApiKey` (403): record past its expiry
pub async fn auth_middleware(
    State(pool): State<DbPool>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented_key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::InvalidApiKey)?;

    key_service::validate(&pool, presented_key).await?;

    Ok(next.run(request).await)
}
