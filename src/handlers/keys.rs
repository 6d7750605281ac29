//! API key issuance handler.
//!
//! Implements `POST /auth/generate-api-key/`. The endpoint is public by
//! default (the key is the product of this call, so there is nothing to
//! authenticate with yet); deployments that want it closed set
//! `ISSUER_TOKEN` and the handler then demands a matching bearer token.

use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
};
use serde::Deserialize;

use crate::{
    error::AppError, models::api_key::IssuedKeyResponse, services::key_service, state::AppState,
};

/// Query parameters for key issuance.
///
/// # Example
///
/// `POST /auth/generate-api-key/?expiration_days=7`
#[derive(Debug, Deserialize)]
pub struct IssueKeyParams {
    /// Days until the new key expires (defaults to 30; 0 is allowed and
    /// yields a key that is already expired)
    #[serde(default = "default_expiration_days")]
    pub expiration_days: u32,
}

/// Default expiry horizon when the caller does not specify one.
fn default_expiration_days() -> u32 {
    30
}

/// Issue a new API key.
///
/// # Endpoint
///
/// `POST /auth/generate-api-key/`
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "api_key": "3f9c2d...",
///   "expires_at": "2026-02-15T10:30:00Z"
/// }
/// ```
///
/// This response is the only time the key is relayed to the caller.
///
/// # Errors
///
/// - **403**: `ISSUER_TOKEN` is configured and the caller's
///   `Authorization: Bearer` token does not match
/// - **409**: the generated key collided with an existing record (retry)
/// - **500**: store failure
pub async fn generate_api_key(
    State(state): State<AppState>,
    Query(params): Query<IssueKeyParams>,
    headers: HeaderMap,
) -> Result<Json<IssuedKeyResponse>, AppError> {
    // Optional issuance gate; a no-op unless ISSUER_TOKEN is configured
    if let Some(expected) = &state.issuer_token {
        let presented = headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        if presented != Some(expected.as_str()) {
            return Err(AppError::IssuerForbidden);
        }
    }

    let record = key_service::issue(&state.pool, params.expiration_days).await?;
    tracing::info!("Issued API key expiring {:?}", record.expires_at);

    Ok(Json(record.into()))
}
