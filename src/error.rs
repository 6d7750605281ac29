//! Error types and HTTP error response handling.
//!
//! One enum covers every failure the gateway can produce, along with the
//! mapping from each variant to an HTTP status code and JSON body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from key store operations
/// - **Authentication Errors**: Unknown, inactive, or expired API keys
/// - **Routing Errors**: Model not present in the provider registry
/// - **Upstream Errors**: Provider answered with a non-success status
/// - **Adapter Errors**: Provider answered 2xx but the payload was unusable
/// - **Transport Errors**: Connection or timeout failure reaching a provider
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Key store operation failed (connection error, query error).
    ///
    /// Wraps any sqlx::Error via `#[from]`, so store calls can use `?`
    /// directly.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A freshly generated key collided with an existing record.
    ///
    /// Returns HTTP 409 Conflict. The caller should retry issuance; a second
    /// draw from the random source will not collide again.
    #[error("API key collision, retry issuance")]
    KeyConflict,

    /// Presented API key is missing or matches no record.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("Invalid or inactive API Key")]
    InvalidApiKey,

    /// API key record exists but has been deactivated.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("API Key is inactive")]
    InactiveApiKey,

    /// API key record exists but its expiry is in the past.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("API Key has expired")]
    ExpiredApiKey,

    /// Issuance is token-gated and the caller did not present the token.
    ///
    /// Returns HTTP 403 Forbidden. Only reachable when `ISSUER_TOKEN` is
    /// configured.
    #[error("Issuer credential missing or invalid")]
    IssuerForbidden,

    /// Requested model has no entry in the provider registry.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Model not supported")]
    ModelNotSupported,

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request; the String says what was wrong.
    #[error("Invalid request")]
    InvalidRequest(String),

    /// Upstream provider answered with a non-success status.
    ///
    /// The status code and body are relayed to the caller verbatim.
    #[error("Upstream returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Could not reach the upstream provider (connect failure or timeout).
    ///
    /// Returns HTTP 500 with a generic message; transport details stay in
    /// the logs.
    #[error("Upstream request failed: {0}")]
    UpstreamTransport(#[source] reqwest::Error),

    /// Upstream answered 2xx but the body did not have the expected
    /// completion shape.
    ///
    /// Returns HTTP 500. The str names the adapter family for the logs.
    #[error("Unexpected {0} response format")]
    UnexpectedResponseFormat(&'static str),

    /// Upstream answered 2xx but neither content field held non-blank text.
    ///
    /// Returns HTTP 500.
    #[error("No content or reasoning_content in completion response")]
    EmptyCompletion,
}

/// Convert AppError into an HTTP response.
///
/// Lets handlers return `Result<T, AppError>` and have the framework render
/// failures as proper HTTP responses.
///
/// # Response Format
///
/// Every error body has the same shape:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `InvalidApiKey` / `InactiveApiKey` / `ExpiredApiKey` / `IssuerForbidden` → 403 Forbidden
/// - `ModelNotSupported` → 404 Not Found
/// - `InvalidRequest` → 400 Bad Request
/// - `KeyConflict` → 409 Conflict
/// - `Upstream` → the upstream's own status, body relayed as the message
/// - `Database` / `UpstreamTransport` / `UnexpectedResponseFormat` / `EmptyCompletion` → 500
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map each error variant to (HTTP status, error code, message)
        let (status, code, message) = match self {
            AppError::InvalidApiKey => (StatusCode::FORBIDDEN, "invalid_api_key", self.to_string()),
            AppError::InactiveApiKey => {
                (StatusCode::FORBIDDEN, "inactive_api_key", self.to_string())
            }
            AppError::ExpiredApiKey => {
                (StatusCode::FORBIDDEN, "expired_api_key", self.to_string())
            }
            AppError::IssuerForbidden => {
                (StatusCode::FORBIDDEN, "issuer_forbidden", self.to_string())
            }
            AppError::ModelNotSupported => {
                (StatusCode::NOT_FOUND, "model_not_supported", self.to_string())
            }
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::KeyConflict => (StatusCode::CONFLICT, "key_conflict", self.to_string()),
            AppError::Upstream { status, ref body } => (
                // Relay the upstream status unless it is not a valid code
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                "upstream_error",
                body.clone(),
            ),
            AppError::UpstreamTransport(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "upstream_unreachable",
                "Failed to reach the upstream provider".to_string(),
            ),
            AppError::UnexpectedResponseFormat(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "unexpected_response_format",
                self.to_string(),
            ),
            AppError::EmptyCompletion => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "empty_completion",
                self.to_string(),
            ),
            // Store details never leak to clients
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
