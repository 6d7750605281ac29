//! API Key model for authentication.
//!
//! API keys gate access to the completion endpoint. The opaque key string is
//! the primary identifier; there is no surrogate id.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Represents an API key record from the database.
///
/// # Database Table
///
/// Maps to the `api_keys` table with columns:
/// - `key`: the opaque key string itself (primary key)
/// - `is_active`: whether the key is currently valid
/// - `created_at`: when the key was issued
/// - `expires_at`: optional expiry; NULL means the key never expires
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiKey {
    /// The opaque key string (64 hex characters, 32 bytes of randomness)
    ///
    /// Clients present this value in the `api-key` request header.
    /// Lookups are exact string matches against this column.
    pub key: String,

    /// Whether this API key is currently active
    ///
    /// Issuance always sets this to true. Deactivation is an administrative
    /// action outside the service; the flag is still honored on every
    /// request.
    pub is_active: bool,

    /// Timestamp when this API key was issued (immutable)
    pub created_at: DateTime<Utc>,

    /// Expiry timestamp; NULL means the key never expires
    ///
    /// A key whose expiry is in the past is rejected even while
    /// `is_active` is true.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Response body returned by the issuance endpoint.
///
/// # JSON Example
///
/// ```json
/// {
///   "api_key": "3f9c2d...64 hex chars...",
///   "expires_at": "2026-01-15T10:30:00Z"
/// }
/// ```
///
/// This is the only time the key is relayed to the caller; afterwards it is
/// only ever matched, never listed.
#[derive(Debug, Serialize)]
pub struct IssuedKeyResponse {
    /// The newly generated key string
    pub api_key: String,

    /// When the key stops validating
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<ApiKey> for IssuedKeyResponse {
    fn from(record: ApiKey) -> Self {
        Self {
            api_key: record.key,
            expires_at: record.expires_at,
        }
    }
}
