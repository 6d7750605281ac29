//! Data models for persisted records and API request/response types.

/// API key record and issuance response
pub mod api_key;
/// Completion request/response wire types
pub mod completion;
