//! Completion request/response wire types.
//!
//! This module defines:
//! - `CompletionRequest`: the provider-agnostic request body
//! - `CompletionResponse`: the normalized response returned to clients
//!
//! Neither type is persisted; both live only for the duration of one call.

use serde::{Deserialize, Serialize};

/// Provider-agnostic completion request.
///
/// # JSON Example
///
/// ```json
/// {
///   "model": "gpt-4o",
///   "prompt": "Summarize this paragraph...",
///   "system_prompt": "You are a helpful assistant.",
///   "max_tokens": 200
/// }
/// ```
///
/// # Validation
///
/// - `model`: required; must resolve in the provider registry (404 otherwise)
/// - `prompt` / `system_prompt`: required strings
/// - `max_tokens`: optional, defaults to 150, must be positive
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier, e.g. "gpt-4o" or "deepseek-r1"
    pub model: String,

    /// User turn content
    pub prompt: String,

    /// System turn content
    pub system_prompt: String,

    /// Completion budget forwarded to the upstream provider
    ///
    /// The mesh-routed models are known to need generous budgets before
    /// they produce a final answer rather than only a reasoning trace.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

/// Default token budget when the request omits `max_tokens`.
fn default_max_tokens() -> u32 {
    150
}

/// Normalized completion response, identical for every upstream family.
///
/// # JSON Example
///
/// ```json
/// {
///   "model": "gpt-4o",
///   "response": "Here is the summary...",
///   "total_tokens": 57
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    /// Echo of the requested model identifier
    pub model: String,

    /// Completion text extracted by the wire-protocol adapter
    pub response: String,

    /// Token usage as reported by the upstream; null when the upstream
    /// response carried no usage block
    pub total_tokens: Option<u64>,
}
