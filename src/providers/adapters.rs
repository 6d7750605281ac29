//! Wire-protocol adapters for the two upstream families.
//!
//! Both families accept the same JSON envelope (a two-turn message list plus
//! sampling parameters); they differ in headers, timeout, and how the
//! completion text is dug out of the response. Each adapter classifies
//! failures three ways:
//!
//! 1. transport failure (connect error, timeout) - generic 500
//! 2. non-success upstream status - relayed verbatim to the caller
//! 3. success status with an unusable payload - typed parse error, 500
//!
//! Response parsing never panics; every shape mismatch is converted to an
//! `AppError` at this boundary.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::completion::CompletionRequest;
use crate::providers::registry::ProviderBinding;

/// Header carrying the provider credential on the outbound call.
const CREDENTIAL_HEADER: &str = "api-key";

/// Header carrying the mesh model name on mesh-routed calls.
const MESH_MODEL_HEADER: &str = "x-ms-model-mesh-model-name";

/// Fixed sampling temperature for every upstream call.
const TEMPERATURE: f64 = 0.7;

/// Timeout for direct-chat endpoints.
const DIRECT_CHAT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for mesh-routed endpoints. This family is observed to be far
/// slower, especially when the reasoning models burn through their token
/// budget before answering.
const MESH_ROUTED_TIMEOUT: Duration = Duration::from_secs(300);

/// Adapter family labels used in parse-error messages and logs.
const DIRECT_CHAT: &str = "direct-chat";
const MESH_ROUTED: &str = "mesh-routed";

/// One reqwest client per family, built at startup and reused for every
/// call so connection pools survive across requests.
///
/// Timeouts live on the client, so every call through it inherits the
/// family's budget.
#[derive(Debug, Clone)]
pub struct HttpClients {
    direct_chat: reqwest::Client,
    mesh_routed: reqwest::Client,
}

impl HttpClients {
    /// Build both clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying TLS backend cannot be initialized.
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            direct_chat: reqwest::Client::builder()
                .timeout(DIRECT_CHAT_TIMEOUT)
                .build()?,
            mesh_routed: reqwest::Client::builder()
                .timeout(MESH_ROUTED_TIMEOUT)
                .build()?,
        })
    }
}

/// One turn of the outbound message list.
#[derive(Debug, Serialize)]
pub struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Protocol-neutral request envelope.
///
/// The same JSON body is sent to every family: a system turn, a user turn,
/// the token budget, and the fixed temperature.
#[derive(Debug, Serialize)]
pub struct ChatEnvelope {
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

impl ChatEnvelope {
    /// Build the envelope from an inbound completion request.
    pub fn from_request(request: &CompletionRequest) -> Self {
        Self {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: request.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt.clone(),
                },
            ],
            max_tokens: request.max_tokens,
            temperature: TEMPERATURE,
        }
    }
}

/// Normalized output of a successful adapter call.
#[derive(Debug)]
pub struct ParsedCompletion {
    /// Completion text extracted from the family's response shape
    pub text: String,

    /// Total token usage when the upstream reported it
    pub total_tokens: Option<u64>,
}

/// Upstream response shape shared by both families.
///
/// Every field is optional so that a missing piece becomes a code-level
/// decision (parse error, fallback) instead of a deserialization failure.
#[derive(Debug, Deserialize)]
struct UpstreamCompletion {
    #[serde(default)]
    choices: Vec<UpstreamChoice>,
    #[serde(default)]
    usage: Option<UpstreamUsage>,
}

#[derive(Debug, Deserialize)]
struct UpstreamChoice {
    #[serde(default)]
    message: Option<UpstreamMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct UpstreamMessage {
    #[serde(default)]
    content: Option<String>,

    /// Secondary field some mesh-routed models fill instead of `content`
    /// when the token budget runs out mid-reasoning
    #[serde(default)]
    reasoning_content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpstreamUsage {
    #[serde(default)]
    total_tokens: Option<u64>,
}

/// Call a direct-chat (OpenAI-style) endpoint.
///
/// Sends the envelope with the credential header and parses
/// `choices[0].message.content` plus optional `usage.total_tokens`.
pub async fn send_direct_chat(
    clients: &HttpClients,
    binding: &ProviderBinding,
    envelope: &ChatEnvelope,
) -> Result<ParsedCompletion, AppError> {
    let payload = call_upstream(
        &clients.direct_chat,
        binding,
        None,
        envelope,
        DIRECT_CHAT,
    )
    .await?;

    parse_direct_chat(payload)
}

/// Call a mesh-routed (DeepSeek-style) endpoint.
///
/// Adds the mesh model name header on top of the direct-chat headers, and
/// falls back from `content` to `reasoning_content` when extracting text.
pub async fn send_mesh_routed(
    clients: &HttpClients,
    binding: &ProviderBinding,
    mesh_model_name: &str,
    envelope: &ChatEnvelope,
) -> Result<ParsedCompletion, AppError> {
    let payload = call_upstream(
        &clients.mesh_routed,
        binding,
        Some(mesh_model_name),
        envelope,
        MESH_ROUTED,
    )
    .await?;

    parse_mesh_routed(payload)
}

/// Shared outbound call: POST the envelope, classify transport and status
/// failures, deserialize the success payload.
async fn call_upstream(
    client: &reqwest::Client,
    binding: &ProviderBinding,
    mesh_model_name: Option<&str>,
    envelope: &ChatEnvelope,
    family: &'static str,
) -> Result<UpstreamCompletion, AppError> {
    let mut request = client
        .post(binding.endpoint.clone())
        .header(CREDENTIAL_HEADER, &binding.credential)
        .json(envelope);

    if let Some(name) = mesh_model_name {
        request = request.header(MESH_MODEL_HEADER, name);
    }

    // Connect errors and timeouts are transport failures, never retried here
    let response = request.send().await.map_err(|e| {
        tracing::error!("{} call to {} failed: {}", family, binding.endpoint, e);
        AppError::UpstreamTransport(e)
    })?;

    let status = response.status();
    if !status.is_success() {
        // Relay the upstream's status and body verbatim
        let body = response.text().await.map_err(AppError::UpstreamTransport)?;
        tracing::warn!("{} upstream returned {}: {}", family, status, body);
        return Err(AppError::Upstream {
            status: status.as_u16(),
            body,
        });
    }

    // A 2xx body that is not completion-shaped JSON is an internal-fault
    // class error, not an upstream-status passthrough
    response
        .json::<UpstreamCompletion>()
        .await
        .map_err(|e| {
            tracing::error!("undecodable {} response: {}", family, e);
            AppError::UnexpectedResponseFormat(family)
        })
}

/// Extract the completion from a direct-chat response.
///
/// The first choice's `message.content` is required; its absence means the
/// upstream answered with something other than a chat completion.
fn parse_direct_chat(payload: UpstreamCompletion) -> Result<ParsedCompletion, AppError> {
    let total_tokens = payload.usage.and_then(|usage| usage.total_tokens);

    let text = payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or(AppError::UnexpectedResponseFormat(DIRECT_CHAT))?;

    Ok(ParsedCompletion { text, total_tokens })
}

/// Extract the completion from a mesh-routed response.
///
/// `content` wins when it holds non-blank text; otherwise
/// `reasoning_content` is tried. Under tight token budgets these models
/// return only the reasoning trace, so the fallback order must stay fixed.
fn parse_mesh_routed(payload: UpstreamCompletion) -> Result<ParsedCompletion, AppError> {
    let total_tokens = payload.usage.and_then(|usage| usage.total_tokens);

    let message = payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .ok_or(AppError::UnexpectedResponseFormat(MESH_ROUTED))?;

    let text = [message.content, message.reasoning_content]
        .into_iter()
        .flatten()
        .find(|candidate| !candidate.trim().is_empty())
        .ok_or(AppError::EmptyCompletion)?;

    Ok(ParsedCompletion { text, total_tokens })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn completion(value: serde_json::Value) -> UpstreamCompletion {
        serde_json::from_value(value).expect("fixture deserializes")
    }

    #[test]
    fn direct_chat_extracts_content_and_usage() {
        let parsed = parse_direct_chat(completion(json!({
            "choices": [{"message": {"content": "hi"}}],
            "usage": {"total_tokens": 5}
        })))
        .unwrap();

        assert_eq!(parsed.text, "hi");
        assert_eq!(parsed.total_tokens, Some(5));
    }

    #[test]
    fn direct_chat_tolerates_missing_usage() {
        let parsed = parse_direct_chat(completion(json!({
            "choices": [{"message": {"content": "hi"}}]
        })))
        .unwrap();

        assert_eq!(parsed.total_tokens, None);
    }

    #[test]
    fn direct_chat_rejects_missing_content() {
        let err = parse_direct_chat(completion(json!({"choices": []}))).unwrap_err();
        assert!(matches!(err, AppError::UnexpectedResponseFormat("direct-chat")));

        let err = parse_direct_chat(completion(json!({
            "choices": [{"message": {}}]
        })))
        .unwrap_err();
        assert!(matches!(err, AppError::UnexpectedResponseFormat("direct-chat")));
    }

    #[test]
    fn mesh_routed_prefers_content_over_reasoning() {
        let parsed = parse_mesh_routed(completion(json!({
            "choices": [{"message": {
                "content": "final answer",
                "reasoning_content": "chain of thought"
            }}]
        })))
        .unwrap();

        assert_eq!(parsed.text, "final answer");
    }

    #[test]
    fn mesh_routed_falls_back_to_reasoning_when_content_blank() {
        let parsed = parse_mesh_routed(completion(json!({
            "choices": [{"message": {
                "content": "",
                "reasoning_content": "thinking..."
            }}]
        })))
        .unwrap();

        assert_eq!(parsed.text, "thinking...");
    }

    #[test]
    fn mesh_routed_rejects_blank_content_and_reasoning() {
        let err = parse_mesh_routed(completion(json!({
            "choices": [{"message": {"content": "   ", "reasoning_content": ""}}]
        })))
        .unwrap_err();

        assert!(matches!(err, AppError::EmptyCompletion));
    }

    #[test]
    fn mesh_routed_rejects_missing_message() {
        let err = parse_mesh_routed(completion(json!({"choices": []}))).unwrap_err();
        assert!(matches!(err, AppError::UnexpectedResponseFormat("mesh-routed")));
    }

    #[test]
    fn envelope_carries_both_turns_and_fixed_sampling() {
        let request = CompletionRequest {
            model: "gpt-4o".to_string(),
            prompt: "Say hi".to_string(),
            system_prompt: "You are helpful.".to_string(),
            max_tokens: 150,
        };

        let envelope = serde_json::to_value(ChatEnvelope::from_request(&request)).unwrap();
        assert_eq!(
            envelope,
            json!({
                "messages": [
                    {"role": "system", "content": "You are helpful."},
                    {"role": "user", "content": "Say hi"}
                ],
                "max_tokens": 150,
                "temperature": 0.7
            })
        );
    }
}
