//! Request dispatcher.
//!
//! Routes one normalized completion request to its resolved provider and
//! returns a normalized result. All vendor differences (headers, timeout,
//! response shape) live behind the adapter selected by the binding's
//! protocol family; the dispatcher itself never inspects model-name strings
//! beyond the registry lookup.

use crate::{
    error::AppError,
    models::completion::{CompletionRequest, CompletionResponse},
    providers::{
        adapters::{self, ChatEnvelope, HttpClients},
        registry::{ProtocolFamily, ProviderRegistry},
    },
};

/// Dispatch a completion request to its upstream provider.
///
/// # Process
///
/// 1. Resolve the model in the registry; unknown models fail here, before
///    any outbound I/O
/// 2. Build the protocol-neutral envelope (system turn, user turn,
///    max_tokens, fixed temperature)
/// 3. Invoke the adapter for the binding's protocol family
/// 4. Wrap the parsed completion in the normalized response
///
/// At most one upstream attempt is made per inbound request; adapter
/// failures are propagated, never retried.
///
/// # Errors
///
/// - `ModelNotSupported`: model has no registry entry
/// - `Upstream`: provider answered with a non-success status (relayed)
/// - `UpstreamTransport`: provider unreachable or timed out
/// - `UnexpectedResponseFormat` / `EmptyCompletion`: provider answered 2xx
///   with an unusable payload
pub async fn dispatch(
    registry: &ProviderRegistry,
    clients: &HttpClients,
    request: &CompletionRequest,
) -> Result<CompletionResponse, AppError> {
    let binding = registry
        .resolve(&request.model)
        .ok_or(AppError::ModelNotSupported)?;

    let envelope = ChatEnvelope::from_request(request);

    let parsed = match &binding.family {
        ProtocolFamily::DirectChat => {
            adapters::send_direct_chat(clients, binding, &envelope).await?
        }
        ProtocolFamily::MeshRouted { mesh_model_name } => {
            adapters::send_mesh_routed(clients, binding, mesh_model_name, &envelope).await?
        }
    };

    Ok(CompletionResponse {
        model: request.model.clone(),
        response: parsed.text,
        total_tokens: parsed.total_tokens,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_pointing_at(base: &str) -> Config {
        Config {
            database_url: "postgres://unused".to_string(),
            server_port: 3000,
            openai_api_key: "openai-credential".to_string(),
            deepseek_api_key: "deepseek-credential".to_string(),
            gpt4o_endpoint: format!("{base}/openai/gpt-4o/chat/completions"),
            gpt4o_mini_endpoint: format!("{base}/openai/gpt-4o-mini/chat/completions"),
            gpt41_endpoint: format!("{base}/openai/gpt-4.1/chat/completions"),
            deepseek_r1_endpoint: format!("{base}/mesh/deepseek-r1/chat/completions"),
            deepseek_v3_endpoint: format!("{base}/mesh/deepseek-v3/chat/completions"),
            issuer_token: None,
        }
    }

    fn request_for(model: &str) -> CompletionRequest {
        CompletionRequest {
            model: model.to_string(),
            prompt: "Say hi".to_string(),
            system_prompt: "You are helpful.".to_string(),
            max_tokens: 150,
        }
    }

    #[tokio::test]
    async fn unknown_model_fails_before_any_upstream_call() {
        let server = MockServer::start().await;
        let registry = ProviderRegistry::from_config(&config_pointing_at(&server.uri())).unwrap();
        let clients = HttpClients::new().unwrap();

        let err = dispatch(&registry, &clients, &request_for("unknown-model"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ModelNotSupported));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn direct_chat_success_is_normalized() {
        let server = MockServer::start().await;
        let registry = ProviderRegistry::from_config(&config_pointing_at(&server.uri())).unwrap();
        let clients = HttpClients::new().unwrap();

        Mock::given(method("POST"))
            .and(path("/openai/gpt-4o/chat/completions"))
            .and(header("api-key", "openai-credential"))
            .and(body_partial_json(json!({
                "messages": [
                    {"role": "system", "content": "You are helpful."},
                    {"role": "user", "content": "Say hi"}
                ],
                "max_tokens": 150,
                "temperature": 0.7
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "hi"}}],
                "usage": {"total_tokens": 5}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = dispatch(&registry, &clients, &request_for("gpt-4o"))
            .await
            .unwrap();

        assert_eq!(result.model, "gpt-4o");
        assert_eq!(result.response, "hi");
        assert_eq!(result.total_tokens, Some(5));
    }

    #[tokio::test]
    async fn mesh_routed_call_carries_mesh_model_header_and_falls_back() {
        let server = MockServer::start().await;
        let registry = ProviderRegistry::from_config(&config_pointing_at(&server.uri())).unwrap();
        let clients = HttpClients::new().unwrap();

        Mock::given(method("POST"))
            .and(path("/mesh/deepseek-r1/chat/completions"))
            .and(header("api-key", "deepseek-credential"))
            .and(header("x-ms-model-mesh-model-name", "DeepSeek-R1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {
                    "content": "",
                    "reasoning_content": "thinking..."
                }}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = dispatch(&registry, &clients, &request_for("deepseek-r1"))
            .await
            .unwrap();

        assert_eq!(result.response, "thinking...");
        assert_eq!(result.total_tokens, None);
    }

    #[tokio::test]
    async fn mesh_routed_blank_fields_surface_as_empty_completion() {
        let server = MockServer::start().await;
        let registry = ProviderRegistry::from_config(&config_pointing_at(&server.uri())).unwrap();
        let clients = HttpClients::new().unwrap();

        Mock::given(method("POST"))
            .and(path("/mesh/deepseek-r1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "", "reasoning_content": ""}}]
            })))
            .mount(&server)
            .await;

        let err = dispatch(&registry, &clients, &request_for("deepseek-r1"))
            .await
            .unwrap_err();

        // Internal-fault class, not an upstream-status passthrough
        assert!(matches!(err, AppError::EmptyCompletion));
    }

    #[tokio::test]
    async fn upstream_status_and_body_are_relayed_verbatim() {
        let server = MockServer::start().await;
        let registry = ProviderRegistry::from_config(&config_pointing_at(&server.uri())).unwrap();
        let clients = HttpClients::new().unwrap();

        Mock::given(method("POST"))
            .and(path("/openai/gpt-4o/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = dispatch(&registry, &clients, &request_for("gpt-4o"))
            .await
            .unwrap_err();

        match err {
            AppError::Upstream { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn successful_status_with_wrong_shape_is_an_internal_fault() {
        let server = MockServer::start().await;
        let registry = ProviderRegistry::from_config(&config_pointing_at(&server.uri())).unwrap();
        let clients = HttpClients::new().unwrap();

        Mock::given(method("POST"))
            .and(path("/openai/gpt-4o/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list", "data": []
            })))
            .mount(&server)
            .await;

        let err = dispatch(&registry, &clients, &request_for("gpt-4o"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::UnexpectedResponseFormat("direct-chat")
        ));
    }
}
