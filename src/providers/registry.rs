//! Static model-to-provider registry.
//!
//! The registry is built once at startup from configuration and never
//! changes afterwards. Every supported model maps to a `ProviderBinding`:
//! the upstream endpoint, the credential sent with the call, and which
//! wire-protocol family the endpoint speaks.

use std::collections::HashMap;

use url::Url;

use crate::config::Config;

/// Wire-protocol family of an upstream endpoint.
///
/// Exactly two families exist. Keeping them as enum variants (instead of
/// string-prefix checks on the model name) means the dispatcher selects an
/// adapter by matching, and a new family cannot be added without the
/// compiler pointing at every match site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolFamily {
    /// OpenAI-style chat endpoint. Moderate timeout, no extra headers.
    DirectChat,

    /// DeepSeek-style endpoint behind a model mesh. Needs the mesh model
    /// name in a dedicated header and a much longer timeout.
    MeshRouted {
        /// Value for the `x-ms-model-mesh-model-name` header,
        /// e.g. "DeepSeek-R1"
        mesh_model_name: String,
    },
}

/// Static configuration tuple for one supported model.
#[derive(Debug, Clone)]
pub struct ProviderBinding {
    /// Upstream endpoint the completion call is POSTed to
    pub endpoint: Url,

    /// Credential sent in the `api-key` header of the upstream call
    pub credential: String,

    /// Which adapter handles this endpoint
    pub family: ProtocolFamily,
}

/// Immutable mapping from model identifier to provider binding.
#[derive(Debug)]
pub struct ProviderRegistry {
    bindings: HashMap<String, ProviderBinding>,
}

impl ProviderRegistry {
    /// Build the registry from configuration.
    ///
    /// # Entries
    ///
    /// - `gpt-4o`, `gpt-4o-mini`, `gpt-4.1`: direct-chat, shared OpenAI
    ///   credential
    /// - `deepseek-r1`, `deepseek-v3`: mesh-routed, shared DeepSeek
    ///   credential, per-entry mesh model name
    ///
    /// # Errors
    ///
    /// Returns an error if any configured endpoint is not a valid URL.
    /// Catching this at startup keeps a typo in the environment from
    /// surfacing as a per-request failure later.
    pub fn from_config(config: &Config) -> Result<Self, url::ParseError> {
        let mut bindings = HashMap::new();

        // Direct-chat entries share the OpenAI credential
        for (model, endpoint) in [
            ("gpt-4o", &config.gpt4o_endpoint),
            ("gpt-4o-mini", &config.gpt4o_mini_endpoint),
            ("gpt-4.1", &config.gpt41_endpoint),
        ] {
            bindings.insert(
                model.to_string(),
                ProviderBinding {
                    endpoint: Url::parse(endpoint)?,
                    credential: config.openai_api_key.clone(),
                    family: ProtocolFamily::DirectChat,
                },
            );
        }

        // Mesh-routed entries share the DeepSeek credential but each carries
        // its own mesh model name
        for (model, endpoint, mesh_model_name) in [
            ("deepseek-r1", &config.deepseek_r1_endpoint, "DeepSeek-R1"),
            ("deepseek-v3", &config.deepseek_v3_endpoint, "DeepSeek-V3"),
        ] {
            bindings.insert(
                model.to_string(),
                ProviderBinding {
                    endpoint: Url::parse(endpoint)?,
                    credential: config.deepseek_api_key.clone(),
                    family: ProtocolFamily::MeshRouted {
                        mesh_model_name: mesh_model_name.to_string(),
                    },
                },
            );
        }

        Ok(Self { bindings })
    }

    /// Look up the binding for a model identifier.
    ///
    /// Returns `None` for unknown models; the dispatcher surfaces that as a
    /// client-facing 404, never a server fault.
    pub fn resolve(&self, model: &str) -> Option<&ProviderBinding> {
        self.bindings.get(model)
    }

    /// Number of registered models (startup log line).
    pub fn model_count(&self) -> usize {
        self.bindings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://unused".to_string(),
            server_port: 3000,
            openai_api_key: "openai-credential".to_string(),
            deepseek_api_key: "deepseek-credential".to_string(),
            gpt4o_endpoint: "https://openai.example.com/gpt-4o".to_string(),
            gpt4o_mini_endpoint: "https://openai.example.com/gpt-4o-mini".to_string(),
            gpt41_endpoint: "https://openai.example.com/gpt-4.1".to_string(),
            deepseek_r1_endpoint: "https://mesh.example.com/deepseek-r1".to_string(),
            deepseek_v3_endpoint: "https://mesh.example.com/deepseek-v3".to_string(),
            issuer_token: None,
        }
    }

    #[test]
    fn resolves_direct_chat_models_with_shared_credential() {
        let registry = ProviderRegistry::from_config(&test_config()).unwrap();

        for model in ["gpt-4o", "gpt-4o-mini", "gpt-4.1"] {
            let binding = registry.resolve(model).expect(model);
            assert_eq!(binding.family, ProtocolFamily::DirectChat);
            assert_eq!(binding.credential, "openai-credential");
        }
    }

    #[test]
    fn resolves_mesh_routed_models_with_mesh_names() {
        let registry = ProviderRegistry::from_config(&test_config()).unwrap();

        let r1 = registry.resolve("deepseek-r1").unwrap();
        assert_eq!(r1.credential, "deepseek-credential");
        assert_eq!(
            r1.family,
            ProtocolFamily::MeshRouted {
                mesh_model_name: "DeepSeek-R1".to_string()
            }
        );

        let v3 = registry.resolve("deepseek-v3").unwrap();
        assert_eq!(
            v3.family,
            ProtocolFamily::MeshRouted {
                mesh_model_name: "DeepSeek-V3".to_string()
            }
        );
    }

    #[test]
    fn unknown_model_resolves_to_none() {
        let registry = ProviderRegistry::from_config(&test_config()).unwrap();
        assert!(registry.resolve("claude-3").is_none());
        assert!(registry.resolve("").is_none());
        assert_eq!(registry.model_count(), 5);
    }

    #[test]
    fn invalid_endpoint_url_is_rejected_at_startup() {
        let mut config = test_config();
        config.gpt41_endpoint = "not a url".to_string();
        assert!(ProviderRegistry::from_config(&config).is_err());
    }
}
