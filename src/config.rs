//! Application configuration management.
//!
//! All configuration comes from environment variables, deserialized into a
//! type-safe struct by the `envy` crate. Provider credentials and endpoint
//! URLs live here too, so nothing secret is compiled in.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `OPENAI_API_KEY` (required): credential sent to direct-chat (OpenAI-style) endpoints
/// - `DEEPSEEK_API_KEY` (required): credential sent to mesh-routed (DeepSeek-style) endpoints
/// - `GPT4O_ENDPOINT`, `GPT4O_MINI_ENDPOINT`, `GPT41_ENDPOINT` (required): direct-chat upstream URLs
/// - `DEEPSEEK_R1_ENDPOINT`, `DEEPSEEK_V3_ENDPOINT` (required): mesh-routed upstream URLs
/// - `ISSUER_TOKEN` (optional): when set, key issuance requires `Authorization: Bearer <token>`
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    /// Shared credential for every direct-chat model
    pub openai_api_key: String,

    /// Shared credential for every mesh-routed model
    pub deepseek_api_key: String,

    pub gpt4o_endpoint: String,
    pub gpt4o_mini_endpoint: String,
    pub gpt41_endpoint: String,
    pub deepseek_r1_endpoint: String,
    pub deepseek_v3_endpoint: String,

    /// Optional gate for the key issuance endpoint.
    ///
    /// The issuance route is open by default. Setting this token restricts
    /// it to callers that present `Authorization: Bearer <token>`.
    #[serde(default)]
    pub issuer_token: Option<String>,
}

/// Port used when SERVER_PORT is not set.
fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Reads an optional `.env` file first, then deserializes the process
    /// environment into a `Config`.
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable (e.g. DATABASE_URL or one
    /// of the endpoint URLs) is missing, or a value cannot be parsed into
    /// the expected type.
    pub fn from_env() -> Result<Self, envy::Error> {
        // A missing .env file is fine; deployed environments set real vars
        dotenvy::dotenv().ok();

        // Field names map to upper-case vars: database_url -> DATABASE_URL
        envy::from_env::<Config>()
    }
}
