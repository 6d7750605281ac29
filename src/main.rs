//! LLM Gateway - Main Application Entry Point
//!
//! This is a gateway server that sits between client applications and
//! multiple third-party LLM providers. It issues and validates opaque API
//! keys, accepts provider-agnostic completion requests, routes them to the
//! right upstream with provider-specific credentials and headers, and
//! returns a normalized response whichever upstream answered.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Key Store**: PostgreSQL with sqlx (async queries)
//! - **Authentication**: opaque API keys presented in the `api-key` header
//! - **Upstreams**: two wire-protocol families (direct-chat, mesh-routed)
//!   behind a static provider registry
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create the key store connection pool and run migrations
//! 3. Build the provider registry and the upstream HTTP clients
//! 4. Build the HTTP router with routes and the auth middleware
//! 5. Start the server on the configured port

mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod providers;
mod services;
mod state;

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging, filtered by RUST_LOG (default "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Key store pool plus schema migrations
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    // Build the static provider registry (validates every endpoint URL)
    let registry = Arc::new(providers::registry::ProviderRegistry::from_config(&config)?);
    tracing::info!("Provider registry built with {} models", registry.model_count());

    // Build the per-family upstream HTTP clients, reused across requests
    let http = providers::adapters::HttpClients::new()?;

    let state = state::AppState {
        pool: pool.clone(),
        registry,
        http,
        issuer_token: config.issuer_token.clone(),
    };

    // Protected routes: every request passes the API key gate first
    let protected_routes = Router::new()
        .route(
            "/api/process/",
            post(handlers::completions::process_completion),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            pool.clone(),
            middleware::auth::auth_middleware,
        ));

    let app = Router::new()
        // Public routes: health probe and key issuance
        .route("/health", get(handlers::health::health_check))
        .route(
            "/auth/generate-api-key/",
            post(handlers::keys::generate_api_key),
        )
        .merge(protected_routes)
        // Request tracing for observability
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Serves forever, one tokio task per inbound request
    axum::serve(listener, app).await?;

    Ok(())
}
