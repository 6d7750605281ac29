//! Shared application state.
//!
//! Everything in here is read-only after startup: the store pool, the
//! provider registry, and the per-family HTTP clients. Handlers receive a
//! clone via axum's `State` extractor; clones are cheap (pool and clients
//! are handles, the registry sits behind an `Arc`).

use std::sync::Arc;

use crate::{
    db::DbPool,
    providers::{adapters::HttpClients, registry::ProviderRegistry},
};

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Key store connection pool
    pub pool: DbPool,

    /// Immutable model-to-provider mapping
    pub registry: Arc<ProviderRegistry>,

    /// Reusable upstream HTTP clients (one per protocol family)
    pub http: HttpClients,

    /// Optional bearer token gating key issuance
    pub issuer_token: Option<String>,
}
