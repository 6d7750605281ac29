//! HTTP middleware components.
//!
//! Middleware are functions that run before route handlers. Here that is
//! the API key gate guarding the dispatch endpoint.

/// API key authentication middleware
pub mod auth;
