//! HTTP request handlers.
//!
//! Handlers stay thin: they pull data out of the request (JSON body, query
//! params, headers), delegate to a service, and shape the response.

/// Completion dispatch endpoint
pub mod completions;
/// Service health endpoint
pub mod health;
/// API key issuance endpoint
pub mod keys;
