//! Upstream provider plumbing.
//!
//! `registry` maps model identifiers to static provider bindings;
//! `adapters` turns the neutral request envelope into each family's HTTP
//! contract and parses the family's response shape back out.

pub mod adapters;
pub mod registry;
