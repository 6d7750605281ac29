//! Business logic services.
//!
//! Services contain core gateway logic separated from HTTP handlers:
//! key issuance/validation against the store, and request dispatch to the
//! upstream providers.

pub mod dispatch_service;
pub mod key_service;
