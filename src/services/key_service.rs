//! API key lifecycle: generation, issuance, validation.
//!
//! Keys are opaque 64-character hex strings drawn from a cryptographically
//! secure source. The store holds one row per key; issuance is the only
//! write this service performs, validation is read-only.

use chrono::{Duration, Utc};

use crate::{db::DbPool, error::AppError, models::api_key::ApiKey};

/// Generate a fresh API key string.
///
/// # Output
///
/// 64 hex characters (32 random bytes). URL-safe and effectively
/// unguessable; collisions are not checked here, the primary key on the
/// table catches the astronomically unlikely duplicate.
pub fn generate_key() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// Issue a new API key valid for `expiration_days` days.
///
/// # Process
///
/// 1. Generate the key string
/// 2. Compute `expires_at = created_at + expiration_days`
/// 3. Insert the record with `is_active = true` and return it
///
/// `expiration_days` of 0 produces a same-instant expiry; the validator
/// will treat such a key as expired on first use, and no special case is
/// made for it.
///
/// # Errors
///
/// - `KeyConflict`: the generated key already exists (caller retries)
/// - `Database`: any other store failure
pub async fn issue(pool: &DbPool, expiration_days: u32) -> Result<ApiKey, AppError> {
    let key = generate_key();

    // Both timestamps derive from one instant so the expiry offset is exact
    let created_at = Utc::now();
    let expires_at = created_at + Duration::days(i64::from(expiration_days));

    let record = sqlx::query_as::<_, ApiKey>(
        r#"
        INSERT INTO api_keys (key, is_active, created_at, expires_at)
        VALUES ($1, TRUE, $2, $3)
        RETURNING key, is_active, created_at, expires_at
        "#,
    )
    .bind(&key)
    .bind(created_at)
    .bind(expires_at)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
            AppError::KeyConflict
        } else {
            AppError::Database(e)
        }
    })?;

    Ok(record)
}

/// Validate a presented API key against the store.
///
/// # Checks (in order)
///
/// 1. A record with this exact key string exists
/// 2. The record is active
/// 3. The record's expiry, when set, lies in the future
///
/// Validity is re-evaluated on every request; nothing is cached and nothing
/// is written (no last-used tracking).
///
/// # Errors
///
/// - `InvalidApiKey`: no record matches
/// - `InactiveApiKey`: record was deactivated
/// - `ExpiredApiKey`: record's expiry has passed
pub async fn validate(pool: &DbPool, presented_key: &str) -> Result<(), AppError> {
    let record = sqlx::query_as::<_, ApiKey>(
        "SELECT key, is_active, created_at, expires_at FROM api_keys WHERE key = $1",
    )
    .bind(presented_key)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::InvalidApiKey)?;

    if !record.is_active {
        return Err(AppError::InactiveApiKey);
    }

    if let Some(expires_at) = record.expires_at {
        if expires_at <= Utc::now() {
            return Err(AppError::ExpiredApiKey);
        }
    }

    Ok(())
}
