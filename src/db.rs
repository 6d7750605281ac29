//! PostgreSQL connection pool and schema migrations.
//!
//! The gateway keeps a single table of API key records. One pool is created
//! at startup and shared by the issuance handler and the auth middleware.

use sqlx::{Pool, Postgres};

/// Alias so the pool type reads the same everywhere it is passed around.
pub type DbPool = Pool<Postgres>;

/// Upper bound on pooled connections.
///
/// Key lookups are short point queries, so a small pool is enough even under
/// heavy concurrent dispatch.
const MAX_CONNECTIONS: u32 = 5;

/// Create the PostgreSQL connection pool.
///
/// Connections are opened lazily and reused across requests.
///
/// # Errors
///
/// Returns an error if the connection string is invalid or the server is
/// unreachable.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(database_url)
        .await
}

/// Apply pending migrations from the `migrations/` directory.
///
/// The migration set is embedded at compile time and tracked in the
/// `_sqlx_migrations` table, so each file runs exactly once.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
