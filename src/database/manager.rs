use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::schema;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Column/message pairs for the UNIQUE constraints of a table. The first
/// entry is used when the violated column is not listed.
pub type UniqueKeys = &'static [(&'static str, &'static str)];

impl DatabaseError {
    /// Classify a failed INSERT/UPDATE. Unique violations become `Conflict`
    /// with the message of the violated key, foreign key violations become
    /// `InvalidReference`; everything else stays a driver error.
    pub fn from_write(err: sqlx::Error, unique_keys: UniqueKeys) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return DatabaseError::Conflict(conflict_message(db_err.message(), unique_keys));
            }
            if db_err.is_foreign_key_violation() {
                return DatabaseError::InvalidReference("source_id does not reference an existing source".to_string());
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// SQLite names the key as `UNIQUE constraint failed: users.username`, with
/// one `table.column` entry per column of a composite key.
fn conflict_message(message: &str, unique_keys: UniqueKeys) -> String {
    let violated: Vec<&str> = message
        .rsplit(": ")
        .next()
        .unwrap_or_default()
        .split(", ")
        .map(|qualified| qualified.rsplit('.').next().unwrap_or(qualified))
        .collect();

    unique_keys
        .iter()
        .find(|(column, _)| violated.contains(column))
        .or_else(|| unique_keys.first())
        .map(|(_, message)| message.to_string())
        .unwrap_or_else(|| "Record already exists".to_string())
}

/// Pool construction and schema bootstrap for the SQLite store
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool for the configured database, creating the file if needed,
    /// and make sure every table exists.
    pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
        let mut options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|_| DatabaseError::InvalidDatabaseUrl(config.url.clone()))?
            .create_if_missing(true)
            .foreign_keys(true);
        if !config.enable_query_logging {
            options = options.disable_statement_logging();
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_with(options)
            .await?;

        schema::create_all(&pool).await?;

        info!("Opened database pool for: {}", config.url);
        Ok(pool)
    }

    /// Private in-memory database. Pinned to a single connection that never
    /// idles out, otherwise each new connection would see an empty database.
    pub async fn memory() -> Result<SqlitePool, DatabaseError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|_| DatabaseError::InvalidDatabaseUrl("sqlite::memory:".to_string()))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        schema::create_all(&pool).await?;
        Ok(pool)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &SqlitePool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}
