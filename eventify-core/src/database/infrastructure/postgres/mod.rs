//! PostgreSQL backend built on `sqlx`.

mod events;
mod superusers;

use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

pub use events::PostgresEventRepository;
pub use superusers::PostgresSuperUserRepository;

use crate::error::{CoreError, Result};

/// Pool sizing for the relational backend.
#[derive(Debug, Clone)]
pub struct PostgresPoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PostgresPoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// Open a pool and bring the schema up to date.
pub async fn connect(url: &str, settings: &PostgresPoolSettings) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.acquire_timeout)
        .max_lifetime(Duration::from_secs(1800))
        .idle_timeout(Duration::from_secs(600))
        .test_before_acquire(true)
        .connect(url)
        .await
        .map_err(|e| CoreError::Storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

    crate::MIGRATOR
        .run(&pool)
        .await
        .map_err(|e| CoreError::Storage(format!("Failed to apply migrations: {}", e)))?;

    info!(
        "Database pool initialized with max_connections={}, min_connections={}",
        settings.max_connections, settings.min_connections
    );
    Ok(pool)
}

/// Map a driver error, surfacing unique violations distinctly.
pub(crate) fn storage_error(action: &str, err: sqlx::Error) -> CoreError {
    if let Some(db_err) = err.as_database_error()
        && db_err.is_unique_violation()
    {
        return CoreError::Storage(format!(
            "Failed to {}: duplicate key violates {}",
            action,
            db_err.constraint().unwrap_or("a unique constraint")
        ));
    }
    CoreError::Storage(format!("Failed to {}: {}", action, err))
}
