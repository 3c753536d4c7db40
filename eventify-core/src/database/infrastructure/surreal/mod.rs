//! Document backend on SurrealDB.
//!
//! Records are keyed by the UUID string (`superuser:⟨uuid⟩`, `event:⟨uuid⟩`).
//! Timestamps are stored as integer microseconds so ordering is numeric and
//! round-trips exactly.

mod events;
mod superusers;

use chrono::{DateTime, Utc};
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use surrealdb::{Connection, Surreal};
use tracing::{debug, info};

pub use events::SurrealEventRepository;
pub use superusers::SurrealSuperUserRepository;

use crate::error::{CoreError, Result};

/// Connection parameters for the document backend.
#[derive(Clone)]
pub struct SurrealSettings {
    /// Endpoint understood by `engine::any`, e.g. `mem://` or `ws://127.0.0.1:8000`.
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for SurrealSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurrealSettings")
            .field("url", &self.url)
            .field("namespace", &self.namespace)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for SurrealSettings {
    fn default() -> Self {
        Self {
            url: "mem://".into(),
            namespace: "eventify".into(),
            database: "main".into(),
            username: None,
            password: None,
        }
    }
}

/// Connect, authenticate when credentials are given, select the namespace
/// and database, and define the schema.
pub async fn connect(settings: &SurrealSettings) -> Result<Surreal<Any>> {
    info!(
        url = %settings.url,
        namespace = %settings.namespace,
        database = %settings.database,
        "Connecting to SurrealDB"
    );

    let db = any::connect(settings.url.as_str())
        .await
        .map_err(|e| storage_error("connect to SurrealDB", e))?;

    if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
        db.signin(Root { username, password })
            .await
            .map_err(|e| storage_error("authenticate with SurrealDB", e))?;
    }

    db.use_ns(settings.namespace.as_str())
        .use_db(settings.database.as_str())
        .await
        .map_err(|e| storage_error("select SurrealDB namespace", e))?;

    initialize_schema(&db).await?;
    Ok(db)
}

/// Define the unique and lookup indexes. Safe to run repeatedly.
pub async fn initialize_schema<C: Connection>(db: &Surreal<C>) -> Result<()> {
    let statements = [
        "DEFINE INDEX IF NOT EXISTS superuser_email ON TABLE superuser FIELDS email UNIQUE",
        "DEFINE INDEX IF NOT EXISTS superuser_username ON TABLE superuser FIELDS username UNIQUE",
        "DEFINE INDEX IF NOT EXISTS superuser_reset_token ON TABLE superuser FIELDS reset_token",
        "DEFINE INDEX IF NOT EXISTS event_date ON TABLE event FIELDS date",
    ];

    for statement in statements {
        db.query(statement)
            .await
            .and_then(|response| response.check())
            .map_err(|e| storage_error("define SurrealDB schema", e))?;
        debug!("Executed schema query: {}", statement);
    }

    info!("SurrealDB schema initialization complete");
    Ok(())
}

pub(crate) fn storage_error(action: &str, err: surrealdb::Error) -> CoreError {
    CoreError::Storage(format!("Failed to {}: {}", action, err))
}

pub(crate) fn to_micros(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_micros()
}

pub(crate) fn from_micros(micros: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| CoreError::Internal(format!("timestamp out of range: {micros}")))
}

pub(crate) fn parse_uuid(raw: &str) -> Result<uuid::Uuid> {
    uuid::Uuid::parse_str(raw)
        .map_err(|e| CoreError::Internal(format!("invalid record id '{raw}': {e}")))
}
