use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use eventify_core::DatabaseBackend;
use eventify_core::database::infrastructure::postgres::PostgresPoolSettings;
use eventify_core::database::infrastructure::surreal::SurrealSettings;
use serde::{Deserialize, Serialize};

/// Used only when no pepper is configured; startup warns about it.
pub const DEFAULT_PASSWORD_PEPPER: &str = "eventify-development-pepper";

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Memory,
    Postgres,
    Surreal,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Memory => "memory",
            BackendKind::Postgres => "postgres",
            BackendKind::Surreal => "surreal",
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "inmemory" => Ok(BackendKind::Memory),
            "postgres" | "postgresql" => Ok(BackendKind::Postgres),
            "surreal" | "surrealdb" => Ok(BackendKind::Surreal),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    pub backend: BackendKind,
    /// Required when `backend` is `Postgres`; enforced at load time.
    pub postgres_url: Option<String>,
    pub max_connections: Option<u32>,
    pub surreal: SurrealConfig,
}

impl DatabaseConfig {
    /// Translate into the selector understood by the core crate.
    pub fn to_backend(&self) -> DatabaseBackend {
        match self.backend {
            BackendKind::Memory => DatabaseBackend::Memory,
            BackendKind::Postgres => {
                let mut pool = PostgresPoolSettings::default();
                if let Some(max) = self.max_connections {
                    pool.max_connections = max;
                }
                DatabaseBackend::Postgres {
                    url: self.postgres_url.clone().unwrap_or_default(),
                    pool,
                }
            }
            BackendKind::Surreal => DatabaseBackend::Surreal(SurrealSettings {
                url: self.surreal.url.clone(),
                namespace: self.surreal.namespace.clone(),
                database: self.surreal.database.clone(),
                username: self.surreal.username.clone(),
                password: self.surreal.password.clone(),
            }),
        }
    }
}

#[derive(Clone)]
pub struct SurrealConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for SurrealConfig {
    fn default() -> Self {
        let defaults = SurrealSettings::default();
        Self {
            url: defaults.url,
            namespace: defaults.namespace,
            database: defaults.database,
            username: None,
            password: None,
        }
    }
}

impl fmt::Debug for SurrealConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurrealConfig")
            .field("url", &self.url)
            .field("namespace", &self.namespace)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Clone)]
pub struct AuthConfig {
    pub password_pepper: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password_pepper: DEFAULT_PASSWORD_PEPPER.to_string(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("password_pepper", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

/// Non-fatal findings collected while loading; logged once tracing is up.
#[derive(Debug, Clone, Default)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push(&mut self, message: impl Into<String>) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint(
        &mut self,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
