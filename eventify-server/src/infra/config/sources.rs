use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub auth: FileAuthConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    /// `memory`, `postgres` or `surreal`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postgres_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surreal_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surreal_namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surreal_database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surreal_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surreal_password: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileAuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_pepper: Option<String>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub database_backend: Option<String>,
    pub database_url: Option<String>,
    pub database_max_connections: Option<u32>,
    pub surreal_url: Option<String>,
    pub surreal_namespace: Option<String>,
    pub surreal_database: Option<String>,
    pub surreal_username: Option<String>,
    pub surreal_password: Option<String>,
    pub password_pepper: Option<String>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            config_path: get("EVENTIFY_CONFIG").map(PathBuf::from),
            server_host: get("SERVER_HOST"),
            server_port: get("SERVER_PORT").and_then(|s| s.parse().ok()),
            database_backend: get("DATABASE_BACKEND"),
            database_url: get("DATABASE_URL"),
            database_max_connections: get("DATABASE_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok()),
            surreal_url: get("SURREAL_URL"),
            surreal_namespace: get("SURREAL_NS"),
            surreal_database: get("SURREAL_DB"),
            surreal_username: get("SURREAL_USER"),
            surreal_password: get("SURREAL_PASS"),
            password_pepper: get("PASSWORD_PEPPER"),
        }
    }
}
