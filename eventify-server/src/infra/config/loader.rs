use once_cell::sync::Lazy;
use std::{fs, path::PathBuf};
use thiserror::Error;

use super::{
    models::{
        AuthConfig, BackendKind, Config, ConfigMetadata, ConfigWarnings,
        DEFAULT_PASSWORD_PEPPER, DatabaseConfig, ServerConfig, SurrealConfig,
    },
    sources::{EnvConfig, FileConfig},
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("eventify.toml"),
        PathBuf::from("config/eventify.toml"),
    ]
});

#[derive(Debug, Default, Clone)]
struct ConfigLoaderOptions {
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Load `.env`, then the process environment, then the TOML file.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        self.load_with_env(EnvConfig::gather(), env_file_loaded)
    }

    /// Same as [`load`](Self::load) with an already gathered environment.
    pub fn load_with_env(
        &self,
        env_config: EnvConfig,
        env_file_loaded: bool,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env_config)?;
        let (config, warnings) =
            compose_config(file_config, env_config, config_path, env_file_loaded)?;
        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let mut source = ConfigPathSource::default();

        if let Some(explicit) = &self.options.config_path {
            source.explicit = Some(explicit.clone());
        } else if let Some(from_env) = &env_config.config_path {
            source.env = Some(from_env.clone());
        }

        if source.is_empty() {
            source.default = DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
                .cloned();
        }

        let Some((path, provenance)) = source.resolved_path() else {
            return Ok((None, None));
        };

        if !path.exists() {
            if provenance.is_explicit() {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let contents =
            fs::read_to_string(&path).map_err(|err| ConfigLoadError::Io {
                path: path.clone(),
                source: err,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
                path: path.clone(),
                source: err,
            })?;

        Ok((Some(file_config), Some(path)))
    }
}

fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    config_path: Option<PathBuf>,
    env_file_loaded: bool,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if config_path.is_none() {
        warnings.push_with_hint(
            "No eventify.toml detected; using environment variables and defaults",
            "Create eventify.toml or pass --config to pin the settings",
        );
    }

    let FileConfig {
        server: file_server,
        database: file_database,
        auth: file_auth,
    } = file_config.unwrap_or_default();

    let server_defaults = ServerConfig::default();
    let server = ServerConfig {
        host: env
            .server_host
            .or(file_server.host)
            .unwrap_or(server_defaults.host),
        port: env.server_port.or(file_server.port).unwrap_or(server_defaults.port),
    };

    let backend = match env.database_backend.or(file_database.backend) {
        Some(raw) => raw
            .parse::<BackendKind>()
            .map_err(|value| ConfigLoadError::UnknownBackend { value })?,
        None => BackendKind::default(),
    };

    let postgres_url = env.database_url.or(file_database.postgres_url);
    if backend == BackendKind::Postgres && postgres_url.is_none() {
        return Err(ConfigLoadError::MissingDatabaseUrl);
    }

    let surreal_defaults = SurrealConfig::default();
    let surreal = SurrealConfig {
        url: env
            .surreal_url
            .or(file_database.surreal_url)
            .unwrap_or(surreal_defaults.url),
        namespace: env
            .surreal_namespace
            .or(file_database.surreal_namespace)
            .unwrap_or(surreal_defaults.namespace),
        database: env
            .surreal_database
            .or(file_database.surreal_database)
            .unwrap_or(surreal_defaults.database),
        username: env.surreal_username.or(file_database.surreal_username),
        password: env.surreal_password.or(file_database.surreal_password),
    };
    if surreal.username.is_some() != surreal.password.is_some() {
        warnings.push(
            "SurrealDB credentials are incomplete; connecting without authentication",
        );
    }

    let database = DatabaseConfig {
        backend,
        postgres_url,
        max_connections: env
            .database_max_connections
            .or(file_database.max_connections),
        surreal,
    };

    let auth = match env.password_pepper.or(file_auth.password_pepper) {
        Some(password_pepper) => AuthConfig { password_pepper },
        None => {
            warnings.push_with_hint(
                "PASSWORD_PEPPER is not set; using the development pepper",
                "Set PASSWORD_PEPPER before storing real accounts; hashes depend on it",
            );
            AuthConfig {
                password_pepper: DEFAULT_PASSWORD_PEPPER.to_string(),
            }
        }
    };

    let config = Config {
        server,
        database,
        auth,
        metadata: ConfigMetadata {
            config_path,
            env_file_loaded,
        },
    };

    Ok((config, warnings))
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("unknown database backend '{value}' (expected memory, postgres or surreal)")]
    UnknownBackend { value: String },
    #[error("database backend 'postgres' requires DATABASE_URL or database.postgres_url")]
    MissingDatabaseUrl,
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

#[derive(Debug, Default)]
struct ConfigPathSource {
    explicit: Option<PathBuf>,
    env: Option<PathBuf>,
    default: Option<PathBuf>,
}

impl ConfigPathSource {
    fn is_empty(&self) -> bool {
        self.explicit.is_none() && self.env.is_none() && self.default.is_none()
    }

    fn resolved_path(&self) -> Option<(PathBuf, ConfigPathProvenance)> {
        if let Some(path) = &self.explicit {
            return Some((path.clone(), ConfigPathProvenance::Explicit));
        }
        if let Some(path) = &self.env {
            return Some((path.clone(), ConfigPathProvenance::Env));
        }
        if let Some(path) = &self.default {
            return Some((path.clone(), ConfigPathProvenance::Default));
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigPathProvenance {
    Explicit,
    Env,
    Default,
}

impl ConfigPathProvenance {
    fn is_explicit(self) -> bool {
        matches!(
            self,
            ConfigPathProvenance::Explicit | ConfigPathProvenance::Env
        )
    }
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> EnvConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvConfig::from_lookup(|key| map.get(key).cloned())
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_select_memory_backend() {
        let (config, warnings) = compose_config(None, env(&[]), None, false).unwrap();
        assert_eq!(config.database.backend, BackendKind::Memory);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.auth.password_pepper, DEFAULT_PASSWORD_PEPPER);
        assert!(
            warnings
                .items
                .iter()
                .any(|w| w.message.contains("PASSWORD_PEPPER"))
        );
    }

    #[test]
    fn environment_overrides_file() {
        let file = write_config(
            r#"
            [server]
            port = 9000
            host = "127.0.0.1"

            [database]
            backend = "surreal"
            surreal_url = "ws://db:8000"

            [auth]
            password_pepper = "from-file"
            "#,
        );

        let load = ConfigLoader::new()
            .with_config_path(file.path())
            .load_with_env(env(&[("SERVER_PORT", "7000")]), false)
            .unwrap();

        let config = load.config;
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.database.backend, BackendKind::Surreal);
        assert_eq!(config.database.surreal.url, "ws://db:8000");
        assert_eq!(config.database.surreal.namespace, "eventify");
        assert_eq!(config.auth.password_pepper, "from-file");
        assert_eq!(config.metadata.config_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn missing_env_file_is_tolerated() {
        let file = write_config("[server]\nport = 9100\n");
        let dir = tempfile::tempdir().unwrap();

        let load = ConfigLoader::new()
            .with_env_file(dir.path().join("absent.env"))
            .with_config_path(file.path())
            .load()
            .unwrap();

        assert!(!load.config.metadata.env_file_loaded);
        assert_eq!(load.config.metadata.config_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn postgres_without_url_is_rejected() {
        let err = compose_config(
            None,
            env(&[("DATABASE_BACKEND", "postgres")]),
            None,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigLoadError::MissingDatabaseUrl));

        let (config, _) = compose_config(
            None,
            env(&[
                ("DATABASE_BACKEND", "Postgres"),
                ("DATABASE_URL", "postgres://localhost/eventify"),
            ]),
            None,
            false,
        )
        .unwrap();
        assert_eq!(config.database.backend, BackendKind::Postgres);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = compose_config(None, env(&[("DATABASE_BACKEND", "mongodb")]), None, false)
            .unwrap_err();
        assert!(matches!(err, ConfigLoadError::UnknownBackend { ref value } if value == "mongodb"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = ConfigLoader::new()
            .with_config_path("/definitely/not/here/eventify.toml")
            .load_with_env(env(&[]), false)
            .unwrap_err();
        assert!(matches!(err, ConfigLoadError::MissingConfig { .. }));
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let file = write_config("[server\nport = ");
        let err = ConfigLoader::new()
            .with_config_path(file.path())
            .load_with_env(env(&[]), false)
            .unwrap_err();
        assert!(matches!(err, ConfigLoadError::Parse { .. }));
    }
}
