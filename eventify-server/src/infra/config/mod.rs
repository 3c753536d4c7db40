//! Startup configuration: environment over TOML file over defaults.

pub mod loader;
pub mod models;
pub mod sources;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader};
pub use models::{
    AuthConfig, BackendKind, Config, ConfigMetadata, ConfigWarning,
    ConfigWarnings, DatabaseConfig, ServerConfig, SurrealConfig,
};
