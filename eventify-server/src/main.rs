//! Eventify super user management server.
//!
//! Serves the REST API by default; `seed` fills the configured backend with
//! generated data and exits.

use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    sync::Arc,
};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use eventify_core::{AuthCrypto, DatabaseContext};
use eventify_server::{
    AppState, create_app,
    infra::config::{ConfigLoad, ConfigLoader, ServerConfig},
    seed::{self, SeedCounts},
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "eventify-server")]
#[command(about = "Super user management API over Postgres, SurrealDB or memory")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Path to the TOML configuration file
    #[arg(long, env = "EVENTIFY_CONFIG")]
    config: Option<PathBuf>,

    /// Dotenv file to load before reading the environment (default: ./.env)
    #[arg(long, env = "EVENTIFY_ENV_FILE")]
    env_file: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Insert generated super users and events, then exit
    Seed {
        #[arg(long, default_value_t = 10)]
        superusers: usize,
        #[arg(long, default_value_t = 10)]
        events: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let ConfigLoad { config, warnings } = load_runtime_config(&cli.serve)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = config.metadata.config_path.as_ref() {
        info!(path = %path.display(), "loaded configuration file");
    }
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => warn!("{} ({})", warning.message, hint),
            None => warn!("{}", warning.message),
        }
    }

    let crypto = Arc::new(
        AuthCrypto::new(config.auth.password_pepper.as_bytes())
            .context("failed to initialise password hashing")?,
    );

    let backend = config.database.to_backend();
    info!(backend = backend.name(), "connecting to storage backend");
    let database = DatabaseContext::connect(&backend)
        .await
        .with_context(|| format!("failed to connect to {} backend", backend.name()))?;

    let state = AppState::new(Arc::new(config), database, crypto);

    match cli.command {
        Some(Command::Seed { superusers, events }) => {
            let report = seed::run(
                &state.database,
                state.superusers(),
                SeedCounts { superusers, events },
            )
            .await?;
            info!(
                superusers = report.superusers,
                events = report.events,
                "seeding complete"
            );
            Ok(())
        }
        Some(Command::Serve) | None => run_server(state).await,
    }
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<ConfigLoad> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = args.config.clone() {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = args.env_file.clone() {
        loader = loader.with_env_file(path);
    }

    let mut load = loader.load().context("failed to load configuration")?;
    if let Some(port) = args.port {
        load.config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        load.config.server.host = host;
    }
    Ok(load)
}

async fn run_server(state: AppState) -> anyhow::Result<()> {
    let addr = listen_addr(&state.config().server)?;

    info!(
        "Starting Eventify server on {} ({} backend)",
        addr,
        state.database.backend()
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// `host` is a bare IP literal, so IPv6 hosts such as `::` need no brackets.
fn listen_addr(server: &ServerConfig) -> anyhow::Result<SocketAddr> {
    let ip: IpAddr = server
        .host
        .trim_matches(|c| c == '[' || c == ']')
        .parse()
        .with_context(|| format!("invalid listen host {}", server.host))?;
    Ok(SocketAddr::new(ip, server.port))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
