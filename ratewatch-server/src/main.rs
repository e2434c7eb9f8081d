//! Ratewatch Server
//!
//! Currency-rate tracking backend: a REST API over a Postgres rate store,
//! change-event fan-out to WebSocket subscribers and a NATS topic, and a
//! periodic refresh loop fed by pluggable rate sources.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::{ConfigLoader, get_database_url};
use ratewatch_core::notify::{ConnectionRegistry, NatsBus, Notifier};
use ratewatch_core::processors::RefreshTask;
use ratewatch_core::sources::SourceChain;
use server::{build_router, run_server};
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Ratewatch - currency exchange-rate tracking backend
#[derive(Parser, Debug)]
#[command(name = "ratewatch-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./ratewatch-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:8000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting ratewatch-server v{}", env!("CARGO_PKG_VERSION"));

    let config_loader = ConfigLoader::new(&args.config, args.listen);
    let config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let database_url = get_database_url().map_err(|e| {
        tracing::error!("DATABASE_URL environment variable not set");
        e
    })?;

    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;
    tracing::info!("Database connection established");

    if args.migrate {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&db_pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to run migrations: {}", e);
                e
            })?;
        tracing::info!("Migrations completed successfully");
    }

    // Message bus: connect and log everything published on our own topic.
    let bus = NatsBus::connect(&config.bus.url).await.map_err(|e| {
        tracing::error!("Failed to connect to message bus: {}", e);
        e
    })?;
    bus.spawn_log_subscriber(&config.bus.topic).await?;
    tracing::info!(url = %config.bus.url, topic = %config.bus.topic, "Message bus connected");

    // Fan-out path shared by the API handlers and the refresh scheduler.
    let registry = Arc::new(ConnectionRegistry::new());
    let notifier = Notifier::new(
        Arc::new(bus),
        registry.clone(),
        config.bus.topic.clone(),
    );

    let chain = SourceChain::for_mode(config.refresh.mode, &config.refresh.fiat_api_url);
    let refresh = Arc::new(RefreshTask::new(db_pool.clone(), chain, notifier.clone()));

    // Exactly one scheduler loop for the process lifetime.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = tokio::spawn(refresh.clone().run_periodic(
        Duration::from_secs(config.refresh.interval_secs),
        shutdown_rx,
    ));

    let state = AppState {
        db: db_pool.clone(),
        registry,
        notifier,
        refresh,
    };

    let router = build_router(state);

    tracing::info!("Starting HTTP server on {}", config.server.listen);
    let result = run_server(router, config.server.listen).await;

    // Stop the scheduler; a cycle already in flight is allowed to finish.
    let _ = shutdown_tx.send(true);
    if let Err(e) = scheduler.await {
        tracing::error!("Refresh scheduler task failed: {}", e);
    }

    tracing::info!("Closing database connections...");
    db_pool.close().await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
