//! Satwik Farms Order Gateway
//!
//! Accepts orders from the Satwik Farms mobile app, forwards them to the
//! Accu360 ERP and tracks their status through Accu360 webhooks.

mod api;
mod config;
mod server;
mod shutdown;
mod state;
#[cfg(test)]
mod testing;

use clap::Parser;
use config::ConfigLoader;
use satwik_core::framework::DatabaseProcessor;
use satwik_core::store::{CredentialStore, MemoryStore, OrderStore};
use satwik_core::vendor::{Accu360Client, CredentialManager, OAuthClient};
use server::{build_router, cors_layer, run_server};
use shutdown::spawn_config_reload_handler;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Satwik Farms Order Gateway - forwards mobile app orders to Accu360
#[derive(Parser, Debug)]
#[command(name = "satwik-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "SATWIK_CONFIG", default_value = "./satwik-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:8000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,

    /// Keep orders in memory instead of PostgreSQL (development only)
    #[arg(long, default_value = "false")]
    memory_store: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting satwik-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let listen_addr = loaded_config.server.listen;
    let database = loaded_config.database.clone();
    let allowed_origins = loaded_config.allowed_origins.clone();
    let vendor_timeout = loaded_config.vendor_timeout;
    if !loaded_config.vendor.is_configured() {
        tracing::warn!("Accu360 is not fully configured, orders will be recorded as failed");
    }
    if loaded_config.webhook.secret_bytes().is_none() {
        tracing::warn!("WEBHOOK_SECRET not configured, webhook signatures will not be checked");
    }

    // Convert to shared config with separate locks for each section
    let shared_config = loaded_config.into_shared();

    // Select the store
    let (orders, credential_store, db_pool): (
        Arc<dyn OrderStore>,
        Arc<dyn CredentialStore>,
        Option<sqlx::PgPool>,
    ) = if args.memory_store {
        tracing::warn!("Using the in-memory store, orders are lost on restart");
        if args.migrate {
            tracing::warn!("--migrate has no effect with --memory-store");
        }
        let store = Arc::new(MemoryStore::new());
        let orders: Arc<dyn OrderStore> = store.clone();
        let credentials: Arc<dyn CredentialStore> = store;
        (orders, credentials, None)
    } else {
        let database_url = database.url().map_err(|e| {
            tracing::error!("{}", e);
            e
        })?;

        tracing::info!("Connecting to database...");
        let db_pool = PgPoolOptions::new()
            .max_connections(database.max_connections)
            .connect(database_url)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to database: {}", e);
                e
            })?;
        tracing::info!("Database connection established");

        // Run migrations if requested
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

        let processor = Arc::new(DatabaseProcessor {
            pool: db_pool.clone(),
        });
        let orders: Arc<dyn OrderStore> = processor.clone();
        let credentials: Arc<dyn CredentialStore> = processor;
        (orders, credentials, Some(db_pool))
    };

    // Outbound HTTP client for Accu360
    let http = reqwest::Client::builder().timeout(vendor_timeout).build()?;
    let credentials = Arc::new(CredentialManager::new(
        credential_store,
        Arc::new(OAuthClient::new(http.clone())),
    ));
    let vendor = Arc::new(Accu360Client::new(
        http,
        shared_config.vendor.clone(),
        credentials.clone(),
    ));

    // Create application state
    let state = AppState::new(orders, credentials, vendor, shared_config.clone());

    // Spawn config reload handler (listens for SIGHUP)
    let shutdown_notify = spawn_config_reload_handler(shared_config, config_loader);

    // Build the router
    let router = build_router(state, cors_layer(&allowed_origins));

    // Run the server
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Signal the config reload handler to stop
    shutdown_notify.notify_one();

    // Close database connections gracefully
    if let Some(db_pool) = db_pool {
        tracing::info!("Closing database connections...");
        db_pool.close().await;
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
