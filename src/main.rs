mod accounts;
mod archive;
mod config;
mod db;
mod hub;
mod rooms;
mod routes;
mod state;
mod ws;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use archive::ArchiveHandle;
use config::{generate_config_template, Config};
use hub::Hub;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load config with layered precedence: defaults < TOML < env < CLI
    let config = Config::load()?;

    // Handle --generate-config: print template and exit
    if config.generate_config {
        print!("{}", generate_config_template());
        return Ok(());
    }

    // Initialize tracing/logging
    if config.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "relay_server=info".parse().unwrap()),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "relay_server=info".parse().unwrap()),
            )
            .init();
    }

    tracing::info!("relay-server v{} starting", env!("CARGO_PKG_VERSION"));

    // Initialize the SQLite archive/account database
    let db = db::init_db(&config.data_dir)?;

    // Spawn the archive writer task (fire-and-forget persistence)
    let archive = ArchiveHandle::spawn(db.clone());

    // Spawn the hub task owning the connection registry
    let hub = Hub::spawn(archive, config.history_limit);

    // Build application state
    let app_state = state::AppState {
        db,
        hub,
        rooms: Arc::new(config.rooms.clone().unwrap_or_else(config::default_rooms)),
    };

    // Build router
    let app = routes::build_router(app_state, &config.static_dir);

    // Bind and serve
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
