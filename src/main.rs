//! # Car Garage server
//!
//! ```bash
//! # Default settings (data/car_garage.db, port 3000)
//! car-garage
//!
//! # Custom database and port
//! car-garage --db /var/lib/garage/cars.db --port 8080
//!
//! # Throwaway in-memory inventory
//! car-garage --memory
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use car_garage::api::{create_router, AppState};
use car_garage::config::{Config, HELP};
use car_garage::db::GarageStore;
use car_garage::schema;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env();
    if config.show_help {
        println!("{}", HELP);
        return Ok(());
    }

    let store = if config.in_memory {
        info!("Using in-memory database");
        GarageStore::in_memory().await?
    } else {
        info!("Using database file: {}", config.db_path);
        GarageStore::open(&config.db_path)
            .await
            .with_context(|| format!("opening database {}", config.db_path))?
    };
    let store = Arc::new(store);

    schema::initialize(&store, config.seed)
        .await
        .context("initializing schema")?;

    let app = create_router(AppState::new(Arc::clone(&store)));

    let addr: SocketAddr = config
        .bind_addr()
        .parse()
        .with_context(|| format!("invalid bind address {}", config.bind_addr()))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server running at http://localhost:{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("failed to install CTRL+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    info!("Server stopped");
    Ok(())
}
