use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use agency_manager::media::MediaStore;
use agency_manager::{AppState, app, config, db};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = config::init()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("agency_manager=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    info!("initializing agency manager");

    // Initialize database connection
    let db = db::init(config.database_url()).await?;
    info!("database connection established");

    let media = MediaStore::new(&config.media_root)?;
    let state = Arc::new(AppState { db, media });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
