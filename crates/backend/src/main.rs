use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;

use backend::shared::config::load_config;
use backend::shared::data::connect_store;
use backend::state::AppState;
use backend::{routes, system};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = load_config().context("Failed to load configuration")?;
    tracing::info!(
        "Store backend: {:?}, API protection: {}",
        config.database.backend,
        config.auth.protect_api
    );

    let store = connect_store(&config)
        .await
        .context("Failed to connect analytics store")?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let app = routes::build_app(AppState::new(store, config));

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    addr.port()
                );
            } else {
                tracing::error!("Failed to bind to {}. Error: {}", addr, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
