//! # tlab-edge -- Binary Entry Point
//!
//! Reads [`EdgeConfig`] from the environment and serves the router on
//! `0.0.0.0:$EDGE_PORT`.

use std::net::SocketAddr;

use tlab_edge::{app, EdgeConfig, EdgeState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = EdgeConfig::from_env()?;
    init_tracing(config.log_json);

    let hosts: Vec<&str> = config
        .routes
        .rules()
        .iter()
        .map(|r| r.match_host.as_str())
        .collect();
    tracing::info!(?hosts, "routing table loaded");
    if config.accept_invalid_certs {
        tracing::warn!("upstream certificate verification is disabled");
    }

    let state = EdgeState::new(&config).map_err(|e| {
        tracing::error!("failed to initialise edge router: {e}");
        e
    })?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("tlab-edge listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for shutdown signal: {e}");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
