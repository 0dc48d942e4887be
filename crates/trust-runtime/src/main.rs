//! Trust service entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::runtime::Handle;
use tracing::{info, warn};

use tl_01_guardrail::{cleanup_task, CLEANUP_INTERVAL};
use trust_runtime::{build_router, init_logging, TrustConfig, TrustContainer};

#[tokio::main]
async fn main() -> Result<()> {
    let config = TrustConfig::from_env().context("loading configuration")?;
    init_logging(&config.logging)?;

    info!("===========================================");
    info!("  Trust Ledger Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let http_addr = config.server.http_addr;
    let drain_timeout = config.server.drain_timeout;
    let container = Arc::new(
        TrustContainer::build(config, Handle::current()).context("building services")?,
    );

    let cleanup = tokio::spawn(cleanup_task(
        Arc::clone(&container.guardrail),
        CLEANUP_INTERVAL,
    ));

    let listener = TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("binding {http_addr}"))?;
    info!(addr = %http_addr, "[runtime] Listening. Press Ctrl+C to stop.");

    let app = build_router(Arc::clone(&container));
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("serving HTTP")?;

    cleanup.abort();

    info!("[runtime] Draining in-flight evidence");
    let abandoned = container.dispatcher.drain(drain_timeout).await;
    if abandoned > 0 {
        warn!(abandoned, "[runtime] Evidence tasks still running at shutdown");
    }
    info!("[runtime] Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "[runtime] Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("[runtime] Shutdown signal received");
}
