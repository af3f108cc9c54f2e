mod bootstrap;
mod health;
mod recommend;
#[cfg(test)]
mod test_support;

use std::time::Duration;

use anyhow::Result;
use axum::Router;
use leafscore_core::config::{AppConfig, LoadOptions};
use tokio::{net::TcpListener, sync::oneshot};
use tower_http::cors::CorsLayer;

use crate::bootstrap::Application;

fn init_logging(config: &AppConfig) {
    use leafscore_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

fn app_router(app: &Application) -> Router {
    recommend::router(app.engine.clone())
        .merge(health::router(app.engine.clone()))
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config)?;
    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = TcpListener::bind(&address).await?;

    tracing::info!(
        event_name = "leafscore.server.started",
        correlation_id = "bootstrap",
        address = address.as_str(),
        "leafscore-server listening"
    );

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let serve = axum::serve(listener, app_router(&app)).with_graceful_shutdown(async move {
        let _ = stop_rx.await;
    });
    let mut server = tokio::spawn(async move { serve.await });

    tokio::select! {
        signal = wait_for_shutdown() => signal?,
        finished = &mut server => {
            finished??;
            return Ok(());
        }
    }

    tracing::info!(
        event_name = "leafscore.server.stopping",
        correlation_id = "shutdown",
        grace_secs = app.config.server.graceful_shutdown_secs,
        "leafscore-server stopping"
    );
    let _ = stop_tx.send(());

    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    match tokio::time::timeout(grace, server).await {
        Ok(finished) => finished??,
        Err(_) => tracing::warn!(
            event_name = "leafscore.server.shutdown_timeout",
            correlation_id = "shutdown",
            "in-flight requests did not drain before the grace period elapsed"
        ),
    }

    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
