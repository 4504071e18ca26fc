mod api;
mod bootstrap;
mod health;

use std::time::Duration;

use abmdesk_core::config::{AppConfig, LoadOptions, ServerConfig};
use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::bootstrap::Application;

fn init_logging(config: &AppConfig) {
    use abmdesk_core::config::LogFormat::*;
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

fn cors_layer(server: &ServerConfig) -> Result<CorsLayer> {
    let origin = server
        .cors_allow_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("invalid server.cors_allow_origin `{}`", server.cors_allow_origin))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}

fn build_router(app: &Application) -> Result<Router> {
    Ok(api::router(api::ApiState::from_pool(app.db_pool.clone()))
        .merge(health::router(app.db_pool.clone()))
        .layer(cors_layer(&app.config.server)?)
        .layer(TraceLayer::new_for_http()))
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;
    let router = build_router(&app)?;

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("could not bind {address}"))?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        cors_allow_origin = %app.config.server.cors_allow_origin,
        "abmdesk-server listening"
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    wait_for_shutdown().await?;
    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "abmdesk-server stopping"
    );
    let _ = shutdown_tx.send(());

    let drain = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    match tokio::time::timeout(drain, server).await {
        Ok(joined) => joined??,
        Err(_) => tracing::warn!(
            event_name = "system.server.drain_timeout",
            correlation_id = "shutdown",
            drain_secs = drain.as_secs(),
            "in-flight requests did not finish before the shutdown deadline"
        ),
    }

    app.db_pool.close().await;
    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
