//! Server mode
//!
//! This module contains the HTTP server startup logic.

use actix_web::{App, HttpServer, middleware::Compress, web};
use anyhow::{Context, Result};
use tracing::warn;

use crate::api::app_routes;
use crate::config::get_config;
use crate::runtime::lifetime;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let config = get_config();

    let startup = lifetime::startup::prepare_server_startup(&config)
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {:#}", e);
            e
        })?;

    let engine = startup.engine.clone();

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .app_data(web::Data::new(engine.clone()))
            .app_data(web::PayloadConfig::new(64 * 1024))
            .configure(app_routes)
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .workers(cpu_count)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    warn!("Starting server at http://{}", bind_address);

    // Wait for server or shutdown signal
    tokio::select! {
        res = server => {
            res.context("HTTP server failed")?;
        }
        _ = lifetime::shutdown::listen_for_shutdown() => {
            warn!("HTTP server stopping");
        }
    }

    lifetime::shutdown::stop_sweeper(startup.sweeper).await;
    warn!("Graceful shutdown: all tasks completed");

    Ok(())
}
