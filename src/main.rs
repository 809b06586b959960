// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SLM Agent session bridge
//!
//! Serves the agent session operations to the mobile app shell over a
//! loopback-only HTTP interface.

use slm_agent_session::{config::Config, db::LocalStore, services::SessionService, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        api = %config.api_base_url,
        timeout_secs = config.request_timeout.as_secs(),
        "Starting SLM agent session bridge"
    );

    if config.trace_credential_matches {
        tracing::warn!("Credential comparison tracing is enabled; do not use with production data");
    }

    let store = LocalStore::open_file(&config.store_path);
    let session = SessionService::from_config(&config, store)?;

    let state = Arc::new(AppState {
        config: config.clone(),
        session,
    });

    let app = slm_agent_session::routes::create_router(state);

    // Loopback only: the bridge is for the app shell on this device
    let addr = format!("127.0.0.1:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Bridge listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("slm_agent_session=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
