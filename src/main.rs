// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Favorites-Sync job
//!
//! Mirrors Webex devices tagged in Control Hub into the local phonebook,
//! one favorites folder per tag, refreshed on a fixed period.

use favorites_sync::{
    config::Config,
    services::{DirectoryClient, FavoritesSynchronizer, Scheduler, TokenManager, WebexClient},
    store::{FileCredentialStore, JsonPhonebook},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        tags = ?config.favorite_tags,
        api_base = %config.api_base,
        "Starting Favorites-Sync"
    );

    let webex = WebexClient::new(config.api_base.clone(), config.http_timeout)?;

    // Credential slot and token lifecycle
    let credential_store = Arc::new(FileCredentialStore::new(config.credential_path.clone()));
    tracing::info!(path = %credential_store.path().display(), "Using credential slot");
    let tokens = TokenManager::new(webex.clone(), config.auth.clone(), credential_store);

    // Local phonebook
    let phonebook = Arc::new(JsonPhonebook::open(config.phonebook_path.clone()).await?);

    let synchronizer = Arc::new(FavoritesSynchronizer::new(
        config.favorite_tags.clone(),
        tokens,
        DirectoryClient::new(webex),
        phonebook,
    ));
    synchronizer.restore_credential().await;

    let scheduler = Scheduler::new(
        synchronizer,
        config.startup_delay,
        config.refresh_period,
    );

    let Some(port) = config.status_port else {
        scheduler.run().await;
        return Ok(());
    };

    // Status server alongside the scheduler
    let state = Arc::new(AppState {
        tags: config.favorite_tags.clone(),
        status: scheduler.status(),
    });
    let app = favorites_sync::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Status server listening");

    tokio::spawn(scheduler.run());
    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("favorites_sync=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
