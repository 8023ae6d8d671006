// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Status HTTP routes.

use crate::services::SchedulerStatus;
use crate::AppState;
use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub build_id: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();
    Json(HealthResponse {
        status: "ok".to_string(),
        build_id,
    })
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub scheduler: SchedulerStatus,
}

/// Configured tags plus the most recent cycle report.
async fn sync_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let scheduler = state.status.read().await.clone();
    Json(StatusResponse {
        tags: state.tags.clone(),
        scheduler,
    })
}

/// Build the status router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(sync_status))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
