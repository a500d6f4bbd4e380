//! Health and defaults handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use budgie_core::{AdvisorBackend, BudgetInputs};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ai_configured: bool,
    pub ai_healthy: bool,
    pub ai_backend: Option<&'static str>,
    pub model: Option<String>,
}

/// GET /api/health - Server status and AI backend reachability
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (ai_healthy, ai_backend, model) = match &state.ai {
        Some(ai) => (
            ai.health_check().await,
            Some(ai.kind()),
            Some(ai.model().to_string()),
        ),
        None => (false, None, None),
    };

    Json(HealthResponse {
        status: "ok",
        ai_configured: state.ai.is_some(),
        ai_healthy,
        ai_backend,
        model,
    })
}

/// GET /api/defaults - Starting values for a fresh form
pub async fn defaults() -> Json<BudgetInputs> {
    Json(BudgetInputs::default())
}
