//! Stateless analysis handler

use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::{error, info};

use crate::{AppError, AppState};
use budgie_core::{AdviceView, AdvisorBackend, BudgetInputs, GENERIC_FAILURE_MESSAGE};

/// POST /api/analyze - Analyze a budget without touching the form session
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(inputs): Json<BudgetInputs>,
) -> Result<Json<AdviceView>, AppError> {
    let ai = state
        .ai
        .as_ref()
        .ok_or_else(|| AppError::service_unavailable("AI backend not configured"))?;

    let advice = ai.advise(&inputs).await.map_err(|e| {
        error!(error = %e, model = ai.model(), "Advice request failed");
        AppError::bad_gateway(GENERIC_FAILURE_MESSAGE)
    })?;

    let view = AdviceView::from_advice(&advice);
    info!(
        savings_rate = view.savings_rate,
        discrepancies = view.discrepancies.len(),
        "Stateless analysis complete"
    );

    Ok(Json(view))
}
