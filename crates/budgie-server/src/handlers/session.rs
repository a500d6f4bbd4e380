//! Form session handlers
//!
//! The server keeps one form session. Every change goes through the
//! session reducer, so the submit guard applies to HTTP clients too.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::{AppError, AppState};
use budgie_core::session::perform;
use budgie_core::{Action, AdviceView, BudgetAdvice, BudgetField, BudgetInputs, Effect, Session};

/// Session as seen by the form
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub inputs: BudgetInputs,
    pub phase: &'static str,
    pub can_submit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice: Option<BudgetAdvice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<AdviceView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyzed_at: Option<DateTime<Utc>>,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            inputs: session.inputs,
            phase: session.phase.name(),
            can_submit: session.can_submit(),
            message: session.message().map(str::to_string),
            advice: session.advice().cloned(),
            view: session.view(),
            analyzed_at: session.analyzed_at,
        }
    }
}

/// Run one action through the reducer in place
fn apply(session: &mut Session, action: Action) -> Option<Effect> {
    let (next, effect) = std::mem::take(session).update(action);
    *session = next;
    effect
}

/// GET /api/session - Current form state and result panel
pub async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    let session = state.session.lock().await;
    Json(SessionResponse::from(&*session))
}

/// PATCH /api/session/inputs - Edit form fields
///
/// Body is a map of field name to raw value (string or number). Values are
/// coerced like form text; unknown field names are rejected before anything
/// is applied.
pub async fn update_inputs(
    State(state): State<Arc<AppState>>,
    Json(edits): Json<HashMap<String, Value>>,
) -> Result<Json<SessionResponse>, AppError> {
    let mut actions = Vec::with_capacity(edits.len());
    for (key, value) in edits {
        let field: BudgetField = key.parse().map_err(|e: String| AppError::bad_request(&e))?;
        let raw = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Null => String::new(),
            _ => {
                return Err(AppError::bad_request(&format!(
                    "Invalid value for {}: expected a number or string",
                    field
                )))
            }
        };
        actions.push(Action::Edit { field, raw });
    }

    let mut session = state.session.lock().await;
    for action in actions {
        apply(&mut session, action);
    }

    Ok(Json(SessionResponse::from(&*session)))
}

/// POST /api/session/reset - Restore the starting form values
pub async fn reset_session(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    let mut session = state.session.lock().await;
    apply(&mut session, Action::Reset);
    Json(SessionResponse::from(&*session))
}

/// POST /api/session/analyze - Submit the form
///
/// Returns 409 while a previous submit is still pending and 502 with the
/// generic failure message when the model call fails.
pub async fn analyze_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionResponse>, AppError> {
    let Some(ai) = state.ai.clone() else {
        return Err(AppError::service_unavailable("AI backend not configured"));
    };

    let effect = apply(&mut *state.session.lock().await, Action::Submit)
        .ok_or_else(|| AppError::conflict("Analysis already in progress"))?;

    let session = resolve_in_background(state, async move { perform(effect, &ai).await }).await?;

    if let Some(message) = session.message() {
        return Err(AppError::bad_gateway(message));
    }

    Ok(Json(SessionResponse::from(&session)))
}

/// Drive a pending submit to its resolution on a spawned task
///
/// The task runs to completion even if the client disconnects. If it
/// panics, the session is resolved as failed so it never stays loading.
pub(crate) async fn resolve_in_background<F>(
    state: Arc<AppState>,
    request: F,
) -> Result<Session, AppError>
where
    F: Future<Output = Action> + Send + 'static,
{
    let task_state = state.clone();
    let joined = tokio::spawn(async move {
        let action = request.await;
        let mut session = task_state.session.lock().await;
        apply(&mut session, action);
        session.clone()
    })
    .await;

    match joined {
        Ok(session) => Ok(session),
        Err(e) => {
            error!(error = %e, "Analysis task aborted");
            let mut session = state.session.lock().await;
            apply(&mut session, Action::Resolved(Err(e.to_string())));
            Err(AppError::internal("Analysis task failed"))
        }
    }
}
