//! Form session state
//!
//! One value holds the form inputs and where the analysis stands. Every
//! user action goes through [`Session::update`], which returns the next
//! session plus, at most, one side effect for the caller to run. The
//! `Loading` phase is the submit guard: while a request is pending, a
//! second submit produces no effect.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::ai::AdvisorBackend;
use crate::models::{BudgetAdvice, BudgetField, BudgetInputs};
use crate::view::{discrepancies, AdviceView};

/// The only failure text a user ever sees; details go to the log
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Failed to fetch advice. Please check your API key and try again.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Loading,
    Failed { message: String },
    Ready { advice: BudgetAdvice },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Loading => "loading",
            Phase::Failed { .. } => "failed",
            Phase::Ready { .. } => "ready",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A form field changed; `raw` is the text as typed
    Edit { field: BudgetField, raw: String },
    /// Restore the starting form values
    Reset,
    /// The analyze button
    Submit,
    /// The advisory call finished
    Resolved(std::result::Result<BudgetAdvice, String>),
}

/// Work the caller must perform after an update
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Ask the model about this snapshot of the inputs
    RequestAdvice(BudgetInputs),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub inputs: BudgetInputs,
    pub phase: Phase,
    pub analyzed_at: Option<DateTime<Utc>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(BudgetInputs::default())
    }
}

impl Session {
    pub fn new(inputs: BudgetInputs) -> Self {
        Self {
            inputs,
            phase: Phase::Idle,
            analyzed_at: None,
        }
    }

    /// Apply one action
    pub fn update(mut self, action: Action) -> (Self, Option<Effect>) {
        match action {
            Action::Edit { field, raw } => {
                self.inputs.set_raw(field, &raw);
                (self, None)
            }
            Action::Reset => {
                self.inputs = BudgetInputs::default();
                // a pending request keeps its guard; its result is still accepted
                if self.phase != Phase::Loading {
                    self.phase = Phase::Idle;
                    self.analyzed_at = None;
                }
                (self, None)
            }
            Action::Submit => {
                if self.phase == Phase::Loading {
                    return (self, None);
                }
                self.phase = Phase::Loading;
                let snapshot = self.inputs;
                (self, Some(Effect::RequestAdvice(snapshot)))
            }
            Action::Resolved(result) => {
                if self.phase != Phase::Loading {
                    return (self, None);
                }
                match result {
                    Ok(advice) => {
                        self.phase = Phase::Ready { advice };
                        self.analyzed_at = Some(Utc::now());
                    }
                    Err(_) => {
                        self.phase = Phase::Failed {
                            message: GENERIC_FAILURE_MESSAGE.to_string(),
                        };
                    }
                }
                (self, None)
            }
        }
    }

    /// Whether the analyze button is enabled
    pub fn can_submit(&self) -> bool {
        self.phase != Phase::Loading
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// The error banner text, if the last request failed
    pub fn message(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed { message } => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn advice(&self) -> Option<&BudgetAdvice> {
        match &self.phase {
            Phase::Ready { advice } => Some(advice),
            _ => None,
        }
    }

    /// The result panel, present only once advice has arrived
    pub fn view(&self) -> Option<AdviceView> {
        self.advice().map(AdviceView::from_advice)
    }
}

/// Run an effect against a backend and turn the outcome into an action
pub async fn perform<B: AdvisorBackend + ?Sized>(effect: Effect, backend: &B) -> Action {
    match effect {
        Effect::RequestAdvice(inputs) => match backend.advise(&inputs).await {
            Ok(advice) => {
                for d in discrepancies(&advice) {
                    warn!("Advice arithmetic mismatch: {}", d);
                }
                info!(
                    savings = advice.summary.savings,
                    alerts = advice.alerts.len(),
                    "Advice received"
                );
                Action::Resolved(Ok(advice))
            }
            Err(e) => {
                error!(error = %e, model = backend.model(), "Advice request failed");
                Action::Resolved(Err(e.to_string()))
            }
        },
    }
}

/// One full submit cycle: guard, request, resolve
pub async fn run_submit<B: AdvisorBackend + ?Sized>(session: Session, backend: &B) -> Session {
    let (session, effect) = session.update(Action::Submit);
    match effect {
        Some(effect) => {
            let action = perform(effect, backend).await;
            session.update(action).0
        }
        None => session,
    }
}
