//! Budgie Core Library
//!
//! Shared functionality for the Budgie household budget advisor:
//! - Budget inputs and the advice payload returned by the model
//! - Pluggable hosted AI backends (Gemini, OpenAI-compatible, mock)
//! - Prompt library for customizable AI prompts
//! - Declared structured-output schema and response parsing
//! - View model derivation for summary cards and chart series
//! - Form session reducer

pub mod ai;
pub mod error;
pub mod models;
pub mod prompts;
pub mod session;
pub mod view;

/// Test utilities including mock model server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    AIClient, AdvisorBackend, GeminiBackend, MockBackend, OpenAICompatibleBackend,
};
pub use error::{Error, Result};
pub use models::{
    AdviceSummary, BudgetAdvice, BudgetField, BudgetInputs, CategorySplit, Prediction,
};
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary};
pub use session::{Action, Effect, Phase, Session, GENERIC_FAILURE_MESSAGE};
pub use view::{AdviceView, CategorySlice, ComparisonBar, Discrepancy, LineItem};
