//! Advisory request rendering
//!
//! Builds the natural-language request from a `BudgetInputs` snapshot. The
//! budget rules live in the prompt text only.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{Error, Result};
use crate::models::{BudgetField, BudgetInputs};
use crate::prompts::{PromptId, PromptLibrary};

/// A rendered advisory request
#[derive(Debug, Clone, PartialEq)]
pub struct AdviceRequest {
    /// Instruction for the model, if the prompt has a `# System` section
    pub system: Option<String>,
    /// The user message embedding the eight figures and the rules
    pub user: String,
}

/// Template variables for the eight figures
pub fn prompt_vars(inputs: &BudgetInputs) -> HashMap<&'static str, String> {
    BudgetField::all()
        .iter()
        .map(|&field| (field.as_str(), format!("{}", inputs.get(field))))
        .collect()
}

/// Render the advisory request from the prompt library
pub fn build_request(prompts: &mut PromptLibrary, inputs: &BudgetInputs) -> Result<AdviceRequest> {
    let template = prompts.get(PromptId::BudgetAdvice)?;
    let vars = prompt_vars(inputs);
    Ok(AdviceRequest {
        system: template.system_section().map(str::to_string),
        user: template.render_user(&vars),
    })
}

/// Render the advisory request from a library shared between clones
pub(crate) fn build_request_shared(
    prompts: &RwLock<PromptLibrary>,
    inputs: &BudgetInputs,
) -> Result<AdviceRequest> {
    let mut prompts = prompts
        .write()
        .map_err(|_| Error::Prompt("Failed to acquire prompt library lock".into()))?;
    build_request(&mut prompts, inputs)
}
