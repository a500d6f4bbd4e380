//! JSON parsing helpers for AI backend responses
//!
//! Structured-output modes usually return bare JSON, but some servers wrap
//! it in a Markdown fence or add a sentence around it. The parser takes the
//! outermost `{...}` and deserializes it strictly: every section of
//! `BudgetAdvice` must be present.

use crate::error::{Error, Result};
use crate::models::BudgetAdvice;

const RAW_EXCERPT_LEN: usize = 200;

/// Parse budget advice from the model's response text
///
/// An empty or whitespace-only response is an error, never an empty advice.
pub fn parse_advice(response: &str) -> Result<BudgetAdvice> {
    let response = response.trim();
    if response.is_empty() {
        return Err(Error::EmptyResponse);
    }

    let start = response.find('{');
    let end = response.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => {
            let json_str = &response[s..=e];
            serde_json::from_str(json_str).map_err(|e| {
                Error::InvalidData(format!(
                    "Invalid advice JSON from AI: {} | Raw: {}",
                    e,
                    excerpt(json_str)
                ))
            })
        }
        _ => Err(Error::InvalidData(format!(
            "No JSON found in AI response | Raw: {}",
            excerpt(response)
        ))),
    }
}

/// Truncate long responses for error messages (on a char boundary)
fn excerpt(s: &str) -> String {
    match s.char_indices().nth(RAW_EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
