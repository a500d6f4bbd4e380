//! Analysis command implementations

use anyhow::{anyhow, Context, Result};
use tracing::debug;

use budgie_core::ai::request::build_request;
use budgie_core::session::run_submit;
use budgie_core::view::render_text;
use budgie_core::{AIClient, AdvisorBackend, BudgetInputs, PromptLibrary, Session};

/// Analyze a budget with the configured AI backend
pub async fn cmd_analyze(inputs: BudgetInputs, json: bool, model: Option<&str>) -> Result<()> {
    let client = AIClient::from_env().context(
        "AI backend not configured. Set GEMINI_API_KEY, or AI_BACKEND=openai_compatible with OPENAI_COMPATIBLE_HOST",
    )?;
    let client = match model {
        Some(m) => client.with_model(m),
        None => client,
    };

    println!("🧮 Analyzing budget with {} ({})...\n", client.model(), client.kind());

    let output = analyze_with(&client, inputs, json).await?;
    print!("{}", output);

    Ok(())
}

/// Run one analysis and format the result
///
/// Any advisory failure becomes the generic failure message; the detail is
/// only logged.
pub async fn analyze_with(client: &AIClient, inputs: BudgetInputs, json: bool) -> Result<String> {
    debug!(?inputs, "Submitting budget");
    let session = run_submit(Session::new(inputs), client).await;

    if let Some(message) = session.message() {
        return Err(anyhow!("{}", message));
    }

    let advice = session
        .advice()
        .ok_or_else(|| anyhow!("No advice was produced"))?;

    if json {
        let mut out = serde_json::to_string_pretty(advice)?;
        out.push('\n');
        return Ok(out);
    }

    let view = session
        .view()
        .ok_or_else(|| anyhow!("No advice was produced"))?;
    let mut out = render_text(&view);
    if let Some(at) = session.analyzed_at {
        out.push_str(&format!("\nAnalyzed at {}\n", at.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    Ok(out)
}

/// Print the request prompt for a budget
pub fn cmd_prompt(inputs: &BudgetInputs) -> Result<()> {
    let mut library = PromptLibrary::new();
    print!("{}", render_prompt(&mut library, inputs)?);
    Ok(())
}

/// Render the system and user sections of the request
pub fn render_prompt(library: &mut PromptLibrary, inputs: &BudgetInputs) -> Result<String> {
    let request = build_request(library, inputs)?;

    let mut out = String::new();
    if let Some(system) = request.system {
        out.push_str("--- System ---\n");
        out.push_str(&system);
        out.push_str("\n\n");
    }
    out.push_str("--- User ---\n");
    out.push_str(&request.user);
    out.push('\n');
    Ok(out)
}
