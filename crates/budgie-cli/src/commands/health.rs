//! AI backend health command implementation

use anyhow::Result;

use budgie_core::{AIClient, AdvisorBackend};

/// Show AI backend configuration and check reachability
pub async fn cmd_health() -> Result<()> {
    println!("🔍 Checking AI backend...\n");

    let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "gemini".to_string());
    println!("  AI_BACKEND: {}", backend);

    let Some(client) = AIClient::from_env() else {
        println!("\n⚠️  AI backend '{}' is not configured", backend);
        println!("\nTo configure:");
        println!("  Gemini:            export GEMINI_API_KEY=...");
        println!("  OpenAI-compatible: export AI_BACKEND=openai_compatible");
        println!("                     export OPENAI_COMPATIBLE_HOST=http://localhost:8080");
        return Ok(());
    };

    if matches!(client, AIClient::Gemini(_))
        && std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .is_err()
    {
        println!("  ⚠️  GEMINI_API_KEY not set; requests will be rejected");
    }

    println!("  Backend: {}", client.kind());
    println!("  Host:    {}", client.host());
    println!("  Model:   {}\n", client.model());

    print!("Checking availability... ");
    if client.health_check().await {
        println!("✅ Connected");
    } else {
        println!("❌ Failed");
        println!("\n⚠️  Could not reach {} at {}", client.model(), client.host());
    }

    Ok(())
}
