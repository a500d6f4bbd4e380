//! Budgie CLI - AI household budget advisor
//!
//! Usage:
//!   budgie analyze --income 25000 --rent 8000    Analyze a monthly budget
//!   budgie prompt                                 Print the request prompt
//!   budgie schema                                 Print the output schema
//!   budgie serve --port 3000                      Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Analyze {
            budget,
            json,
            model,
        } => commands::cmd_analyze(budget.to_inputs(), json, model.as_deref()).await,
        Commands::Prompt { budget } => commands::cmd_prompt(&budget.to_inputs()),
        Commands::Prompts { action } => match action {
            None | Some(PromptsAction::List) => commands::cmd_prompts_list(),
            Some(PromptsAction::Show { prompt_id }) => commands::cmd_prompts_show(&prompt_id),
            Some(PromptsAction::Path) => commands::cmd_prompts_path(),
        },
        Commands::Schema { gemini } => commands::cmd_schema(gemini),
        Commands::Health => commands::cmd_health().await,
        Commands::Serve {
            port,
            host,
            static_dir,
            allow_origins,
        } => commands::cmd_serve(&host, port, static_dir.as_deref(), allow_origins).await,
    }
}
