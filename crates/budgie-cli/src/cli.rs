//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use budgie_core::{BudgetField, BudgetInputs};

/// Budgie - AI household budget advisor
#[derive(Parser)]
#[command(name = "budgie")]
#[command(about = "Monthly budget analysis by a hosted AI model", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask the model to analyze a monthly budget
    Analyze {
        #[command(flatten)]
        budget: BudgetArgs,

        /// Print the raw advice JSON instead of the report
        #[arg(long)]
        json: bool,

        /// Override the model for this request
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Print the request prompt for a budget (no network)
    Prompt {
        #[command(flatten)]
        budget: BudgetArgs,
    },

    /// Manage prompt templates
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },

    /// Print the declared output schema
    Schema {
        /// Print Gemini's responseSchema dialect instead of JSON Schema
        #[arg(long)]
        gemini: bool,
    },

    /// Show AI backend configuration and reachability
    Health,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing the form's static files
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Allowed CORS origin (repeatable; same-origin only if omitted)
        #[arg(long = "allow-origin")]
        allow_origins: Vec<String>,
    },
}

/// The eight form fields as raw text
///
/// Values are coerced like form input: blank or invalid text becomes zero.
/// Omitted fields keep the form's starting values.
#[derive(Args, Debug, Default)]
pub struct BudgetArgs {
    /// Monthly income
    #[arg(long)]
    pub income: Option<String>,

    /// Rent
    #[arg(long)]
    pub rent: Option<String>,

    /// Food
    #[arg(long)]
    pub food: Option<String>,

    /// Travel
    #[arg(long)]
    pub travel: Option<String>,

    /// Loan payments
    #[arg(long)]
    pub loans: Option<String>,

    /// Shopping
    #[arg(long)]
    pub shopping: Option<String>,

    /// Entertainment
    #[arg(long)]
    pub entertainment: Option<String>,

    /// Luxury
    #[arg(long)]
    pub luxury: Option<String>,
}

impl BudgetArgs {
    fn raw(&self, field: BudgetField) -> Option<&str> {
        match field {
            BudgetField::Income => self.income.as_deref(),
            BudgetField::Rent => self.rent.as_deref(),
            BudgetField::Food => self.food.as_deref(),
            BudgetField::Travel => self.travel.as_deref(),
            BudgetField::Loans => self.loans.as_deref(),
            BudgetField::Shopping => self.shopping.as_deref(),
            BudgetField::Entertainment => self.entertainment.as_deref(),
            BudgetField::Luxury => self.luxury.as_deref(),
        }
    }

    pub fn to_inputs(&self) -> BudgetInputs {
        let mut inputs = BudgetInputs::default();
        for &field in BudgetField::all() {
            if let Some(raw) = self.raw(field) {
                inputs.set_raw(field, raw);
            }
        }
        inputs
    }
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List all available prompts and their override status
    List,

    /// Show the content of a specific prompt
    Show {
        /// Prompt ID (e.g., budget_advice)
        prompt_id: String,
    },

    /// Show the path where prompt overrides should be placed
    Path,
}
