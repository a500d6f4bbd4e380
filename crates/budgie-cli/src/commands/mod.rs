//! CLI command implementations
//!
//! Commands are organized by area:
//! - `analyze` - Budget analysis and request prompt preview
//! - `health` - AI backend configuration check
//! - `prompts` - Prompt library management commands
//! - `schema` - Declared output schema
//! - `serve` - Web server command

pub mod analyze;
pub mod health;
pub mod prompts;
pub mod schema;
pub mod serve;

// Re-export command functions for main.rs
pub use analyze::*;
pub use health::*;
pub use prompts::*;
pub use schema::*;
pub use serve::*;
