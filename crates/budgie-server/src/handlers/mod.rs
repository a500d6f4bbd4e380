//! HTTP request handlers organized by area
//!
//! Each submodule contains handlers for a specific API area.

pub mod analyze;
pub mod health;
pub mod session;

// Re-export all handlers for use in router
pub use analyze::*;
pub use health::*;
pub use session::*;
