//! Output schema command implementation

use anyhow::Result;

use budgie_core::ai::schema::{response_schema, to_gemini_schema};

/// Print the declared output schema
pub fn cmd_schema(gemini: bool) -> Result<()> {
    println!("{}", schema_json(gemini)?);
    Ok(())
}

pub fn schema_json(gemini: bool) -> Result<String> {
    let schema = response_schema();
    let schema = if gemini {
        to_gemini_schema(&schema)
    } else {
        schema
    };
    Ok(serde_json::to_string_pretty(&schema)?)
}
