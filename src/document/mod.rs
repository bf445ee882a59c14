//! Automation document model: JSON ↔ Rust types and structural paths.

pub mod path;
pub mod types;

pub use path::{InstructionPath, ListPath, ListStep, Nested};
pub use types::*;

use crate::error::BuilderError;

/// Deserialize an automation JSON string. Shape problems inside the document
/// degrade (see [`Instruction::from_value`]); only invalid JSON, or JSON that
/// is not an object, is rejected.
pub fn parse(json: &str) -> Result<AutomationDocument, BuilderError> {
    serde_json::from_str::<AutomationDocument>(json).map_err(|e| {
        BuilderError::parse("P001", format!("Failed to parse automation JSON: {}", e))
    })
}
