//! The single edit-panel slot.
//!
//! The console shows at most one edit panel. Opening a panel replaces
//! whatever was open; confirming turns the panel's target plus the submitted
//! value into an [`Edit`]; closing resolves to nothing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Edit;
use crate::document::{Instruction, InstructionPath, ListPath, Trigger};
use crate::error::BuilderError;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditTarget {
    #[default]
    None,
    AddingInstruction { parent: ListPath, index: usize },
    EditingInstruction { parent: ListPath, index: usize },
    EditingCondition { at: InstructionPath, key: Option<String> },
    EditingTrigger,
    EditingOutput,
}

/// What the console needs to render the open panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditPanel {
    pub target: EditTarget,
    /// Current value the form is seeded with.
    pub seed: Option<Value>,
    /// Form schema, when the edited instruction has one.
    pub schema: Option<Value>,
}

impl EditTarget {
    pub fn is_open(&self) -> bool {
        !matches!(self, EditTarget::None)
    }

    /// Turn the submitted `value` into an edit. `Ok(None)` means the
    /// submission is equivalent to closing the panel (blank condition key).
    pub fn resolve(&self, value: Value) -> Result<Option<Edit>, BuilderError> {
        let edit = match self {
            EditTarget::None => {
                return Err(BuilderError::project("E005", "No edit panel is open"));
            }
            EditTarget::AddingInstruction { parent, index } => Edit::AddInstruction {
                parent: parent.clone(),
                index: *index,
                instruction: instruction_from(value)?,
            },
            EditTarget::EditingInstruction { parent, index } => Edit::EditInstruction {
                parent: parent.clone(),
                index: *index,
                instruction: instruction_from(value)?,
            },
            EditTarget::EditingCondition { at, key } => {
                let new_key = match value {
                    Value::String(new_key) => new_key,
                    other => return Err(mismatch("a condition expression string", &other)),
                };
                let new_key = new_key.trim();
                if new_key.is_empty() {
                    return Ok(None);
                }
                Edit::EditCondition {
                    at: at.clone(),
                    key: key.clone(),
                    new_key: new_key.to_string(),
                }
            }
            EditTarget::EditingTrigger => match value {
                Value::Null => Edit::EditTrigger { trigger: None },
                Value::Object(object) => Edit::EditTrigger {
                    trigger: Some(Trigger(object)),
                },
                other => return Err(mismatch("a trigger object", &other)),
            },
            EditTarget::EditingOutput => Edit::EditOutput {
                output: Some(value).filter(|v| !v.is_null()),
            },
        };
        Ok(Some(edit))
    }
}

fn instruction_from(value: Value) -> Result<Instruction, BuilderError> {
    match value {
        Value::Object(object) if object.len() == 1 => Ok(Instruction::from_value(Value::Object(object))),
        other => Err(mismatch("a single-key instruction object", &other)),
    }
}

fn mismatch(expected: &str, found: &Value) -> BuilderError {
    BuilderError::project("E006", format!("Expected {}, got {}", expected, found))
}
