//! Edit-back projector: apply structural edits to an automation document.
//!
//! Every edit takes the current document and returns a new one; the input
//! is never mutated. Callers propagate the result to the host form.

pub mod conditions;
pub mod session;

pub use session::{EditPanel, EditTarget};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::document::{
    AutomationDocument, DEFAULT_BRANCH, Instruction, InstructionPath, ListPath, Trigger,
};
use crate::document::path::out_of_bounds;
use crate::error::BuilderError;

/// A confirmed edit, ready to apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Edit {
    #[serde(rename_all = "camelCase")]
    AddInstruction {
        parent: ListPath,
        index: usize,
        instruction: Instruction,
    },
    #[serde(rename_all = "camelCase")]
    RemoveInstruction { parent: ListPath, index: usize },
    #[serde(rename_all = "camelCase")]
    EditInstruction {
        parent: ListPath,
        index: usize,
        instruction: Instruction,
    },
    /// `key == None` adds a condition.
    #[serde(rename_all = "camelCase")]
    EditCondition {
        at: InstructionPath,
        key: Option<String>,
        new_key: String,
    },
    #[serde(rename_all = "camelCase")]
    RemoveCondition { at: InstructionPath, key: String },
    #[serde(rename_all = "camelCase")]
    EditTrigger { trigger: Option<Trigger> },
    #[serde(rename_all = "camelCase")]
    EditOutput { output: Option<Value> },
}

/// Apply `edit` to a copy of `doc`.
pub fn apply(doc: &AutomationDocument, edit: Edit) -> Result<AutomationDocument, BuilderError> {
    debug!(?edit, "applying automation edit");
    let mut next = doc.clone();
    match edit {
        Edit::AddInstruction {
            parent,
            index,
            instruction,
        } => {
            let list = parent.resolve_mut(&mut next)?;
            if index > list.len() {
                return Err(out_of_bounds(index, list.len()));
            }
            list.insert(index, instruction);
        }
        Edit::RemoveInstruction { parent, index } => {
            let list = parent.resolve_mut(&mut next)?;
            if index >= list.len() {
                return Err(out_of_bounds(index, list.len()));
            }
            list.remove(index);
        }
        Edit::EditInstruction {
            parent,
            index,
            instruction,
        } => {
            *parent.at(index).resolve_mut(&mut next)? = instruction;
        }
        Edit::EditCondition { at, key, new_key } => {
            if key.as_deref() == Some(DEFAULT_BRANCH) && new_key != DEFAULT_BRANCH {
                return Err(BuilderError::project(
                    "E007",
                    "The default branch cannot be renamed",
                ));
            }
            let branches = &mut at.conditions_mut(&mut next)?.branches;
            *branches = conditions::rebuild_branches(branches, key.as_deref(), &new_key);
        }
        Edit::RemoveCondition { at, key } => {
            if key == DEFAULT_BRANCH {
                return Err(BuilderError::project(
                    "E007",
                    "The default branch cannot be removed",
                ));
            }
            let branches = &mut at.conditions_mut(&mut next)?.branches;
            if branches.shift_remove(&key).is_none() {
                return Err(BuilderError::project(
                    "E004",
                    format!("Unknown condition branch '{}'", key),
                ));
            }
        }
        Edit::EditTrigger { trigger } => next.trigger = trigger,
        Edit::EditOutput { output } => next.output = output.filter(|v| !v.is_null()),
    }
    Ok(next)
}

pub fn add_instruction(
    doc: &AutomationDocument,
    parent: &ListPath,
    index: usize,
    instruction: Instruction,
) -> Result<AutomationDocument, BuilderError> {
    apply(
        doc,
        Edit::AddInstruction {
            parent: parent.clone(),
            index,
            instruction,
        },
    )
}

pub fn remove_instruction(
    doc: &AutomationDocument,
    parent: &ListPath,
    index: usize,
) -> Result<AutomationDocument, BuilderError> {
    apply(
        doc,
        Edit::RemoveInstruction {
            parent: parent.clone(),
            index,
        },
    )
}

pub fn edit_instruction(
    doc: &AutomationDocument,
    parent: &ListPath,
    index: usize,
    instruction: Instruction,
) -> Result<AutomationDocument, BuilderError> {
    apply(
        doc,
        Edit::EditInstruction {
            parent: parent.clone(),
            index,
            instruction,
        },
    )
}

pub fn edit_condition(
    doc: &AutomationDocument,
    at: &InstructionPath,
    key: Option<&str>,
    new_key: &str,
) -> Result<AutomationDocument, BuilderError> {
    apply(
        doc,
        Edit::EditCondition {
            at: at.clone(),
            key: key.map(str::to_string),
            new_key: new_key.to_string(),
        },
    )
}

pub fn edit_trigger(
    doc: &AutomationDocument,
    trigger: Option<Trigger>,
) -> Result<AutomationDocument, BuilderError> {
    apply(doc, Edit::EditTrigger { trigger })
}
