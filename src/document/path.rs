//! Structural addressing inside an automation document.
//!
//! Compiled nodes and edges carry these paths instead of references to the
//! containers they came from. Edits resolve a path against the document to
//! find the list (or conditions instruction) they must change.

use serde::{Deserialize, Serialize};

use super::types::{AutomationDocument, Conditions, DEFAULT_BRANCH, Instruction};
use crate::error::BuilderError;

/// Which nested list of a block instruction a path step enters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Nested {
    /// A `conditions` branch.
    Branch { key: String },
    /// The `do` list of a `repeat`.
    Body,
    /// The children of an `all`.
    Parallel,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListStep {
    pub index: usize,
    pub into: Nested,
}

/// Address of an instruction list. The empty path is the root `do` list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListPath(pub Vec<ListStep>);

/// Address of a single instruction: its list plus its index in that list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstructionPath {
    pub parent: ListPath,
    pub index: usize,
}

impl ListPath {
    pub fn root() -> Self {
        ListPath(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, index: usize, into: Nested) -> Self {
        let mut steps = self.0.clone();
        steps.push(ListStep { index, into });
        ListPath(steps)
    }

    pub fn at(&self, index: usize) -> InstructionPath {
        InstructionPath {
            parent: self.clone(),
            index,
        }
    }

    /// Resolve to the addressed list. A missing `default` branch resolves to
    /// an empty list, since every conditions block has one.
    pub fn resolve<'a>(&self, doc: &'a AutomationDocument) -> Result<&'a [Instruction], BuilderError> {
        let mut list: &'a [Instruction] = &doc.instructions;
        for step in &self.0 {
            let instruction = list.get(step.index).ok_or_else(|| out_of_bounds(step.index, list.len()))?;
            list = match (&step.into, instruction) {
                (Nested::Branch { key }, Instruction::Conditions(conditions)) => {
                    match conditions.branch(key) {
                        Some(branch) => branch,
                        None if key == DEFAULT_BRANCH => &[],
                        None => return Err(unknown_branch(key)),
                    }
                }
                (Nested::Body, Instruction::Repeat(repeat)) => repeat.body.as_slice(),
                (Nested::Parallel, Instruction::All(children)) => children.as_slice(),
                (into, instruction) => return Err(not_a_list(into, instruction)),
            };
        }
        Ok(list)
    }

    /// Mutable counterpart of [`ListPath::resolve`]. Creates the `default`
    /// branch when it is entered but missing.
    pub fn resolve_mut<'a>(
        &self,
        doc: &'a mut AutomationDocument,
    ) -> Result<&'a mut Vec<Instruction>, BuilderError> {
        let mut list = &mut doc.instructions;
        for step in &self.0 {
            let len = list.len();
            let instruction = list
                .get_mut(step.index)
                .ok_or_else(|| out_of_bounds(step.index, len))?;
            list = match (&step.into, instruction) {
                (Nested::Branch { key }, Instruction::Conditions(conditions)) => {
                    if key == DEFAULT_BRANCH {
                        conditions.branches.entry(key.clone()).or_default()
                    } else {
                        conditions
                            .branches
                            .get_mut(key)
                            .ok_or_else(|| unknown_branch(key))?
                    }
                }
                (Nested::Body, Instruction::Repeat(repeat)) => &mut repeat.body,
                (Nested::Parallel, Instruction::All(children)) => children,
                (into, instruction) => return Err(not_a_list(into, instruction)),
            };
        }
        Ok(list)
    }
}

impl InstructionPath {
    pub fn resolve<'a>(&self, doc: &'a AutomationDocument) -> Result<&'a Instruction, BuilderError> {
        let list = self.parent.resolve(doc)?;
        list.get(self.index)
            .ok_or_else(|| out_of_bounds(self.index, list.len()))
    }

    pub fn resolve_mut<'a>(
        &self,
        doc: &'a mut AutomationDocument,
    ) -> Result<&'a mut Instruction, BuilderError> {
        let list = self.parent.resolve_mut(doc)?;
        let len = list.len();
        list.get_mut(self.index)
            .ok_or_else(|| out_of_bounds(self.index, len))
    }

    /// Resolve to the addressed `conditions` instruction.
    pub fn conditions<'a>(&self, doc: &'a AutomationDocument) -> Result<&'a Conditions, BuilderError> {
        match self.resolve(doc)? {
            Instruction::Conditions(conditions) => Ok(conditions),
            other => Err(not_conditions(other)),
        }
    }

    pub fn conditions_mut<'a>(
        &self,
        doc: &'a mut AutomationDocument,
    ) -> Result<&'a mut Conditions, BuilderError> {
        match self.resolve_mut(doc)? {
            Instruction::Conditions(conditions) => Ok(conditions),
            other => Err(not_conditions(other)),
        }
    }
}

fn not_conditions(instruction: &Instruction) -> BuilderError {
    BuilderError::project(
        "E003",
        format!("Expected a conditions instruction, found '{}'", instruction.kind()),
    )
}

pub(crate) fn out_of_bounds(index: usize, len: usize) -> BuilderError {
    BuilderError::project(
        "E001",
        format!("Index {} is out of bounds for a list of {} instructions", index, len),
    )
}

fn unknown_branch(key: &str) -> BuilderError {
    BuilderError::project("E004", format!("Unknown condition branch '{}'", key))
}

fn not_a_list(into: &Nested, instruction: &Instruction) -> BuilderError {
    let expected = match into {
        Nested::Branch { .. } => "conditions",
        Nested::Body => "repeat",
        Nested::Parallel => "all",
    };
    BuilderError::project(
        "E002",
        format!(
            "Path expects a '{}' instruction, found '{}'",
            expected,
            instruction.kind()
        ),
    )
}
