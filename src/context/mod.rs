//! Builder context: the surface the flow editor's node and edge components
//! talk to.
//!
//! Owns the document being edited, the single edit-panel slot and the
//! schema registry. Every confirmed edit replaces the document and is
//! reported through `on_change`.

pub mod builtins;
pub mod schema;

pub use schema::{AppInfo, InstalledApp, Schema, SchemaRegistry, SiblingAutomation};

use serde_json::Value;
use tracing::debug;

use crate::document::{AutomationDocument, InstructionPath, ListPath};
use crate::document::path::out_of_bounds;
use crate::edit::{self, Edit, EditPanel, EditTarget};
use crate::error::BuilderError;
use crate::flow::{Compiler, FlowGraph};

type ChangeHandler = Box<dyn FnMut(&AutomationDocument)>;

pub struct BuilderContext {
    document: AutomationDocument,
    registry: SchemaRegistry,
    compiler: Compiler,
    panel: EditTarget,
    on_change: Option<ChangeHandler>,
}

impl BuilderContext {
    pub fn new(document: AutomationDocument, registry: SchemaRegistry) -> Self {
        BuilderContext {
            document,
            registry,
            compiler: Compiler::default(),
            panel: EditTarget::None,
            on_change: None,
        }
    }

    pub fn with_compiler(mut self, compiler: Compiler) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn on_change(mut self, handler: impl FnMut(&AutomationDocument) + 'static) -> Self {
        self.on_change = Some(Box::new(handler));
        self
    }

    pub fn document(&self) -> &AutomationDocument {
        &self.document
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// The currently open panel, if any.
    pub fn panel(&self) -> &EditTarget {
        &self.panel
    }

    pub fn graph(&self) -> FlowGraph {
        self.compiler.compile(&self.document)
    }

    // -------------------------------------------------------------------------
    // Mutation entry points
    // -------------------------------------------------------------------------

    /// Open the instruction picker for a slot of `parent`.
    pub fn add_instruction(&mut self, parent: ListPath, index: usize) -> Result<EditPanel, BuilderError> {
        let len = parent.resolve(&self.document)?.len();
        if index > len {
            return Err(out_of_bounds(index, len));
        }
        Ok(self.open(EditTarget::AddingInstruction { parent, index }, None, None))
    }

    /// Remove immediately. Closes any open panel, whose path may now be stale.
    pub fn remove_instruction(&mut self, parent: &ListPath, index: usize) -> Result<(), BuilderError> {
        let next = edit::remove_instruction(&self.document, parent, index)?;
        self.panel = EditTarget::None;
        self.commit(next);
        Ok(())
    }

    pub fn edit_instruction(&mut self, parent: ListPath, index: usize) -> Result<EditPanel, BuilderError> {
        let instruction = parent.at(index).resolve(&self.document)?;
        let seed = instruction.to_value();
        let schema = self.registry.get_schema(instruction.kind());
        Ok(self.open(EditTarget::EditingInstruction { parent, index }, Some(seed), schema))
    }

    /// Open the key prompt of a condition branch. `key == None` adds a
    /// condition.
    pub fn edit_condition(
        &mut self,
        at: InstructionPath,
        key: Option<String>,
    ) -> Result<EditPanel, BuilderError> {
        at.conditions(&self.document)?;
        let seed = key.clone().map(Value::String);
        Ok(self.open(EditTarget::EditingCondition { at, key }, seed, None))
    }

    pub fn remove_condition(&mut self, at: InstructionPath, key: String) -> Result<(), BuilderError> {
        let next = edit::apply(&self.document, Edit::RemoveCondition { at, key })?;
        self.panel = EditTarget::None;
        self.commit(next);
        Ok(())
    }

    pub fn edit_trigger(&mut self) -> EditPanel {
        let seed = self.document.trigger.as_ref().map(|t| t.to_value());
        self.open(EditTarget::EditingTrigger, seed, None)
    }

    pub fn edit_output(&mut self) -> EditPanel {
        let seed = self.document.output.clone();
        self.open(EditTarget::EditingOutput, seed, None)
    }

    /// Submit the open panel. Returns the new document, or `None` when the
    /// submission amounts to closing the panel.
    pub fn confirm(&mut self, value: Value) -> Result<Option<&AutomationDocument>, BuilderError> {
        let Some(edit) = self.panel.resolve(value)? else {
            self.panel = EditTarget::None;
            return Ok(None);
        };
        let next = edit::apply(&self.document, edit)?;
        self.panel = EditTarget::None;
        self.commit(next);
        Ok(Some(&self.document))
    }

    /// Close the open panel without touching the document.
    pub fn cancel(&mut self) {
        self.panel = EditTarget::None;
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    pub fn get_app(&self, kind: &str) -> AppInfo {
        self.registry.get_app(kind)
    }

    pub fn get_schema(&self, kind: &str) -> Option<Schema> {
        self.registry.get_schema(kind)
    }

    pub fn is_editable(&self, kind: &str) -> bool {
        self.registry.is_editable(kind)
    }

    fn open(&mut self, target: EditTarget, seed: Option<Value>, schema: Option<Schema>) -> EditPanel {
        if self.panel.is_open() {
            debug!(previous = ?self.panel, "replacing open edit panel");
        }
        self.panel = target.clone();
        EditPanel { target, seed, schema }
    }

    fn commit(&mut self, next: AutomationDocument) {
        self.document = next;
        if let Some(handler) = self.on_change.as_mut() {
            handler(&self.document);
        }
    }
}
