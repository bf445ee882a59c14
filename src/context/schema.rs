//! Instruction schema registry.
//!
//! Resolves the form schema and owning app of an instruction kind. Lookup
//! order: builtin instructions, then sibling automations of the workspace
//! (except the one being edited), then installed apps. First match wins.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::builtins;

pub type Schema = Value;

/// Namespace shown for builtin instructions.
pub const BUILTIN_APP: &str = "Builtin";
/// Namespace shown for calls to sibling automations, when the workspace has no name.
pub const WORKSPACE_APP: &str = "Workspace";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl AppInfo {
    /// Fallback for kinds no registry tier knows about.
    pub fn generic(kind: &str) -> Self {
        AppInfo {
            display_name: kind.to_string(),
            icon: None,
        }
    }
}

/// Another automation of the workspace, callable as an instruction named
/// after its slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiblingAutomation {
    pub slug: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Argument schemas keyed by argument name.
    #[serde(default)]
    pub arguments: Option<Value>,
}

impl SiblingAutomation {
    fn call_schema(&self) -> Schema {
        let mut schema = json!({
            "type": "object",
            "properties": self.arguments.clone().unwrap_or_else(|| json!({})),
        });
        if let Some(name) = &self.name {
            schema["title"] = json!(name);
        }
        if let Some(description) = &self.description {
            schema["description"] = json!(description);
        }
        schema
    }
}

/// An app installed in the workspace. Its instructions are addressed as
/// `{slug}.{instruction}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledApp {
    pub slug: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub instructions: IndexMap<String, Schema>,
}

impl InstalledApp {
    fn instruction(&self, kind: &str) -> Option<&Schema> {
        let name = kind.strip_prefix(self.slug.as_str())?.strip_prefix('.')?;
        self.instructions.get(name)
    }

    fn info(&self) -> AppInfo {
        AppInfo {
            display_name: self.display_name.clone().unwrap_or_else(|| self.slug.clone()),
            icon: self.icon.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchemaRegistry {
    pub workspace_name: Option<String>,
    pub automations: Vec<SiblingAutomation>,
    pub apps: Vec<InstalledApp>,
    /// Slug of the automation being edited, hidden from the sibling tier.
    pub current_automation: Option<String>,
}

enum Owner<'a> {
    Builtin(&'a Schema),
    Automation(&'a SiblingAutomation),
    App(&'a InstalledApp, &'a Schema),
}

impl SchemaRegistry {
    pub fn new() -> Self {
        SchemaRegistry::default()
    }

    pub fn with_automations(mut self, automations: Vec<SiblingAutomation>) -> Self {
        self.automations = automations;
        self
    }

    pub fn with_apps(mut self, apps: Vec<InstalledApp>) -> Self {
        self.apps = apps;
        self
    }

    pub fn with_current_automation(mut self, slug: impl Into<String>) -> Self {
        self.current_automation = Some(slug.into());
        self
    }

    pub fn get_schema(&self, kind: &str) -> Option<Schema> {
        match self.owner(kind)? {
            Owner::Builtin(schema) => Some(schema.clone()),
            Owner::Automation(automation) => Some(automation.call_schema()),
            Owner::App(_, schema) => Some(schema.clone()),
        }
    }

    pub fn get_app(&self, kind: &str) -> AppInfo {
        match self.owner(kind) {
            Some(Owner::Builtin(_)) => AppInfo {
                display_name: BUILTIN_APP.into(),
                icon: None,
            },
            Some(Owner::Automation(_)) => AppInfo {
                display_name: self
                    .workspace_name
                    .clone()
                    .unwrap_or_else(|| WORKSPACE_APP.into()),
                icon: None,
            },
            Some(Owner::App(app, _)) => app.info(),
            None => AppInfo::generic(kind),
        }
    }

    /// Every kind the instruction picker offers, in lookup order.
    pub fn available_kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = builtins::kinds().map(str::to_string).collect();
        kinds.extend(
            self.automations
                .iter()
                .filter(|a| self.current_automation.as_deref() != Some(a.slug.as_str()))
                .map(|a| a.slug.clone()),
        );
        for app in &self.apps {
            kinds.extend(app.instructions.keys().map(|name| format!("{}.{}", app.slug, name)));
        }
        kinds
    }

    /// Whether the kind can be edited as a flat form.
    pub fn is_editable(&self, kind: &str) -> bool {
        if matches!(kind, "all" | "conditions") {
            return false;
        }
        self.get_schema(kind)
            .is_some_and(|schema| schema.get("type").is_some())
    }

    fn owner(&self, kind: &str) -> Option<Owner<'_>> {
        if let Some(schema) = builtins::schema(kind) {
            return Some(Owner::Builtin(schema));
        }
        if let Some(automation) = self
            .automations
            .iter()
            .filter(|a| self.current_automation.as_deref() != Some(a.slug.as_str()))
            .find(|a| a.slug == kind)
        {
            return Some(Owner::Automation(automation));
        }
        self.apps
            .iter()
            .find_map(|app| app.instruction(kind).map(|schema| Owner::App(app, schema)))
    }
}
