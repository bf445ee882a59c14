//! Layout and compile settings.

use serde::{Deserialize, Serialize};

use super::Compiler;
use super::endpoint::WorkspaceEndpoints;

pub const BLOCK_WIDTH: f64 = 350.0;
pub const ROW_HEIGHT: f64 = 100.0;

/// Spacing of the compiled graph. Placeholder rows take half a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Layout {
    pub block_width: f64,
    pub row_height: f64,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            block_width: BLOCK_WIDTH,
            row_height: ROW_HEIGHT,
        }
    }
}

impl Layout {
    pub fn placeholder_height(&self) -> f64 {
        self.row_height / 2.0
    }
}

/// Settings passed by the console when compiling through the wasm bindings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompileOptions {
    pub layout: Layout,
    /// Public API base URL, e.g. `https://api.example.com/v2`.
    pub api_url: Option<String>,
    pub workspace_id: Option<String>,
    /// Used for `endpoint: true` when the document has no `slug`.
    pub automation_slug: Option<String>,
}

impl CompileOptions {
    pub fn compiler(&self) -> Compiler {
        let mut compiler = Compiler::new(self.layout.clone());
        if let (Some(api_url), Some(workspace_id)) = (&self.api_url, &self.workspace_id) {
            compiler = compiler.with_endpoints(WorkspaceEndpoints {
                api_url: api_url.clone(),
                workspace_id: workspace_id.clone(),
            });
        }
        if let Some(slug) = &self.automation_slug {
            compiler = compiler.with_automation_slug(slug.clone());
        }
        compiler
    }
}
