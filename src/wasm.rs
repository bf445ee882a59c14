//! WASM entry points for browser use.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::document::AutomationDocument;
use crate::edit::Edit;
use crate::error::BuilderError;
use crate::flow::{CompileOptions, FlowGraph};

/// Compile an automation JSON into the flow graph rendered by the editor.
/// `options_json` may be empty for the default layout.
/// Returns `{status: "success", graph}` or `{status: "errors", errors}`.
#[wasm_bindgen]
pub fn compile_flow(doc_json: &str, options_json: &str) -> JsValue {
    let result = compile_flow_inner(doc_json, options_json);
    to_js(&result)
}

/// Plain JS objects rather than `Map`s, so the editor can read `data.label`.
fn to_js<T: Serialize>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::NULL)
}

fn compile_flow_inner(doc_json: &str, options_json: &str) -> FlowResult {
    let doc = match crate::document::parse(doc_json) {
        Ok(doc) => doc,
        Err(e) => return FlowResult::Errors { errors: vec![ErrorDto::from(e)] },
    };
    let options = match parse_options(options_json) {
        Ok(options) => options,
        Err(e) => return FlowResult::Errors { errors: vec![ErrorDto::from(e)] },
    };
    FlowResult::Success {
        graph: options.compiler().compile(&doc),
    }
}

fn parse_options(json: &str) -> Result<CompileOptions, BuilderError> {
    if json.trim().is_empty() {
        return Ok(CompileOptions::default());
    }
    serde_json::from_str(json).map_err(|e| {
        BuilderError::parse("P001", format!("Failed to parse compile options JSON: {}", e))
    })
}

/// Apply one confirmed edit (see [`Edit`]) to an automation JSON.
/// Returns `{status: "success", document}` or `{status: "errors", errors}`.
#[wasm_bindgen]
pub fn apply_edit(doc_json: &str, edit_json: &str) -> JsValue {
    let result = apply_edit_inner(doc_json, edit_json);
    to_js(&result)
}

fn apply_edit_inner(doc_json: &str, edit_json: &str) -> EditResult {
    let doc = match crate::document::parse(doc_json) {
        Ok(doc) => doc,
        Err(e) => return EditResult::Errors { errors: vec![ErrorDto::from(e)] },
    };
    let edit = match serde_json::from_str::<Edit>(edit_json) {
        Ok(edit) => edit,
        Err(e) => {
            return EditResult::Errors {
                errors: vec![ErrorDto {
                    code: "P001".into(),
                    phase: "Parse".into(),
                    message: format!("Failed to parse edit JSON: {}", e),
                    node_id: None,
                }],
            };
        }
    };
    match crate::edit::apply(&doc, edit) {
        Ok(document) => EditResult::Success { document },
        Err(e) => EditResult::Errors {
            errors: vec![ErrorDto::from(e)],
        },
    }
}

/// Check a compiled flow graph JSON against the structural rules.
/// Returns a JSON array of error objects.
#[wasm_bindgen]
pub fn validate_flow(graph_json: &str) -> JsValue {
    let result = validate_flow_inner(graph_json);
    to_js(&result)
}

fn validate_flow_inner(graph_json: &str) -> Vec<ErrorDto> {
    match serde_json::from_str::<FlowGraph>(graph_json) {
        Ok(graph) => crate::validate::validate_flow(&graph)
            .into_iter()
            .map(ErrorDto::from)
            .collect(),
        Err(e) => vec![ErrorDto {
            code: "P001".into(),
            phase: "Parse".into(),
            message: format!("Failed to parse flow graph JSON: {}", e),
            node_id: None,
        }],
    }
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    code: String,
    phase: String,
    message: String,
    node_id: Option<String>,
}

impl From<BuilderError> for ErrorDto {
    fn from(e: BuilderError) -> Self {
        ErrorDto {
            code: e.code,
            phase: e.phase.to_string(),
            message: e.message,
            node_id: e.node_id,
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "status")]
enum FlowResult {
    #[serde(rename = "success")]
    Success { graph: FlowGraph },
    #[serde(rename = "errors")]
    Errors { errors: Vec<ErrorDto> },
}

#[derive(Serialize)]
#[serde(tag = "status")]
enum EditResult {
    #[serde(rename = "success")]
    Success { document: AutomationDocument },
    #[serde(rename = "errors")]
    Errors { errors: Vec<ErrorDto> },
}
