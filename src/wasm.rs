//! WASM entry points for browser use.
//!
//! No network is reachable from here, so formulas the deterministic path
//! rejects always become placeholder scripts.

use wasm_bindgen::prelude::*;

use crate::error::ConvertError;
use crate::expr::FormulaCompiler;

/// Validate a workflow graph JSON without building it.
/// Returns a JSON array of error objects.
#[wasm_bindgen]
pub fn validate_workflow(json: &str) -> JsValue {
    let result = validate_workflow_inner(json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn validate_workflow_inner(json: &str) -> Vec<ErrorDto> {
    let graph = match crate::graph::parse(json) {
        Ok(g) => g,
        Err(errors) => return errors.into_iter().map(ErrorDto::from).collect(),
    };
    let index = crate::graph::GraphIndex::build(&graph);
    crate::validate::validate_graph(&graph, &index)
        .into_iter()
        .map(ErrorDto::from)
        .collect()
}

/// Full pipeline with the fallback disabled.
/// Returns a JSON object with either `files` (success) or `errors` (failure).
#[wasm_bindgen]
pub fn convert_workflow(json: &str) -> JsValue {
    let result = convert_workflow_inner(json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn convert_workflow_inner(json: &str) -> ConvertResult {
    match crate::convert_json(json, &FormulaCompiler::offline()) {
        Ok(archive) => ConvertResult::Success {
            files: archive
                .files
                .into_iter()
                .map(|f| FileDto {
                    path: f.path,
                    content: f.content,
                })
                .collect(),
        },
        Err(errors) => ConvertResult::Errors {
            errors: errors.into_iter().map(ErrorDto::from).collect(),
        },
    }
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct ErrorDto {
    code: String,
    stage: String,
    message: String,
    node_id: Option<String>,
}

impl From<ConvertError> for ErrorDto {
    fn from(e: ConvertError) -> Self {
        ErrorDto {
            code: e.code.to_string(),
            stage: e.stage.to_string(),
            message: e.message,
            node_id: e.node_id,
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct FileDto {
    path: String,
    content: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "status")]
enum ConvertResult {
    #[serde(rename = "success")]
    Success { files: Vec<FileDto> },
    #[serde(rename = "errors")]
    Errors { errors: Vec<ErrorDto> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_result_is_tagged() {
        let json = r#"{"nodes": [{"id": 1, "type": "Sort", "position": {"x": 0, "y": 0}}], "edges": []}"#;
        let value = serde_json::to_value(convert_workflow_inner(json)).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["files"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn bad_json_reports_parse_error() {
        let value = serde_json::to_value(convert_workflow_inner("{")).unwrap();
        assert_eq!(value["status"], "errors");
        assert_eq!(value["errors"][0]["code"], "P001");
        assert_eq!(value["errors"][0]["stage"], "input");
    }
}
