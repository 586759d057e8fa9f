//! Errors that stop a conversion.
//!
//! Only inputs that cannot become a loadable archive end up here. Formula
//! failures and unmapped tools are recovered inside the build and never
//! produce a `ConvertError`.

use crate::target::validate::ValidationError;

/// Pipeline stage that rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The graph JSON could not be read (`P…` codes).
    Input,
    /// The source graph is structurally unusable (`V…` codes).
    Graph,
    /// The built target workflow breaks an output invariant (`E…` codes).
    Output,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Input => "input",
            Stage::Graph => "graph",
            Stage::Output => "output",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error(
    "{code} ({stage}): {message}{}",
    .node_id.as_deref().map(|id| format!(" [node {id}]")).unwrap_or_default()
)]
pub struct ConvertError {
    pub code: &'static str,
    pub stage: Stage,
    pub message: String,
    /// Source node id for graph errors, target node id for output errors.
    pub node_id: Option<String>,
}

impl ConvertError {
    pub fn input(code: &'static str, message: impl Into<String>) -> Self {
        ConvertError {
            code,
            stage: Stage::Input,
            message: message.into(),
            node_id: None,
        }
    }

    pub fn graph(code: &'static str, message: impl Into<String>, node_id: Option<String>) -> Self {
        ConvertError {
            code,
            stage: Stage::Graph,
            message: message.into(),
            node_id,
        }
    }
}

impl From<ValidationError> for ConvertError {
    fn from(e: ValidationError) -> Self {
        ConvertError {
            code: e.code,
            stage: Stage::Output,
            message: e.message,
            node_id: e.target_id.map(|id| id.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_code_stage_and_node() {
        let err = ConvertError::graph("V001", "Duplicate node id '4'", Some("4".into()));
        assert_eq!(err.to_string(), "V001 (graph): Duplicate node id '4' [node 4]");

        let err = ConvertError::input("P001", "bad json");
        assert_eq!(err.to_string(), "P001 (input): bad json");
    }
}
