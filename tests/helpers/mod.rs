#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use alternime::expr::{FallbackError, FallbackRequest, FallbackService, FormulaCompiler};
use alternime::graph::*;

// =============================================================================
// Graph builders
// =============================================================================

/// Fluent builder for small source graphs. Nodes are laid out left to right.
#[derive(Default)]
pub struct GraphBuilder {
    graph: WorkflowGraph,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(self, id: &str, tool: ToolType) -> Self {
        self.node_with(id, tool, NodeConfig::Opaque)
    }

    pub fn node_with(mut self, id: &str, tool: ToolType, config: NodeConfig) -> Self {
        let x = 100.0 * (self.graph.nodes.len() as f64 + 1.0);
        self.graph.nodes.push(Node {
            id: NodeId::from(id),
            tool,
            position: Position { x, y: 50.0 },
            config,
        });
        self
    }

    pub fn edge(self, source: &str, target: &str) -> Self {
        self.edge_tagged(
            source,
            target,
            OriginConnection::Output,
            DestinationConnection::Input,
        )
    }

    pub fn edge_tagged(
        mut self,
        source: &str,
        target: &str,
        origin: OriginConnection,
        destination: DestinationConnection,
    ) -> Self {
        self.graph.edges.push(Edge {
            source: NodeId::from(source),
            target: NodeId::from(target),
            origin_connection: origin,
            destination_connection: destination,
        });
        self
    }

    pub fn build(self) -> WorkflowGraph {
        self.graph
    }
}

// =============================================================================
// Config builders
// =============================================================================

pub fn formulas(steps: &[(&str, &str)]) -> NodeConfig {
    NodeConfig::Formula(FormulaConfig {
        formulas: steps
            .iter()
            .map(|(field, expression)| FormulaStep {
                field: field.to_string(),
                expression: expression.to_string(),
            })
            .collect(),
    })
}

pub fn database_source(sql: &str) -> NodeConfig {
    NodeConfig::Source(SourceConfig {
        input_type: InputType::Database,
        sql: Some(sql.to_string()),
        host: Some("db.internal".into()),
        port: Some(1522),
        database: Some("SALES".into()),
        username: Some("etl".into()),
        ..Default::default()
    })
}

pub fn join_on(left: &[&str], right: &[&str]) -> NodeConfig {
    NodeConfig::Join(JoinConfig {
        left_keys: left.iter().map(|s| s.to_string()).collect(),
        right_keys: right.iter().map(|s| s.to_string()).collect(),
        select_fields: vec![],
    })
}

// =============================================================================
// Fallback stubs
// =============================================================================

pub enum Reply {
    Script(String),
    Timeout,
}

/// Fallback service that records every request and answers with a fixed reply.
pub struct RecordingFallback {
    pub requests: Mutex<Vec<FallbackRequest>>,
    reply: Reply,
}

impl RecordingFallback {
    pub fn answering(script: &str) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            reply: Reply::Script(script.to_string()),
        })
    }

    pub fn timing_out() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            reply: Reply::Timeout,
        })
    }

    pub fn recorded(&self) -> Vec<FallbackRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl FallbackService for RecordingFallback {
    fn convert(&self, request: &FallbackRequest) -> Result<String, FallbackError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Reply::Script(script) => Ok(script.clone()),
            Reply::Timeout => Err(FallbackError::Timeout(Duration::from_secs(30))),
        }
    }
}

pub fn compiler_with(fallback: &Arc<RecordingFallback>) -> FormulaCompiler {
    FormulaCompiler::new(fallback.clone())
}
