//! Target-side build output: numbered nodes with settings, and port-level
//! connections between them.

use crate::mapping::TargetSpec;
use crate::settings::Config;

/// UI position of a target node, in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone)]
pub struct TargetNode {
    /// 1-based, assigned in emission order.
    pub id: u32,
    pub spec: &'static TargetSpec,
    pub settings: Config,
    pub position: Bounds,
}

impl TargetNode {
    /// Directory holding this node's settings inside the project.
    pub fn folder_name(&self) -> String {
        format!("{} (#{})", self.spec.name, self.id)
    }

    pub fn settings_path(&self) -> String {
        format!("{}/settings.xml", self.folder_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetConnection {
    pub source_id: u32,
    pub dest_id: u32,
    pub source_port: u32,
    pub dest_port: u32,
}

/// Everything one build produces before archive assembly.
#[derive(Debug, Clone, Default)]
pub struct TargetWorkflow {
    pub nodes: Vec<TargetNode>,
    pub connections: Vec<TargetConnection>,
}

impl TargetWorkflow {
    pub fn node(&self, id: u32) -> Option<&TargetNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
