//! Workflow-level descriptor (`workflow.knime`).

use crate::settings::{Config, ENGINE_VERSION};
use crate::target::{TargetConnection, TargetNode, TargetWorkflow};

pub const AUTHOR: &str = "alterNIME";
pub const AUTHORED_WHEN: &str = "2026-01-01 00:00:00 +0000";

const UI_CLASSNAME: &str = "org.knime.core.node.workflow.NodeUIInformation";

/// Build the descriptor listing every node and connection.
pub fn descriptor(workflow: &TargetWorkflow) -> Config {
    let mut root = Config::new("workflow.knime");
    root.string("created_by", ENGINE_VERSION)
        .string("version", ENGINE_VERSION)
        .null_string("name")
        .config("authorInformation", |a| {
            a.string("authored-by", AUTHOR)
                .string("authored-when", AUTHORED_WHEN);
        })
        .empty("workflow_credentials")
        .config("nodes", |nodes| {
            for (index, node) in workflow.nodes.iter().enumerate() {
                nodes.push(node_entry(index, node));
            }
        })
        .config("connections", |conns| {
            for (index, conn) in workflow.connections.iter().enumerate() {
                conns.push(connection_entry(index, conn));
            }
        });
    root
}

fn node_entry(index: usize, node: &TargetNode) -> Config {
    let mut entry = Config::new(format!("node_{index}"));
    entry
        .int("id", i64::from(node.id))
        .string("node_settings_file", node.settings_path())
        .boolean("node_is_meta", false)
        .string("node_type", "NativeNode")
        .string("ui_classname", UI_CLASSNAME)
        .config("ui_settings", |ui| {
            ui.int_array(
                "extrainfo.node.bounds",
                [node.position.x, node.position.y, -1, -1],
            );
        });
    entry
}

fn connection_entry(index: usize, conn: &TargetConnection) -> Config {
    let mut entry = Config::new(format!("connection_{index}"));
    entry
        .int("sourceID", i64::from(conn.source_id))
        .int("destID", i64::from(conn.dest_id))
        .int("sourcePort", i64::from(conn.source_port))
        .int("destPort", i64::from(conn.dest_port));
    entry
}
