//! Integration tests for the workflow builder: id allocation, spec expansion,
//! edge resolution and port mapping.

mod helpers;

use alternime::build::build;
use alternime::expr::FormulaCompiler;
use alternime::graph::{DestinationConnection, OriginConnection, ToolType};
use alternime::target::TargetConnection;
use helpers::*;

fn conn(source_id: u32, dest_id: u32, source_port: u32, dest_port: u32) -> TargetConnection {
    TargetConnection {
        source_id,
        dest_id,
        source_port,
        dest_port,
    }
}

#[test]
fn ids_follow_source_order() {
    let graph = GraphBuilder::new()
        .node("a", ToolType::TextInput)
        .node("b", ToolType::Sort)
        .node("c", ToolType::Filter)
        .node("d", ToolType::DbFileOutput)
        .build();
    let wf = build(&graph, &FormulaCompiler::offline());
    let ids: Vec<_> = wf.nodes.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    let names: Vec<_> = wf.nodes.iter().map(|n| n.spec.name).collect();
    assert_eq!(names, vec!["Table Creator", "Sorter", "Row Filter", "CSV Writer"]);
}

#[test]
fn edges_through_excluded_node_are_dropped() {
    let graph = GraphBuilder::new()
        .node("A", ToolType::Sort)
        .node("Browse", ToolType::BrowseV2)
        .node("B", ToolType::Filter)
        .edge("A", "Browse")
        .edge("Browse", "B")
        .build();
    let wf = build(&graph, &FormulaCompiler::offline());
    assert_eq!(wf.nodes.len(), 2);
    assert!(wf.connections.is_empty());
}

#[test]
fn database_source_splits_into_connector_and_reader() {
    let graph = GraphBuilder::new()
        .node_with("src", ToolType::DbFileInput, database_source("SELECT 1"))
        .node("f", ToolType::Filter)
        .edge("src", "f")
        .build();
    let wf = build(&graph, &FormulaCompiler::offline());

    assert_eq!(wf.nodes.len(), 3);
    assert_eq!(wf.nodes[0].spec.name, "Oracle Connector");
    assert_eq!(wf.node(2).map(|n| n.spec.name), Some("DB Query Reader"));
    assert_eq!(wf.nodes[0].position.y, wf.nodes[1].position.y - 80);
    assert_eq!(wf.connections, vec![conn(1, 2, 1, 1), conn(2, 3, 1, 1)]);
}

#[test]
fn join_ports_follow_tag_tables() {
    let graph = GraphBuilder::new()
        .node("l", ToolType::TextInput)
        .node("r", ToolType::TextInput)
        .node_with("j", ToolType::Join, join_on(&["id"], &["id"]))
        .node("out", ToolType::DbFileOutput)
        .edge_tagged("l", "j", OriginConnection::Output, DestinationConnection::Left)
        .edge_tagged("r", "j", OriginConnection::Output, DestinationConnection::Right)
        .edge_tagged("j", "out", OriginConnection::Right, DestinationConnection::Input)
        .build();
    let wf = build(&graph, &FormulaCompiler::offline());
    assert_eq!(
        wf.connections,
        vec![conn(1, 3, 1, 1), conn(2, 3, 1, 2), conn(3, 4, 3, 1)]
    );
}

#[test]
fn unknown_tags_and_source_destination_map_to_ports() {
    let graph = GraphBuilder::new()
        .node("a", ToolType::Filter)
        .node("b", ToolType::Union)
        .edge_tagged("a", "b", OriginConnection::False, DestinationConnection::Source)
        .edge_tagged("a", "b", OriginConnection::Other, DestinationConnection::Other)
        .build();
    let wf = build(&graph, &FormulaCompiler::offline());
    assert_eq!(wf.connections, vec![conn(1, 2, 2, 2), conn(1, 2, 1, 1)]);
}

#[test]
fn unknown_tool_becomes_connected_placeholder() {
    let graph = GraphBuilder::new()
        .node("a", ToolType::TextInput)
        .node("m", ToolType::Unknown("CustomMacro".into()))
        .edge("a", "m")
        .build();
    let wf = build(&graph, &FormulaCompiler::offline());
    assert_eq!(wf.nodes[1].spec.name, "Node");
    assert_eq!(
        wf.nodes[1].spec.factory,
        "org.knime.base.node.dummy.DummyNodeFactory"
    );
    assert_eq!(wf.connections, vec![conn(1, 2, 1, 1)]);
}

#[test]
fn edges_to_undeclared_nodes_are_dropped() {
    let graph = GraphBuilder::new()
        .node("a", ToolType::Sort)
        .edge("a", "ghost")
        .build();
    let wf = build(&graph, &FormulaCompiler::offline());
    assert!(wf.connections.is_empty());
}
