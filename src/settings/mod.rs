//! Settings documents: the fixed per-node shell plus a `model` section filled
//! by the generator the target spec selects.

pub mod concatenate;
pub mod database;
pub mod doc;
pub mod expressions;
pub mod groupby;
pub mod joiner;
pub mod manipulator;

pub use doc::{Config, Value, escape};

use crate::expr::FormulaCompiler;
use crate::graph::{
    FormulaConfig, JoinConfig, NodeConfig, SelectConfig, SourceConfig, SummarizeConfig,
};
use crate::mapping::{SettingsKind, TargetSpec};

/// Version stamped into every generated document.
pub const ENGINE_VERSION: &str = "5.1.0";

pub const BUNDLE_VENDOR: &str = "KNIME AG, Zurich, Switzerland";

/// Cell class used wherever a column type must be declared.
pub const STRING_CELL: &str = "org.knime.core.data.def.StringCell";

const PORT_SLOTS: i64 = 3;

/// Build the complete `settings.xml` tree for one target node.
pub fn node_settings(spec: &TargetSpec, config: &NodeConfig, formulas: &FormulaCompiler) -> Config {
    let mut root = Config::new("settings.xml");
    root.string("node_file", "settings.xml")
        .empty("flow_stack")
        .config("internal_node_subsettings", |c| {
            c.string("memory_policy", "CacheSmallInMemory");
        })
        .push(model(spec.settings, config, formulas))
        .null_string("customDescription")
        .string("state", "IDLE")
        .string("factory", spec.factory)
        .string("node-name", spec.name)
        .string("node-bundle-name", spec.bundle_name)
        .string("node-bundle-symbolic-name", spec.bundle_symbolic_name)
        .string("node-bundle-vendor", BUNDLE_VENDOR)
        .string("node-bundle-version", ENGINE_VERSION)
        .empty("factory_settings")
        .string("name", spec.name)
        .boolean("hasContent", false)
        .boolean("isInactive", false)
        .config("ports", |ports| {
            for index in 1..=PORT_SLOTS {
                ports.config(format!("port_{index}"), |port| {
                    port.int("index", index).null_string("port_dir_location");
                });
            }
        });
    root
}

/// Dispatch to the generator for `kind`. A config of the wrong shape is
/// treated as empty.
pub fn model(kind: SettingsKind, config: &NodeConfig, formulas: &FormulaCompiler) -> Config {
    let mut model = Config::new("model");
    match kind {
        SettingsKind::Default => {}
        SettingsKind::GroupBy => match config {
            NodeConfig::Summarize(c) => groupby::fill(&mut model, c),
            _ => groupby::fill(&mut model, &SummarizeConfig::default()),
        },
        SettingsKind::Joiner => match config {
            NodeConfig::Join(c) => joiner::fill(&mut model, c),
            _ => joiner::fill(&mut model, &JoinConfig::default()),
        },
        SettingsKind::Expressions => match config {
            NodeConfig::Formula(c) => expressions::fill(&mut model, c, formulas),
            _ => expressions::fill(&mut model, &FormulaConfig::default(), formulas),
        },
        SettingsKind::Concatenate => concatenate::fill(&mut model),
        SettingsKind::TableManipulator => match config {
            NodeConfig::Select(c) => manipulator::fill(&mut model, c),
            _ => manipulator::fill(&mut model, &SelectConfig::default()),
        },
        SettingsKind::DbQueryReader => match config {
            NodeConfig::Source(c) => database::fill_reader(&mut model, c),
            _ => database::fill_reader(&mut model, &SourceConfig::default()),
        },
        SettingsKind::OracleConnector => match config {
            NodeConfig::Source(c) => database::fill_connector(&mut model, c),
            _ => database::fill_connector(&mut model, &SourceConfig::default()),
        },
    }
    model
}
