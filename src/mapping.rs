//! Node type mapping table: source tool type → target node spec.
//!
//! Read-only after compilation; every build shares the same statics.

use crate::graph::{NodeConfig, ToolType};

/// Which settings generator fills a spec's `model` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsKind {
    /// No specialized generator; the model section stays empty.
    Default,
    GroupBy,
    Joiner,
    Expressions,
    Concatenate,
    TableManipulator,
    DbQueryReader,
    OracleConnector,
}

/// Static description of one target node type.
#[derive(Debug, PartialEq, Eq)]
pub struct TargetSpec {
    pub name: &'static str,
    pub factory: &'static str,
    pub bundle_name: &'static str,
    pub bundle_symbolic_name: &'static str,
    pub settings: SettingsKind,
}

const BASE_BUNDLE: &str = "KNIME Base Nodes";
const BASE_SYMBOLIC: &str = "org.knime.base";

const fn base(name: &'static str, factory: &'static str, settings: SettingsKind) -> TargetSpec {
    TargetSpec {
        name,
        factory,
        bundle_name: BASE_BUNDLE,
        bundle_symbolic_name: BASE_SYMBOLIC,
        settings,
    }
}

pub static CSV_READER: TargetSpec = base(
    "CSV Reader",
    "org.knime.base.node.io.filehandling.csv.reader.CSVReaderNodeFactory",
    SettingsKind::Default,
);
pub static CSV_WRITER: TargetSpec = base(
    "CSV Writer",
    "org.knime.base.node.io.filehandling.csv.writer.CSVWriterNodeFactory",
    SettingsKind::Default,
);
pub static TABLE_CREATOR: TargetSpec = base(
    "Table Creator",
    "org.knime.base.node.io.tablecreator.TableCreator2NodeFactory",
    SettingsKind::Default,
);
pub static TABLE_MANIPULATOR: TargetSpec = base(
    "Table Manipulator",
    "org.knime.base.node.preproc.manipulator.TableManipulatorNodeFactory",
    SettingsKind::TableManipulator,
);
pub static SORTER: TargetSpec = base(
    "Sorter",
    "org.knime.base.node.preproc.sorter.SorterNodeFactory",
    SettingsKind::Default,
);
pub static ROW_FILTER: TargetSpec = base(
    "Row Filter",
    "org.knime.base.node.preproc.filter.row.RowFilterNodeFactory",
    SettingsKind::Default,
);
pub static ROW_SAMPLING: TargetSpec = base(
    "Row Sampling",
    "org.knime.base.node.preproc.sample.SamplingNodeFactory",
    SettingsKind::Default,
);
pub static DUPLICATE_ROW_FILTER: TargetSpec = base(
    "Duplicate Row Filter",
    "org.knime.base.node.preproc.duplicates.DuplicateRowFilterNodeFactory",
    SettingsKind::Default,
);
pub static GROUP_BY: TargetSpec = base(
    "GroupBy",
    "org.knime.base.node.preproc.groupby.GroupByNodeFactory",
    SettingsKind::GroupBy,
);
pub static JOINER: TargetSpec = base(
    "Joiner",
    "org.knime.base.node.preproc.joiner3.Joiner3NodeFactory",
    SettingsKind::Joiner,
);
pub static CONCATENATE: TargetSpec = base(
    "Concatenate",
    "org.knime.base.node.preproc.append.row.AppendedRowsNodeFactory",
    SettingsKind::Concatenate,
);
pub static PLACEHOLDER: TargetSpec = base(
    "Node",
    "org.knime.base.node.dummy.DummyNodeFactory",
    SettingsKind::Default,
);

pub static COLUMN_EXPRESSIONS: TargetSpec = TargetSpec {
    name: "Column Expressions (legacy)",
    factory: "org.knime.expressions.base.node.formulas.FormulasNodeFactory",
    bundle_name: "KNIME Expression Nodes",
    bundle_symbolic_name: "org.knime.expressions.base",
    settings: SettingsKind::Expressions,
};

pub static DB_QUERY_READER: TargetSpec = TargetSpec {
    name: "DB Query Reader",
    factory: "org.knime.database.node.io.reader.query.DBQueryReaderNodeFactory",
    bundle_name: "KNIME database nodes",
    bundle_symbolic_name: "org.knime.database.nodes",
    settings: SettingsKind::DbQueryReader,
};

pub static ORACLE_CONNECTOR: TargetSpec = TargetSpec {
    name: "Oracle Connector",
    factory: "org.knime.database.extension.oracle.node.connector.OracleDBConnectorNodeFactory",
    bundle_name: "KNIME Oracle database extension",
    bundle_symbolic_name: "org.knime.database.extensions.oracle",
    settings: SettingsKind::OracleConnector,
};

/// Outcome of looking up one source node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mapping {
    /// The tool has no target counterpart and is dropped with its edges.
    Excluded,
    Mapped(&'static TargetSpec),
    /// Unrecognized tool; stands in with the placeholder spec.
    Gap(&'static TargetSpec),
}

/// Resolve the primary target spec for a tool, consulting the node config
/// where a tool type is ambiguous.
pub fn lookup(tool: &ToolType, config: &NodeConfig) -> Mapping {
    let spec = match tool {
        ToolType::BrowseV2 => return Mapping::Excluded,
        ToolType::Unknown(_) => return Mapping::Gap(&PLACEHOLDER),
        ToolType::DbFileInput if config.is_database_source() => &DB_QUERY_READER,
        ToolType::DbFileInput => &CSV_READER,
        ToolType::DbFileOutput => &CSV_WRITER,
        ToolType::TextInput => &TABLE_CREATOR,
        ToolType::Select | ToolType::AlteryxSelect => &TABLE_MANIPULATOR,
        ToolType::Sort => &SORTER,
        ToolType::Filter => &ROW_FILTER,
        ToolType::Sample => &ROW_SAMPLING,
        ToolType::Unique => &DUPLICATE_ROW_FILTER,
        ToolType::Formula | ToolType::MultiRowFormula => &COLUMN_EXPRESSIONS,
        ToolType::Summarize => &GROUP_BY,
        ToolType::Join => &JOINER,
        ToolType::Union => &CONCATENATE,
    };
    Mapping::Mapped(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{InputType, SourceConfig};

    #[test]
    fn file_and_database_sources_differ() {
        let file = NodeConfig::Source(SourceConfig::default());
        let db = NodeConfig::Source(SourceConfig {
            input_type: InputType::Database,
            ..Default::default()
        });
        assert_eq!(lookup(&ToolType::DbFileInput, &file), Mapping::Mapped(&CSV_READER));
        assert_eq!(
            lookup(&ToolType::DbFileInput, &db),
            Mapping::Mapped(&DB_QUERY_READER)
        );
    }

    #[test]
    fn both_select_tools_share_a_spec() {
        let a = lookup(&ToolType::Select, &NodeConfig::Opaque);
        let b = lookup(&ToolType::AlteryxSelect, &NodeConfig::Opaque);
        assert_eq!(a, b);
        assert_eq!(a, Mapping::Mapped(&TABLE_MANIPULATOR));
    }

    #[test]
    fn browse_is_excluded_and_unknown_is_a_gap() {
        assert_eq!(
            lookup(&ToolType::BrowseV2, &NodeConfig::Opaque),
            Mapping::Excluded
        );
        assert!(ToolType::BrowseV2.is_excluded());
        let gap = lookup(&ToolType::Unknown("Macro".into()), &NodeConfig::Opaque);
        assert_eq!(gap, Mapping::Gap(&PLACEHOLDER));
        assert_eq!(PLACEHOLDER.name, "Node");
    }
}
