//! Rust types for the source workflow graph.
//!
//! These types are the serde target for the graph JSON produced by the
//! upstream extraction step (archive unpacking + XML parsing). They carry only
//! what the builder consumes: node identity, tool type, canvas position, the
//! tool's typed configuration, and the connections between tools.

use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// TOP-LEVEL GRAPH
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowGraph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// Opaque node identifier assigned by the extraction step.
///
/// Accepts both strings and integers on input; always compared as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawNodeId", into = "String")]
pub struct NodeId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNodeId {
    Text(String),
    Number(i64),
}

impl From<RawNodeId> for NodeId {
    fn from(raw: RawNodeId) -> Self {
        match raw {
            RawNodeId::Text(s) => NodeId(s),
            RawNodeId::Number(n) => NodeId(n.to_string()),
        }
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

// =============================================================================
// NODES
// =============================================================================

/// One source tool.
///
/// The extraction step writes the canvas position either as flat `x`/`y`
/// fields or as a nested `position` object, and writes `config` as a plain
/// object whose shape depends on `type`. Deserialization therefore reads
/// `type` first and picks the config variant from it.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub tool: ToolType,
    pub position: Position,
    pub config: NodeConfig,
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawNode {
            id: NodeId,
            #[serde(rename = "type")]
            tool: ToolType,
            #[serde(default)]
            x: Option<f64>,
            #[serde(default)]
            y: Option<f64>,
            #[serde(default)]
            position: Option<Position>,
            #[serde(default)]
            config: serde_json::Value,
        }

        let raw = RawNode::deserialize(deserializer)?;
        let position = raw.position.unwrap_or(Position {
            x: raw.x.unwrap_or_default(),
            y: raw.y.unwrap_or_default(),
        });
        let config = NodeConfig::for_tool(&raw.tool, raw.config).map_err(|e| {
            serde::de::Error::custom(format!(
                "invalid {} config for node '{}': {e}",
                raw.tool.name(),
                raw.id
            ))
        })?;

        Ok(Node {
            id: raw.id,
            tool: raw.tool,
            position,
            config,
        })
    }
}

/// Source engine tool types the mapping table knows about.
///
/// Names outside the closed set become `Unknown`, keeping the raw plugin name
/// for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ToolType {
    DbFileInput,
    DbFileOutput,
    TextInput,
    Select,
    AlteryxSelect,
    Sort,
    Filter,
    Sample,
    Unique,
    Formula,
    MultiRowFormula,
    Summarize,
    Join,
    Union,
    BrowseV2,
    Unknown(String),
}

impl From<String> for ToolType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "DbFileInput" => ToolType::DbFileInput,
            "DbFileOutput" => ToolType::DbFileOutput,
            "TextInput" => ToolType::TextInput,
            "Select" => ToolType::Select,
            "AlteryxSelect" => ToolType::AlteryxSelect,
            "Sort" => ToolType::Sort,
            "Filter" => ToolType::Filter,
            "Sample" => ToolType::Sample,
            "Unique" => ToolType::Unique,
            "Formula" => ToolType::Formula,
            "MultiRowFormula" => ToolType::MultiRowFormula,
            "Summarize" => ToolType::Summarize,
            "Join" => ToolType::Join,
            "Union" => ToolType::Union,
            "BrowseV2" => ToolType::BrowseV2,
            _ => ToolType::Unknown(name),
        }
    }
}

impl From<ToolType> for String {
    fn from(tool: ToolType) -> Self {
        tool.name().to_string()
    }
}

impl ToolType {
    pub fn name(&self) -> &str {
        match self {
            ToolType::DbFileInput => "DbFileInput",
            ToolType::DbFileOutput => "DbFileOutput",
            ToolType::TextInput => "TextInput",
            ToolType::Select => "Select",
            ToolType::AlteryxSelect => "AlteryxSelect",
            ToolType::Sort => "Sort",
            ToolType::Filter => "Filter",
            ToolType::Sample => "Sample",
            ToolType::Unique => "Unique",
            ToolType::Formula => "Formula",
            ToolType::MultiRowFormula => "MultiRowFormula",
            ToolType::Summarize => "Summarize",
            ToolType::Join => "Join",
            ToolType::Union => "Union",
            ToolType::BrowseV2 => "BrowseV2",
            ToolType::Unknown(name) => name,
        }
    }

    /// Tools that never reach the target workflow.
    pub fn is_excluded(&self) -> bool {
        matches!(self, ToolType::BrowseV2)
    }

    /// The config variant this tool carries, if it carries a typed one.
    pub fn expected_config(&self) -> Option<ConfigKind> {
        match self {
            ToolType::Formula | ToolType::MultiRowFormula => Some(ConfigKind::Formula),
            ToolType::Join => Some(ConfigKind::Join),
            ToolType::Summarize => Some(ConfigKind::Summarize),
            ToolType::Select | ToolType::AlteryxSelect => Some(ConfigKind::Select),
            ToolType::DbFileInput => Some(ConfigKind::Source),
            ToolType::Union => Some(ConfigKind::Union),
            _ => None,
        }
    }
}

// =============================================================================
// NODE CONFIG — union keyed by the node's tool type
// =============================================================================

#[derive(Debug, Clone, Default, Serialize)]
#[serde(untagged)]
pub enum NodeConfig {
    Formula(FormulaConfig),
    Join(JoinConfig),
    Summarize(SummarizeConfig),
    Select(SelectConfig),
    Source(SourceConfig),
    Union(UnionConfig),
    /// Passthrough for tools without a typed configuration, or with none extracted.
    #[default]
    Opaque,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Formula,
    Join,
    Summarize,
    Select,
    Source,
    Union,
    Opaque,
}

impl std::fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConfigKind::Formula => "formula",
            ConfigKind::Join => "join",
            ConfigKind::Summarize => "summarize",
            ConfigKind::Select => "select",
            ConfigKind::Source => "source",
            ConfigKind::Union => "union",
            ConfigKind::Opaque => "opaque",
        };
        f.write_str(name)
    }
}

impl NodeConfig {
    /// Read a raw config object in the shape `tool` carries. Tools without a
    /// typed configuration, and a null config, yield `Opaque`.
    pub fn for_tool(tool: &ToolType, value: serde_json::Value) -> serde_json::Result<Self> {
        if value.is_null() {
            return Ok(NodeConfig::Opaque);
        }
        Ok(match tool.expected_config() {
            Some(ConfigKind::Formula) => NodeConfig::Formula(serde_json::from_value(value)?),
            Some(ConfigKind::Join) => NodeConfig::Join(serde_json::from_value(value)?),
            Some(ConfigKind::Summarize) => NodeConfig::Summarize(serde_json::from_value(value)?),
            Some(ConfigKind::Select) => NodeConfig::Select(serde_json::from_value(value)?),
            Some(ConfigKind::Source) => NodeConfig::Source(serde_json::from_value(value)?),
            Some(ConfigKind::Union) => NodeConfig::Union(serde_json::from_value(value)?),
            Some(ConfigKind::Opaque) | None => NodeConfig::Opaque,
        })
    }

    pub fn kind(&self) -> ConfigKind {
        match self {
            NodeConfig::Formula(_) => ConfigKind::Formula,
            NodeConfig::Join(_) => ConfigKind::Join,
            NodeConfig::Summarize(_) => ConfigKind::Summarize,
            NodeConfig::Select(_) => ConfigKind::Select,
            NodeConfig::Source(_) => ConfigKind::Source,
            NodeConfig::Union(_) => ConfigKind::Union,
            NodeConfig::Opaque => ConfigKind::Opaque,
        }
    }

    /// Whether a source node reads from a database rather than a file.
    pub fn is_database_source(&self) -> bool {
        matches!(
            self,
            NodeConfig::Source(SourceConfig {
                input_type: InputType::Database,
                ..
            })
        )
    }
}

// =============================================================================
// CONFIG SHAPES
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormulaConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub formulas: Vec<FormulaStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaStep {
    #[serde(default, deserialize_with = "null_as_default")]
    pub field: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub expression: String,
}

/// Join keys and the output field selection.
///
/// Reads either the extractor's `join_keys: [{side, cols}]` list or flat
/// `left_keys`/`right_keys` arrays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "RawJoinConfig")]
pub struct JoinConfig {
    pub left_keys: Vec<String>,
    pub right_keys: Vec<String>,
    pub select_fields: Vec<SelectField>,
}

#[derive(Deserialize)]
struct RawJoinConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    join_keys: Vec<JoinKeys>,
    #[serde(default, deserialize_with = "null_as_default")]
    left_keys: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    right_keys: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    select_fields: Vec<SelectField>,
}

#[derive(Deserialize)]
struct JoinKeys {
    side: JoinSide,
    #[serde(default, deserialize_with = "null_as_default")]
    cols: Vec<Option<String>>,
}

impl From<RawJoinConfig> for JoinConfig {
    fn from(raw: RawJoinConfig) -> Self {
        let mut config = JoinConfig {
            left_keys: raw.left_keys,
            right_keys: raw.right_keys,
            select_fields: raw.select_fields,
        };
        for keys in raw.join_keys {
            let target = match keys.side {
                JoinSide::Left => &mut config.left_keys,
                JoinSide::Right => &mut config.right_keys,
            };
            target.extend(keys.cols.into_iter().flatten());
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectField {
    #[serde(default, deserialize_with = "null_as_default")]
    pub field: String,
    #[serde(default = "default_selected", deserialize_with = "selected_flag")]
    pub selected: bool,
    #[serde(default)]
    pub rename: Option<String>,
    /// Input a join field came from; the extractor writes `input: "Right_"`.
    #[serde(default, alias = "input", deserialize_with = "input_side")]
    pub side: Option<JoinSide>,
}

impl SelectField {
    /// The source engine's "all other columns" pseudo-field.
    pub const WILDCARD: &'static str = "*Unknown";

    pub fn is_wildcard(&self) -> bool {
        self.field == Self::WILDCARD
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummarizeConfig {
    #[serde(default, alias = "summarize_fields", deserialize_with = "null_as_default")]
    pub fields: Vec<SummarizeField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeField {
    #[serde(default, deserialize_with = "null_as_default")]
    pub field: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub action: SummarizeAction,
    #[serde(default)]
    pub rename: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummarizeAction {
    GroupBy,
    Sum,
    Count,
    Min,
    Max,
    Avg,
    Concat,
    /// Any other source action (`CountDistinct`, `First`, ...), or none.
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectConfig {
    #[serde(default, alias = "select_fields", deserialize_with = "null_as_default")]
    pub fields: Vec<SelectField>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub input_type: InputType,
    #[serde(default, alias = "file_path")]
    pub path: Option<String>,
    #[serde(default, alias = "sql_query")]
    pub sql: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default, alias = "db_name")]
    pub database: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputType {
    #[default]
    File,
    #[serde(alias = "DB")]
    Database,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnionConfig {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub output_mode: Option<String>,
}

// =============================================================================
// EDGES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub origin_connection: OriginConnection,
    #[serde(default, deserialize_with = "null_as_default")]
    pub destination_connection: DestinationConnection,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OriginConnection {
    #[default]
    Output,
    Join,
    Left,
    Right,
    True,
    False,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestinationConnection {
    #[default]
    Input,
    Left,
    Right,
    Source,
    Targets,
    #[serde(other)]
    Other,
}

// =============================================================================
// HELPERS
// =============================================================================

/// The extractor writes absent XML attributes as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_selected() -> bool {
    true
}

/// Accepts `true`/`false` as well as the source engine's `"True"`/`"False"`
/// strings. A null flag counts as selected.
fn selected_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawBool {
        Bool(bool),
        Text(String),
    }

    match Option::<RawBool>::deserialize(deserializer)? {
        None => Ok(true),
        Some(RawBool::Bool(b)) => Ok(b),
        Some(RawBool::Text(s)) => match s.to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected a boolean, found '{other}'"
            ))),
        },
    }
}

/// `Left`/`Right` with or without the engine's trailing underscore; anything
/// else is unknown.
fn input_side<'de, D>(deserializer: D) -> Result<Option<JoinSide>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(match raw.as_deref().map(|s| s.trim_end_matches('_')) {
        Some("Left") => Some(JoinSide::Left),
        Some("Right") => Some(JoinSide::Right),
        _ => None,
    })
}
