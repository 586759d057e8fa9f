//! Spec expansion: one source node → the target specs it emits.
//!
//! A database reader needs a connector node in front of it, so that mapping
//! expands to two specs; everything else emits one.

use crate::mapping::{DB_QUERY_READER, ORACLE_CONNECTOR, SettingsKind, TargetSpec};
use crate::target::Bounds;

/// Vertical distance of a connector above its reader.
pub const CONNECTOR_OFFSET_Y: i64 = -80;

/// A spec to emit, with its position offset from the source node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedSpec {
    pub spec: &'static TargetSpec,
    pub offset: Bounds,
}

impl PlannedSpec {
    fn at(spec: &'static TargetSpec, x: i64, y: i64) -> Self {
        Self {
            spec,
            offset: Bounds { x, y },
        }
    }
}

/// Specs for a node whose primary mapping is `primary`, in emission order.
pub fn expand(primary: &'static TargetSpec) -> Vec<PlannedSpec> {
    match primary.settings {
        SettingsKind::DbQueryReader => vec![
            PlannedSpec::at(&ORACLE_CONNECTOR, 0, CONNECTOR_OFFSET_Y),
            PlannedSpec::at(&DB_QUERY_READER, 0, 0),
        ],
        _ => vec![PlannedSpec::at(primary, 0, 0)],
    }
}
