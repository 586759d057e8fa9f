//! GroupBy settings from a Summarize config.

use crate::graph::{SummarizeAction, SummarizeConfig};

use super::Config;

/// Target aggregation method for an action; `None` for group-by columns.
pub fn method_name(action: SummarizeAction) -> Option<&'static str> {
    match action {
        SummarizeAction::GroupBy => None,
        SummarizeAction::Sum => Some("Sum_V2.5.2"),
        SummarizeAction::Count => Some("Count"),
        SummarizeAction::Min => Some("Min"),
        SummarizeAction::Max => Some("Max"),
        SummarizeAction::Avg => Some("Mean"),
        SummarizeAction::Concat => Some("List"),
        SummarizeAction::Other => Some("Count"),
    }
}

pub fn fill(model: &mut Config, summarize: &SummarizeConfig) {
    let group_columns: Vec<&str> = summarize
        .fields
        .iter()
        .filter(|f| f.action == SummarizeAction::GroupBy)
        .map(|f| f.field.as_str())
        .collect();
    // (column, method), in source order.
    let aggregations: Vec<(&str, &str)> = summarize
        .fields
        .iter()
        .filter_map(|f| method_name(f.action).map(|m| (f.field.as_str(), m)))
        .collect();

    model
        .config("grouByColumns", |c| {
            c.string_array("InclList", group_columns)
                .string_array("ExclList", Vec::<String>::new())
                .boolean("keep_all_columns_selected", false);
        })
        .config("maxNoneNumericalVals_Internals", |c| {
            c.string("SettingsModelID", "SMID_integer")
                .boolean("EnabledStatus", true);
        })
        .int("maxNoneNumericalVals", 10000)
        .boolean("enableHilite", false)
        .string("valueDelimiter", ", ")
        .boolean("sortInMemory", false)
        .string("columnNamePolicy", "Keep original name(s)")
        .config("aggregationColumn", |c| {
            c.string_array("columnNames", aggregations.iter().map(|(col, _)| *col))
                .string_array("columnTypes", aggregations.iter().map(|_| "String"))
                .string_array("aggregationMethod", aggregations.iter().map(|(_, m)| *m))
                .boolean_array("inclMissingVals", aggregations.iter().map(|_| false));
        })
        .empty("aggregationOperatorSettings")
        .empty("patternAggregators")
        .empty("dataTypeAggregators")
        .boolean("retainOrder", false)
        .boolean("inMemory", false)
        .int("nodeVersion", 1)
        .byte("typeMatch", 0);
}
