//! Joiner settings from a Join config.
//!
//! Key columns pair positionally; the longer key list is truncated. Both
//! output sides filter with the same deselection list.

use crate::graph::{JoinConfig, SelectField};

use super::Config;

/// Positional key pairs, truncated to the shorter side.
pub fn key_pairs(join: &JoinConfig) -> Vec<(&str, &str)> {
    join.left_keys
        .iter()
        .zip(&join.right_keys)
        .map(|(l, r)| (l.as_str(), r.as_str()))
        .collect()
}

/// Concrete fields marked not-selected, in source order.
pub fn deselected(fields: &[SelectField]) -> Vec<&str> {
    fields
        .iter()
        .filter(|f| !f.selected && !f.is_wildcard())
        .map(|f| f.field.as_str())
        .collect()
}

pub fn fill(model: &mut Config, join: &JoinConfig) {
    let pairs = key_pairs(join);
    let excluded = deselected(&join.select_fields);
    // `*Unknown` is never listed as a column; its flag alone decides whether
    // unlisted columns pass through, as in the column manipulator.
    let keep_unknown = join
        .select_fields
        .iter()
        .find(|f| f.is_wildcard())
        .is_none_or(|f| f.selected);

    model
        .string("compositionMode", "MATCH_ALL")
        .config("matchingCriteria", |criteria| {
            for (idx, (left, right)) in pairs.iter().enumerate() {
                criteria.config(idx.to_string(), |c| {
                    c.config("leftTableColumnV2", |side| column_choice(side, left))
                        .config("rightTableColumnV2", |side| column_choice(side, right));
                });
            }
        })
        .string("dataCellComparisonMode", "STRICT")
        .boolean("includeMatchesInOutput", true)
        .boolean("includeLeftUnmatchedInOutput", true)
        .boolean("includeRightUnmatchedInOutput", true)
        .boolean("outputUnmatchedRowsToSeparatePorts", true)
        .config("leftColumnSelectionConfigV2", |c| {
            column_selection(c, &excluded, keep_unknown)
        })
        .config("rightColumnSelectionConfigV2", |c| {
            column_selection(c, &excluded, keep_unknown)
        })
        .boolean("mergeJoinColumns", false)
        .string("duplicateHandling", "APPEND_SUFFIX")
        .string("suffix", " (Right)")
        .string("rowKeyFactory", "CONCATENATE")
        .string("rowKeySeparator", "_")
        .string("outputRowOrder", "ARBITRARY")
        .int("maxOpenFiles", 200)
        .boolean("enableHiliting", false);
}

fn column_choice(side: &mut Config, column: &str) {
    side.string("regularChoice", column)
        .null_string("specialChoice_Internals");
}

fn column_selection(c: &mut Config, excluded: &[&str], keep_unknown: bool) {
    c.string("mode", "MANUAL")
        .config("patternFilter", |p| {
            p.string("pattern", "")
                .boolean("isCaseSensitive", false)
                .boolean("isInverted", false);
        })
        .config("manualFilter", |m| {
            m.string_array("manuallySelected", Vec::<String>::new())
                .string_array("manuallyDeselected", excluded.iter().copied())
                .boolean("includeUnknownColumns", keep_unknown);
        })
        .config("typeFilter", |t| {
            t.string_array("selectedTypes", Vec::<String>::new());
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Value;

    fn select(field: &str, selected: bool) -> SelectField {
        SelectField {
            field: field.into(),
            selected,
            rename: None,
            side: None,
        }
    }

    fn join(left: &[&str], right: &[&str]) -> JoinConfig {
        JoinConfig {
            left_keys: left.iter().map(|s| s.to_string()).collect(),
            right_keys: right.iter().map(|s| s.to_string()).collect(),
            select_fields: vec![],
        }
    }

    #[test]
    fn keys_truncate_to_shorter_side() {
        let cfg = join(&["A", "B", "C"], &["X", "Y"]);
        assert_eq!(key_pairs(&cfg), vec![("A", "X"), ("B", "Y")]);

        let mut model = Config::new("model");
        fill(&mut model, &cfg);
        let criteria = model.child("matchingCriteria").unwrap();
        assert_eq!(criteria.items.len(), 2);
        assert_eq!(
            model
                .value_at("matchingCriteria/1/rightTableColumnV2/regularChoice")
                .and_then(Value::as_str),
            Some("Y")
        );
    }

    #[test]
    fn both_sides_share_deselection() {
        let mut cfg = join(&["id"], &["id"]);
        cfg.select_fields = vec![select("keep", true), select("drop", false)];
        let mut model = Config::new("model");
        fill(&mut model, &cfg);
        for side in ["leftColumnSelectionConfigV2", "rightColumnSelectionConfigV2"] {
            let list = model
                .child(side)
                .and_then(|c| c.child("manualFilter"))
                .and_then(|c| c.child("manuallyDeselected"))
                .unwrap();
            let names: Vec<_> = list.array_values().into_iter().filter_map(Value::as_str).collect();
            assert_eq!(names, vec!["drop"]);
        }
    }

    #[test]
    fn deselected_wildcard_drops_unknown_columns() {
        let mut cfg = join(&[], &[]);
        cfg.select_fields = vec![select(SelectField::WILDCARD, false)];
        let mut model = Config::new("model");
        fill(&mut model, &cfg);
        assert_eq!(
            model.value_at("leftColumnSelectionConfigV2/manualFilter/includeUnknownColumns"),
            Some(&Value::Boolean(false))
        );
        assert!(deselected(&cfg.select_fields).is_empty());
    }

    #[test]
    fn unknown_columns_kept_unless_wildcard_deselected() {
        let unknown = "rightColumnSelectionConfigV2/manualFilter/includeUnknownColumns";

        let mut model = Config::new("model");
        fill(&mut model, &join(&[], &[]));
        assert_eq!(model.value_at(unknown), Some(&Value::Boolean(true)));

        let mut cfg = join(&[], &[]);
        cfg.select_fields = vec![select(SelectField::WILDCARD, true), select("drop", false)];
        let mut model = Config::new("model");
        fill(&mut model, &cfg);
        assert_eq!(model.value_at(unknown), Some(&Value::Boolean(true)));
        assert_eq!(deselected(&cfg.select_fields), vec!["drop"]);
    }
}
