//! Table Manipulator settings from a Select config.
//!
//! Every concrete field gets an explicit column spec. The wildcard
//! pseudo-field only decides whether unlisted columns pass through.

use crate::graph::{SelectConfig, SelectField};

use super::{Config, STRING_CELL};

const BOUNDED_TABLE_KEY: &str =
    "org.knime.base.node.preproc.manipulator.table.DataTableBackedBoundedTable@6bd64fab";
const SOURCE_GROUP_ID: &str = "org.knime.base.node.preproc.manipulator.table.EmptyTable@5339229c";

/// Whether columns not named in the config are kept. Defaults to keeping
/// them when no wildcard is present.
pub fn keep_unknown(fields: &[SelectField]) -> bool {
    fields
        .iter()
        .find(|f| f.is_wildcard())
        .is_none_or(|f| f.selected)
}

pub fn fill(model: &mut Config, select: &SelectConfig) {
    let columns: Vec<Config> = select
        .fields
        .iter()
        .filter(|f| !f.is_wildcard())
        .enumerate()
        .map(|(position, field)| column_spec(position, field))
        .collect();
    let count = columns.len() as i64;
    let keep_unknown = keep_unknown(&select.fields);

    model
        .config("table_spec_config_Internals", |t| {
            t.string("version", "V4_4")
                .config("individual_specs", |specs| {
                    specs.config(BOUNDED_TABLE_KEY, |table| {
                        table.int("num_columns", count);
                        for column in &columns {
                            table.push(column.clone());
                        }
                    });
                })
                .config("table_transformation", |tr| {
                    tr.config("columns", |c| {
                        for column in &columns {
                            c.push(column.clone());
                        }
                    })
                    .boolean("skip_empty_columns", false)
                    .boolean("enforce_types", true)
                    .string("column_filter_mode", "UNION")
                    .config("unknown_columns_transformation", |u| {
                        u.int("position", count)
                            .boolean("keep", keep_unknown)
                            .boolean("force_type", false);
                    });
                })
                .string("source_group_id", SOURCE_GROUP_ID)
                .config("config_id", |c| {
                    c.empty("table_manipulator");
                });
        })
        .config("settings", |s| {
            s.boolean("has_row_id", false)
                .boolean("prepend_table_index_to_row_id", false);
        });
}

fn column_spec(position: usize, field: &SelectField) -> Config {
    let output_name = field
        .rename
        .as_deref()
        .filter(|r| !r.is_empty())
        .unwrap_or(&field.field);

    let mut column = Config::new(position.to_string());
    column
        .config("external_spec", |spec| {
            spec.string("name", field.field.as_str())
                .boolean("has_type", true)
                .config("type", |outer| {
                    outer.config("type", |inner| {
                        inner.string("cell_class", STRING_CELL).boolean("is_null", false);
                    });
                });
        })
        .string("name", output_name)
        .boolean("keep", field.selected)
        .int("position", position as i64)
        .config("production_path", |p| {
            p.string("_converter", "CELL_CONVERTER_IDENTITY_FACTORY")
                .string("_converter_src", "org.knime.core.data.DataCell")
                .string("_converter_dst", "String")
                .string("_converter_name", "")
                .config("_converter_config", |c| {
                    c.string("cell_class", STRING_CELL);
                })
                .string("_producer", "CELL_VALUE_PRODUCER_IDENTITY_FACTORY")
                .string("_producer_src", "String")
                .string("_producer_dst", "org.knime.core.data.DataCell")
                .string("_producer_name", "org.knime.core.data.DataCell")
                .config("_producer_config", |c| {
                    c.string("cell_class", STRING_CELL);
                });
        });
    column
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Value;

    fn field(name: &str, selected: bool, rename: Option<&str>) -> SelectField {
        SelectField {
            field: name.into(),
            selected,
            rename: rename.map(String::from),
            side: None,
        }
    }

    fn transformation(model: &Config) -> &Config {
        model
            .child("table_spec_config_Internals")
            .and_then(|t| t.child("table_transformation"))
            .unwrap()
    }

    #[test]
    fn explicit_columns_exclude_wildcard() {
        let cfg = SelectConfig {
            fields: vec![
                field("Tax ID", true, Some("TaxId")),
                field(SelectField::WILDCARD, true, None),
                field("Notes", false, None),
            ],
        };
        let mut model = Config::new("model");
        fill(&mut model, &cfg);

        let columns = transformation(&model).child("columns").unwrap();
        assert_eq!(columns.items.len(), 2);
        let first = columns.child("0").unwrap();
        assert_eq!(
            first.value_at("external_spec/name").and_then(Value::as_str),
            Some("Tax ID")
        );
        assert_eq!(first.value("name").and_then(Value::as_str), Some("TaxId"));
        let second = columns.child("1").unwrap();
        assert_eq!(second.value("keep"), Some(&Value::Boolean(false)));
        assert_eq!(second.value("position"), Some(&Value::Int(1)));
        assert_eq!(
            transformation(&model).value_at("unknown_columns_transformation/position"),
            Some(&Value::Int(2))
        );
    }

    #[test]
    fn wildcard_controls_unknown_columns() {
        assert!(keep_unknown(&[]));
        assert!(keep_unknown(&[field(SelectField::WILDCARD, true, None)]));
        assert!(!keep_unknown(&[field(SelectField::WILDCARD, false, None)]));

        let cfg = SelectConfig {
            fields: vec![field(SelectField::WILDCARD, false, None)],
        };
        let mut model = Config::new("model");
        fill(&mut model, &cfg);
        assert_eq!(
            transformation(&model).value_at("unknown_columns_transformation/keep"),
            Some(&Value::Boolean(false))
        );
    }
}
