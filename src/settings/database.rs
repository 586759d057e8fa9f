//! Settings for the two halves of a database source: connector and query
//! reader.

use crate::graph::SourceConfig;

use super::Config;

pub const DEFAULT_SQL: &str = "SELECT * FROM TABLE";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 1521;
pub const DEFAULT_DATABASE: &str = "XE";
pub const DEFAULT_USERNAME: &str = "user";

pub fn fill_connector(model: &mut Config, source: &SourceConfig) {
    model
        .config("oracle-connection", |c| {
            c.string("host", source.host.as_deref().unwrap_or(DEFAULT_HOST))
                .int("port", i64::from(source.port.unwrap_or(DEFAULT_PORT)))
                .string(
                    "database_name",
                    source.database.as_deref().unwrap_or(DEFAULT_DATABASE),
                );
        })
        .config("authentication", |c| {
            c.string(
                "username",
                source.username.as_deref().unwrap_or(DEFAULT_USERNAME),
            )
            .string("selectedType", "USER_PWD");
        });
}

pub fn fill_reader(model: &mut Config, source: &SourceConfig) {
    let sql = source
        .sql
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_SQL);
    model
        .string("sql_statement", sql)
        .config("external_to_knime_mapping_Internals", |c| {
            c.string("SettingsModelID", "SMID_dataTypeMapping")
                .boolean("EnabledStatus", true);
        });
}
