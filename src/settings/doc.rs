//! Typed tree for the target engine's XML configuration dialect.
//!
//! Documents are built as `Config`/`Entry` nodes and serialized once, so
//! every embedded value goes through the same escaping.

use crate::writer::CodeWriter;

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const ROOT_ATTRS: &str = r#"xmlns="http://www.knime.org/2008/09/XMLConfig" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://www.knime.org/2008/09/XMLConfig http://www.knime.org/XMLConfig_2008_09.xsd""#;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    /// A string entry flagged `isnull`.
    NullString,
    Int(i64),
    Boolean(bool),
    Byte(i8),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) | Value::NullString => "xstring",
            Value::Int(_) => "xint",
            Value::Boolean(_) => "xboolean",
            Value::Byte(_) => "xbyte",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Entry(Entry),
    Config(Config),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub key: String,
    pub items: Vec<Item>,
}

impl Config {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            items: Vec::new(),
        }
    }

    fn entry(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.items.push(Item::Entry(Entry {
            key: key.into(),
            value,
        }));
        self
    }

    pub fn string(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entry(key, Value::String(value.into()))
    }

    pub fn null_string(&mut self, key: impl Into<String>) -> &mut Self {
        self.entry(key, Value::NullString)
    }

    pub fn int(&mut self, key: impl Into<String>, value: i64) -> &mut Self {
        self.entry(key, Value::Int(value))
    }

    pub fn boolean(&mut self, key: impl Into<String>, value: bool) -> &mut Self {
        self.entry(key, Value::Boolean(value))
    }

    pub fn byte(&mut self, key: impl Into<String>, value: i8) -> &mut Self {
        self.entry(key, Value::Byte(value))
    }

    /// Append a nested config filled by `build`.
    pub fn config(&mut self, key: impl Into<String>, build: impl FnOnce(&mut Config)) -> &mut Self {
        let mut child = Config::new(key);
        build(&mut child);
        self.push(child)
    }

    /// Append a nested config with no items.
    pub fn empty(&mut self, key: impl Into<String>) -> &mut Self {
        self.push(Config::new(key))
    }

    /// Append an already built config.
    pub fn push(&mut self, child: Config) -> &mut Self {
        self.items.push(Item::Config(child));
        self
    }

    /// The dialect's array form: `array-size` followed by entries `0..n`.
    pub fn string_array<I, S>(&mut self, key: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<Value> = values.into_iter().map(|v| Value::String(v.into())).collect();
        self.array(key, values)
    }

    pub fn boolean_array<I>(&mut self, key: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = bool>,
    {
        let values: Vec<Value> = values.into_iter().map(Value::Boolean).collect();
        self.array(key, values)
    }

    pub fn int_array<I>(&mut self, key: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = i64>,
    {
        let values: Vec<Value> = values.into_iter().map(Value::Int).collect();
        self.array(key, values)
    }

    fn array(&mut self, key: impl Into<String>, values: Vec<Value>) -> &mut Self {
        self.config(key, |array| {
            array.int("array-size", values.len() as i64);
            for (i, value) in values.into_iter().enumerate() {
                array.entry(i.to_string(), value);
            }
        })
    }

    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    pub fn child(&self, key: &str) -> Option<&Config> {
        self.items.iter().find_map(|item| match item {
            Item::Config(c) if c.key == key => Some(c),
            _ => None,
        })
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.items.iter().find_map(|item| match item {
            Item::Entry(e) if e.key == key => Some(&e.value),
            _ => None,
        })
    }

    /// Follow a `/`-separated path of config keys, ending at an entry.
    pub fn value_at(&self, path: &str) -> Option<&Value> {
        let (parents, leaf) = match path.rsplit_once('/') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, path),
        };
        let mut node = self;
        for key in parents.into_iter().flat_map(|p| p.split('/')) {
            node = node.child(key)?;
        }
        node.value(leaf)
    }

    /// Read back an array written by one of the `*_array` helpers.
    pub fn array_values(&self) -> Vec<&Value> {
        let size = match self.value("array-size") {
            Some(Value::Int(n)) => *n as usize,
            _ => return Vec::new(),
        };
        (0..size)
            .filter_map(|i| self.value(&i.to_string()))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Serialization
    // -------------------------------------------------------------------------

    /// Serialize as a standalone document with this config as the root.
    pub fn to_document(&self) -> String {
        let mut w = CodeWriter::with_indent("    ");
        w.line(XML_HEADER);
        let key = escape(&self.key);
        if self.items.is_empty() {
            w.line(&format!("<config {} key=\"{}\"/>", ROOT_ATTRS, key));
        } else {
            w.open(&format!("<config {} key=\"{}\">", ROOT_ATTRS, key));
            self.write_items(&mut w);
            w.close("</config>");
        }
        w.finish()
    }

    fn write_to(&self, w: &mut CodeWriter) {
        let key = escape(&self.key);
        if self.items.is_empty() {
            w.line(&format!("<config key=\"{}\"/>", key));
            return;
        }
        w.open(&format!("<config key=\"{}\">", key));
        self.write_items(w);
        w.close("</config>");
    }

    fn write_items(&self, w: &mut CodeWriter) {
        for item in &self.items {
            match item {
                Item::Config(child) => child.write_to(w),
                Item::Entry(entry) => entry.write_to(w),
            }
        }
    }
}

impl Entry {
    fn write_to(&self, w: &mut CodeWriter) {
        w.write(&format!(
            "<entry key=\"{}\" type=\"{}\"",
            escape(&self.key),
            self.value.type_name()
        ));
        let tail = match &self.value {
            Value::String(s) => format!(" value=\"{}\"/>", escape(s)),
            Value::NullString => " isnull=\"true\" value=\"\"/>".to_string(),
            Value::Int(n) => format!(" value=\"{}\"/>", n),
            Value::Boolean(b) => format!(" value=\"{}\"/>", b),
            Value::Byte(b) => format!(" value=\"{}\"/>", b),
        };
        w.line(&tail);
    }
}

/// Escape a value for embedding in an attribute.
///
/// The dialect stores line breaks as `%%000NN` codes instead of raw
/// characters.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("%%00010"),
            '\r' => out.push_str("%%00013"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_specials_and_newlines() {
        assert_eq!(
            escape("a < b && c > \"d\"\r\nnext"),
            "a &lt; b &amp;&amp; c &gt; &quot;d&quot;%%00013%%00010next"
        );
    }

    #[test]
    fn serializes_nested_configs() {
        let mut root = Config::new("settings.xml");
        root.string("node_file", "settings.xml");
        root.empty("flow_stack");
        root.config("model", |m| {
            m.int("count", 2).null_string("label");
        });
        let doc = root.to_document();
        let expected = [
            XML_HEADER.to_string(),
            format!("<config {} key=\"settings.xml\">", ROOT_ATTRS),
            "    <entry key=\"node_file\" type=\"xstring\" value=\"settings.xml\"/>".to_string(),
            "    <config key=\"flow_stack\"/>".to_string(),
            "    <config key=\"model\">".to_string(),
            "        <entry key=\"count\" type=\"xint\" value=\"2\"/>".to_string(),
            "        <entry key=\"label\" type=\"xstring\" isnull=\"true\" value=\"\"/>".to_string(),
            "    </config>".to_string(),
            "</config>".to_string(),
        ]
        .join("\n")
            + "\n";
        assert_eq!(doc, expected);
    }

    #[test]
    fn arrays_round_trip_through_lookup() {
        let mut root = Config::new("r");
        root.string_array("cols", ["a", "b"]);
        root.boolean_array("flags", [false]);
        let cols = root.child("cols").unwrap();
        assert_eq!(cols.value("array-size"), Some(&Value::Int(2)));
        let names: Vec<_> = cols.array_values().iter().filter_map(|v| v.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(root.value_at("flags/0"), Some(&Value::Boolean(false)));
    }

    #[test]
    fn user_text_cannot_break_out_of_attribute() {
        let mut root = Config::new("r");
        root.string("sql", "SELECT \"x\" FROM t WHERE a<b");
        let doc = root.to_document();
        assert!(doc.contains("value=\"SELECT &quot;x&quot; FROM t WHERE a&lt;b\""));
    }
}
