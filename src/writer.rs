//! Indent-aware string builder shared by script and document emission.
//!
//! Scripts use no indentation; settings documents indent nested configs by
//! four spaces.

/// Indent-aware string builder.
pub struct CodeWriter {
    buf: String,
    unit: &'static str,
    indent_level: usize,
    /// True if the current line has not yet been written to.
    at_line_start: bool,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::with_indent("  ")
    }

    /// Writer that indents each level with `unit`.
    pub fn with_indent(unit: &'static str) -> Self {
        Self {
            buf: String::with_capacity(1024),
            unit,
            indent_level: 0,
            at_line_start: true,
        }
    }

    /// Write a complete line (appends newline).
    pub fn line(&mut self, text: &str) {
        self.write_indent();
        self.buf.push_str(text);
        self.buf.push('\n');
        self.at_line_start = true;
    }

    /// Write text without a trailing newline.
    pub fn write(&mut self, text: &str) {
        self.write_indent();
        self.buf.push_str(text);
    }

    /// Increase indent by one level.
    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    /// Decrease indent by one level.
    pub fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    /// Write an opening line and increase indent.
    pub fn open(&mut self, text: &str) {
        self.line(text);
        self.indent();
    }

    /// Decrease indent and write a closing line.
    pub fn close(&mut self, text: &str) {
        self.dedent();
        self.line(text);
    }

    /// Consume the writer and return the generated string.
    pub fn finish(self) -> String {
        self.buf
    }

    fn write_indent(&mut self) {
        if self.at_line_start {
            for _ in 0..self.indent_level {
                self.buf.push_str(self.unit);
            }
        }
        self.at_line_start = false;
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}
