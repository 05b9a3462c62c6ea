//! LaTeX output buffer.

use std::sync::LazyLock;

use regex::Regex;

static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n\s]+").unwrap());

/// Output buffer of one LaTeX render.
#[derive(Debug, Default)]
pub(crate) struct TexWriter {
    out: String,
}

impl TexWriter {
    pub(crate) fn write(&mut self, text: &str) {
        self.out.push_str(text);
    }

    pub(crate) fn write_char(&mut self, c: char) {
        self.out.push(c);
    }

    /// Write `text` with every whitespace run folded into one space.
    pub(crate) fn write_stripped(&mut self, text: &str) {
        self.out.push_str(&LINE_BREAKS.replace_all(text, " "));
    }

    /// Always emits a line end; two in a row leave a blank line.
    pub(crate) fn line(&mut self) {
        self.out.push('\n');
    }

    /// A single space, unless at the start or right after another space.
    pub(crate) fn whitespace(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with(' ') {
            self.out.push(' ');
        }
    }

    pub(crate) fn into_string(self) -> String {
        self.out
    }
}
