//! HTML output buffer.

use pulldown_cmark::Event;

/// Output buffer of one HTML render.
#[derive(Debug, Default)]
pub(crate) struct HtmlWriter {
    out: String,
}

impl HtmlWriter {
    pub(crate) fn raw(&mut self, text: &str) {
        self.out.push_str(text);
    }

    /// Start a new line unless already at the start of one.
    pub(crate) fn line(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    /// Render generic markup through pulldown-cmark's HTML writer.
    pub(crate) fn events<'a, I>(&mut self, events: I)
    where
        I: IntoIterator<Item = Event<'a>>,
    {
        pulldown_cmark::html::push_html(&mut self.out, events.into_iter());
    }

    pub(crate) fn len(&self) -> usize {
        self.out.len()
    }

    pub(crate) fn into_string(self) -> String {
        self.out
    }
}
