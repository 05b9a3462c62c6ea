//! Override points of the HTML engine.

use std::sync::Arc;

use crate::extchars::ext_chars;
use crate::node::{
    AnnotatedImage, CitationDefinition, CitationReference, CrossReference, LabelBlock, MathBlock,
    MathSpan,
};

/// Escapes text the way the engine escapes text nodes: typographic
/// transcoding first (when enabled), then HTML entities.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlEscaper {
    ext_chars: bool,
}

impl HtmlEscaper {
    pub fn new(ext_chars: bool) -> Self {
        Self { ext_chars }
    }

    pub fn ext_chars_enabled(&self) -> bool {
        self.ext_chars
    }

    /// Transcode if enabled, without HTML escaping.
    pub fn transcode(&self, text: &str) -> String {
        if self.ext_chars {
            ext_chars(text)
        } else {
            text.to_string()
        }
    }

    pub fn escape(&self, text: &str) -> String {
        escape_html(&self.transcode(text))
    }
}

/// Escape `& < > "`.
pub(crate) fn escape_html(text: &str) -> String {
    html_escape::encode_text(text).replace('"', "&quot;")
}

/// Hooks called by [`HtmlTarget`](super::HtmlTarget) while rendering.
///
/// Every method has a default, so implementors only override what they need.
///
/// # Example
///
/// ```rust,ignore
/// use atessera::{HtmlHooks, HtmlTarget, Options};
/// use atessera::CitationReference;
///
/// struct Numbered;
///
/// impl HtmlHooks for Numbered {
///     fn citation_reference(&self, reference: &CitationReference) -> String {
///         format!("<a href=\"#cite-{}\">[{}]</a>", reference.key, reference.key)
///     }
/// }
///
/// let mut target = HtmlTarget::new(Options::default()).with_hooks(Numbered);
/// ```
pub trait HtmlHooks: Send + Sync {
    /// Replacement for a link destination; `None` keeps it.
    fn translate_ref(&self, _href: &str) -> Option<String> {
        None
    }

    /// Tooltip for a link without an explicit title.
    ///
    /// Receives the destination as written and the one actually emitted.
    fn ref_title(&self, _href: &str, _effective_href: &str) -> Option<String> {
        None
    }

    /// Text placed at the start of a heading's content.
    fn on_heading(&self, _level: u8) -> Option<String> {
        None
    }

    fn annotated_image(&self, image: &AnnotatedImage, escaper: &HtmlEscaper) -> String {
        format!(
            "<img src=\"{}\" alt=\"{}\">\n",
            escaper.escape(&image.key),
            escaper.escape(&image.alt)
        )
    }

    /// Citation definitions only feed the bibliography by default.
    fn citation_definition(&self, _citation: &CitationDefinition) -> String {
        String::new()
    }

    fn citation_reference(&self, _reference: &CitationReference) -> String {
        "citeref".to_string()
    }

    fn math_span(&self, math: &MathSpan) -> String {
        math.text.clone()
    }

    fn math_block(&self, math: &MathBlock) -> String {
        math.text.clone()
    }

    /// `content` is the rendered markup of the label's nested blocks.
    fn label(&self, _label: &LabelBlock, _content: &str) -> String {
        String::new()
    }

    fn cross_reference(&self, _reference: &CrossReference) -> String {
        String::new()
    }
}

/// Type alias for shared HTML hooks.
pub type BoxedHtmlHooks = Arc<dyn HtmlHooks>;

/// Hooks with every default in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHtmlHooks;

impl HtmlHooks for DefaultHtmlHooks {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extchars::MDASH;

    #[test]
    fn test_escaper() {
        let plain = HtmlEscaper::new(false);
        assert_eq!(plain.escape("a < b & \"c\" --"), "a &lt; b &amp; &quot;c&quot; --");

        let ext = HtmlEscaper::new(true);
        assert_eq!(ext.escape("a---b <<c>>"), format!("a{MDASH}b «c»"));
    }

    #[test]
    fn test_default_annotated_image() {
        let image = AnnotatedImage {
            key: "img1".into(),
            alt: "an \"apple\"".into(),
            comment: "caption".into(),
        };
        assert_eq!(
            DefaultHtmlHooks.annotated_image(&image, &HtmlEscaper::default()),
            "<img src=\"img1\" alt=\"an &quot;apple&quot;\">\n"
        );
    }
}
