//! # atessera
//!
//! Markdown for papers and books, rendered to HTML or LaTeX.
//!
//! On top of CommonMark (parsed by `pulldown-cmark`) atessera understands:
//! - **Annotated images**: `***[key]alt text***comment`
//! - **Citations**: `***[#ref]bibliography text` blocks and `[#ref]` references
//! - **Labels**: `@@ name @@` containers whose body is indented by four columns
//! - **Math**: `$$expr$$`, `$$$expr$$$` and `$$expr$$(label)` blocks, `[$expr]` spans
//! - **Cross-references**: `[@key]` and `[@@key]` (page) spans
//!
//! Two engines walk the parsed [`Node`] tree: [`HtmlTarget`] and [`LatexTarget`].
//! Each engine owns its definition registries and bibliography, which
//! accumulate across calls until [`HtmlTarget::reset`] (or a fresh engine).
//!
//! ## Example
//!
//! ```text
//! use atessera::{HtmlTarget, Options};
//!
//! let mut target = HtmlTarget::new(Options::default());
//! let html = target.parse("***[img1]an apple***caption\n");
//! assert!(html.contains("<img src=\"img1\" alt=\"an apple\">"));
//! ```

mod blocks;
mod build;
mod extchars;
pub mod html;
mod inlines;
pub mod latex;
mod node;
mod options;
mod registry;
mod scan;
mod walk;

pub use blocks::{BlockStart, Continuation, RecognizedBlock, recognize_block};
pub use build::Parser;
pub use extchars::{LQUOT, MDASH, NBSP, NDASH, RQUOT, ext_chars};
pub use html::{DefaultHtmlHooks, HtmlHooks, HtmlTarget};
pub use inlines::{SpanKind, reinterpret_span};
pub use latex::{DefaultLatexHooks, LatexHooks, LatexTarget, TexRenderer};
pub use latex::escape::{escape, escape_relaxed, escape_strict};
pub use node::{
    AnnotatedImage, CitationDefinition, CitationReference, CrossReference, LabelBlock, MathBlock,
    MAX_DEPTH, MathKind, MathSpan, Node, NodeKind, ReferenceKind,
};
pub use options::{Feature, Features, Options};
pub use registry::{Bibliography, DefinitionRegistry, Definitions};
pub use walk::enumerate;

use std::path::PathBuf;

/// Error type for atessera operations.
///
/// Parsing and rendering never fail; only loading options can.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Options file could not be read
    #[error("failed to read options from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Options document is not valid YAML for [`Options`]
    #[error("invalid options: {0}")]
    Config(#[from] serde_yaml::Error),
}

/// Result type alias for atessera operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Join `lines` with `\n`, render with `render`, and split the output on `\n` again.
///
/// Trailing empty lines are dropped from the result. Rendered output that
/// legitimately contains line breaks (fenced code, for instance) comes back
/// as several entries.
pub(crate) fn render_lines<S, F>(lines: &[S], render: F) -> Vec<String>
where
    S: AsRef<str>,
    F: FnOnce(&str) -> String,
{
    let mut text = lines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n");
    text.push('\n');

    let rendered = render(&text);
    let mut out: Vec<String> = rendered.split('\n').map(str::to_string).collect();
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out
}
