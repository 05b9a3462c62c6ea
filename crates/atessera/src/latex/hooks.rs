//! Override points of the LaTeX engine.

use std::sync::Arc;

use crate::node::{
    AnnotatedImage, CitationDefinition, CitationReference, CrossReference, LabelBlock, MathBlock,
    MathSpan,
};

/// Hooks called by [`LatexTarget`](super::LatexTarget) while rendering.
///
/// The custom inline and block kinds render as debug placeholders until
/// overridden.
pub trait LatexHooks: Send + Sync {
    /// Markup opening a heading of `level`.
    ///
    /// Returning `None` falls back to a plain `\section{...}`.
    fn heading_opening(&self, level: u8) -> Option<String> {
        let opening = match level {
            1 => r"\section{",
            2 => r"\subsection{",
            3 => r"\subsubsection{",
            _ => "{",
        };
        Some(opening.to_string())
    }

    /// Markup closing a heading opened by [`LatexHooks::heading_opening`].
    fn heading_closing(&self, _level: u8) -> String {
        "}\n\n".to_string()
    }

    fn annotated_image(&self, _image: &AnnotatedImage) -> String {
        String::new()
    }

    fn citation_definition(&self, _citation: &CitationDefinition) -> String {
        String::new()
    }

    fn citation_reference(&self, reference: &CitationReference) -> String {
        format!("{reference:?}")
    }

    fn math_span(&self, math: &MathSpan) -> String {
        format!("{math:?}")
    }

    fn math_block(&self, math: &MathBlock) -> String {
        format!("{math:?}")
    }

    /// `content` is the rendered markup of the label's nested blocks.
    fn label(&self, label: &LabelBlock, _content: &str) -> String {
        label.to_string()
    }

    fn cross_reference(&self, reference: &CrossReference) -> String {
        format!("{reference:?}")
    }
}

/// Type alias for shared LaTeX hooks.
pub type BoxedLatexHooks = Arc<dyn LatexHooks>;

/// Hooks with every default in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLatexHooks;

impl LatexHooks for DefaultLatexHooks {}
