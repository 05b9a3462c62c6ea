//! LaTeX engine.

pub mod escape;
mod hooks;
mod render;
mod writer;

pub use hooks::{BoxedLatexHooks, DefaultLatexHooks, LatexHooks};
pub use render::TexRenderer;

use std::sync::Arc;

use crate::build::Parser;
use crate::node::Node;
use crate::options::{Feature, Options};
use crate::registry::{Bibliography, Definitions};
use crate::render_lines;

/// Markdown to LaTeX.
///
/// With [`Options::strip_newlines`] set, soft breaks and raw HTML collapse
/// to single spaces.
pub struct LatexTarget {
    parser: Parser,
    hooks: BoxedLatexHooks,
    definitions: Definitions,
    biblio: Bibliography,
}

impl LatexTarget {
    pub fn new(options: Options) -> Self {
        Self {
            parser: Parser::new(options),
            hooks: Arc::new(DefaultLatexHooks),
            definitions: Definitions::default(),
            biblio: Bibliography::default(),
        }
    }

    pub fn with_hooks<H: LatexHooks + 'static>(mut self, hooks: H) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    pub fn options(&self) -> &Options {
        self.parser.options()
    }

    /// Render `text` to LaTeX.
    pub fn parse(&mut self, text: &str) -> String {
        let document = self.document(text);
        self.render(&document)
    }

    /// Render lines joined with `\n`, and split the output the same way.
    pub fn parse_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> Vec<String> {
        render_lines(lines, |text| self.parse(text))
    }

    /// Parse `text` into a tree, registering its definitions and filling
    /// the bibliography, without rendering it.
    pub fn document(&mut self, text: &str) -> Node {
        let document = self.parser.parse_with(text, &mut self.definitions);
        if self.options().has(Feature::Citations) {
            self.biblio.collect(&document);
        }
        document
    }

    pub fn render(&self, document: &Node) -> String {
        TexRenderer::new(self.hooks.as_ref(), self.options().strip_newlines).render(document)
    }

    pub fn biblio(&self) -> &Bibliography {
        &self.biblio
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    pub fn reset(&mut self) {
        self.definitions.clear();
        self.biblio.clear();
    }
}

impl Default for LatexTarget {
    fn default() -> Self {
        Self::new(Options::default())
    }
}
