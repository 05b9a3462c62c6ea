//! Node-by-node LaTeX formatting.

use tracing::warn;

use super::escape::{escape_relaxed, escape_strict};
use super::hooks::LatexHooks;
use super::writer::TexWriter;
use crate::node::{MAX_DEPTH, Node, NodeKind};

/// Renders a [`Node`] tree to LaTeX.
///
/// Generic kinds have a fixed formatting; custom kinds and headings go
/// through the [`LatexHooks`].
pub struct TexRenderer<'a> {
    hooks: &'a dyn LatexHooks,
    strip_newlines: bool,
    writer: TexWriter,
    list_depth: usize,
}

impl<'a> TexRenderer<'a> {
    pub fn new(hooks: &'a dyn LatexHooks, strip_newlines: bool) -> Self {
        Self {
            hooks,
            strip_newlines,
            writer: TexWriter::default(),
            list_depth: 0,
        }
    }

    pub fn render(mut self, document: &Node) -> String {
        self.node(document, None, false, 0);
        self.writer.into_string()
    }

    fn node(&mut self, node: &Node, parent: Option<&NodeKind>, has_next: bool, depth: usize) {
        match &node.kind {
            NodeKind::Document => self.children(node, depth),

            NodeKind::BlockQuote => {
                self.writer.write_char('«');
                self.children(node, depth);
                self.writer.write_char('»');
                self.end_of_line_if_needed(parent, has_next);
            }
            NodeKind::Code(code) => {
                self.writer.write(r"{\ttfamily ");
                self.writer.write(&escape_strict(code));
                self.writer.write("}");
            }
            NodeKind::FencedCodeBlock { literal, .. } => {
                self.writer.write("{ ");
                self.writer.write(literal);
                self.writer.write("}");
            }
            NodeKind::HardLineBreak => {
                self.writer.write(r"\\");
                self.writer.line();
            }
            NodeKind::Heading { level } => match self.hooks.heading_opening(*level) {
                Some(opening) => {
                    self.writer.write(&opening);
                    self.children(node, depth);
                    let closing = self.hooks.heading_closing(*level);
                    self.writer.write(&closing);
                }
                None => {
                    self.writer.write(r"\section{");
                    self.children(node, depth);
                    self.writer.write("}");
                    self.writer.line();
                    self.writer.line();
                }
            },
            NodeKind::Emphasis => {
                self.writer.write(r"{\it ");
                self.children(node, depth);
                self.writer.write("}");
            }
            NodeKind::StrongEmphasis => {
                self.writer.write(r"{\bf ");
                self.children(node, depth);
                self.writer.write("}");
            }
            NodeKind::ThematicBreak => {
                if !self.strip_newlines {
                    self.writer.write("***");
                }
                self.end_of_line_if_needed(parent, has_next);
            }
            NodeKind::HtmlInline(html) => self.text(html),
            NodeKind::HtmlBlock { literal } => self.text(literal),
            NodeKind::Image { destination, .. } => {
                self.writer.write("\\begin{wrapfigure}{r}{0.25\\textwidth}\n");
                self.writer.write("\\centering\n");
                self.writer.write("\\includegraphics[width=0.23\\textwidth]{");
                self.writer.write(&escape_strict(destination));
                self.writer.write(".pdf}\n");
                self.writer.write("\\end{wrapfigure}");
            }
            NodeKind::IndentedCodeBlock { literal } => {
                self.writer.write(r"{\footnotesize");
                self.writer.line();
                self.writer.write(r"\begin{verbatim}");
                self.writer.line();
                self.writer.write(literal);
                self.writer.write(r"\end{verbatim}");
                self.writer.line();
                self.writer.write("}");
                self.writer.line();
                if has_next {
                    self.writer.line();
                }
            }
            NodeKind::Link { destination, .. } => {
                if !node.children.is_empty() {
                    self.writer.write(r"\href{");
                    self.writer.write(destination);
                    self.writer.write("}{");
                    self.children(node, depth);
                    self.writer.write("}");
                }
            }
            NodeKind::ListItem => {
                self.writer.write(r"\item{");
                self.writer.line();
                self.list_item_children(node, depth);
                self.writer.line();
            }
            NodeKind::BulletList { .. } => {
                if self.list_depth > 0 {
                    self.writer.line();
                }
                self.list_depth += 1;
                self.writer.write(r"\begin{itemize}");
                self.writer.line();
                self.children(node, depth);
                self.writer.write(r"\end{itemize}");
                self.writer.line();
                if has_next {
                    self.writer.line();
                }
                self.list_depth -= 1;
            }
            NodeKind::OrderedList { .. } => {
                self.writer.write(r"\begin{enumerate}");
                self.writer.line();
                if self.list_depth > 0 {
                    self.writer.line();
                }
                self.list_depth += 1;
                self.children(node, depth);
                self.list_depth -= 1;
                self.writer.write(r"\end{enumerate}");
                self.writer.line();
                if has_next {
                    self.writer.line();
                }
            }
            NodeKind::Paragraph { .. } => {
                self.children(node, depth);
                self.writer.line();
                if has_next {
                    self.writer.line();
                }
            }
            NodeKind::SoftLineBreak => self.end_of_line_if_needed(parent, has_next),
            NodeKind::Text(text) => {
                let escaped = escape_relaxed(text).replace('/', r"{\slash}");
                self.text(&escaped);
            }

            NodeKind::AnnotatedImage(image) => {
                let tex = self.hooks.annotated_image(image);
                self.writer.write(&tex);
            }
            NodeKind::CitationDefinition(citation) => {
                let tex = self.hooks.citation_definition(citation);
                self.writer.write(&tex);
            }
            NodeKind::CitationReference(reference) => {
                let tex = self.hooks.citation_reference(reference);
                self.writer.write(&tex);
            }
            NodeKind::MathSpan(math) => {
                let tex = self.hooks.math_span(math);
                self.writer.write(&tex);
            }
            NodeKind::MathBlock(math) => {
                let tex = self.hooks.math_block(math);
                self.writer.write(&tex);
            }
            NodeKind::CrossReference(reference) => {
                let tex = self.hooks.cross_reference(reference);
                self.writer.write(&tex);
            }
            NodeKind::Label(label) => {
                let outer = std::mem::take(&mut self.writer);
                self.children(node, depth);
                let content = std::mem::replace(&mut self.writer, outer).into_string();
                let tex = self.hooks.label(label, &content);
                self.writer.write(&tex);
            }
        }
    }

    fn children(&mut self, node: &Node, depth: usize) {
        if depth >= MAX_DEPTH {
            warn!(depth, "document nested too deeply, dropping subtree");
            return;
        }
        let count = node.children.len();
        for (i, child) in node.children.iter().enumerate() {
            self.node(child, Some(&node.kind), i + 1 < count, depth + 1);
        }
    }

    /// The item's group closes right after its first child; the remaining
    /// children follow outside it.
    fn list_item_children(&mut self, item: &Node, depth: usize) {
        if depth >= MAX_DEPTH {
            warn!(depth, "document nested too deeply, dropping subtree");
            return;
        }
        let count = item.children.len();
        for (i, child) in item.children.iter().enumerate() {
            self.node(child, Some(&item.kind), i + 1 < count, depth + 1);
            if i == 0 {
                self.writer.write("}");
            }
        }
    }

    fn text(&mut self, text: &str) {
        if self.strip_newlines {
            self.writer.write_stripped(text);
        } else {
            self.writer.write(text);
        }
    }

    fn end_of_line_if_needed(&mut self, parent: Option<&NodeKind>, has_next: bool) {
        if self.strip_newlines {
            if has_next {
                self.writer.whitespace();
            }
        } else if has_next && parent.is_some_and(|p| !matches!(p, NodeKind::ListItem)) {
            self.writer.line();
        }
    }
}
