//! HTML engine.
//!
//! Generic markup goes through pulldown-cmark's HTML writer one event at a
//! time; headings, text, links and the custom kinds are written here so the
//! [`HtmlHooks`] can step in.

mod hooks;
mod writer;

pub use hooks::{BoxedHtmlHooks, DefaultHtmlHooks, HtmlEscaper, HtmlHooks};

use std::sync::Arc;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, LinkType, Tag, TagEnd};
use tracing::warn;

use crate::build::Parser;
use crate::node::{MAX_DEPTH, Node, NodeKind};
use crate::options::{Feature, Options};
use crate::registry::{Bibliography, Definitions};
use crate::render_lines;

use writer::HtmlWriter;

/// Markdown to HTML.
///
/// Definition registries and the bibliography accumulate across calls on
/// the same target until [`HtmlTarget::reset`].
pub struct HtmlTarget {
    parser: Parser,
    hooks: BoxedHtmlHooks,
    definitions: Definitions,
    biblio: Bibliography,
}

impl HtmlTarget {
    pub fn new(options: Options) -> Self {
        Self {
            parser: Parser::new(options),
            hooks: Arc::new(DefaultHtmlHooks),
            definitions: Definitions::default(),
            biblio: Bibliography::default(),
        }
    }

    /// Replace the render hooks.
    pub fn with_hooks<H: HtmlHooks + 'static>(mut self, hooks: H) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    pub fn options(&self) -> &Options {
        self.parser.options()
    }

    /// Render `text` to HTML.
    pub fn parse(&mut self, text: &str) -> String {
        let document = self.document(text);
        self.render(&document, None)
    }

    /// Render `text` and report the byte offset of every level-1 heading.
    ///
    /// Each offset points at the `<h1` of its heading in the returned string.
    pub fn parse_with_splits(&mut self, text: &str) -> (String, Vec<usize>) {
        let document = self.document(text);
        let mut splits = Vec::new();
        let html = self.render(&document, Some(&mut splits));
        (html, splits)
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

    /// Render an already parsed tree, optionally recording heading splits.
    pub fn render(&self, document: &Node, splits: Option<&mut Vec<usize>>) -> String {
        let mut renderer = HtmlRenderer {
            hooks: self.hooks.as_ref(),
            escaper: HtmlEscaper::new(self.options().has(Feature::ExtChars)),
            writer: HtmlWriter::default(),
            splits,
        };
        renderer.render(document, 0);
        renderer.writer.into_string()
    }

    /// Escape text the way text nodes are escaped.
    pub fn escape(&self, text: &str) -> String {
        HtmlEscaper::new(self.options().has(Feature::ExtChars)).escape(text)
    }

    pub fn biblio(&self) -> &Bibliography {
        &self.biblio
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    /// Forget every definition and bibliography entry seen so far.
    pub fn reset(&mut self) {
        self.definitions.clear();
        self.biblio.clear();
    }
}

impl Default for HtmlTarget {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

struct HtmlRenderer<'a> {
    hooks: &'a dyn HtmlHooks,
    escaper: HtmlEscaper,
    writer: HtmlWriter,
    splits: Option<&'a mut Vec<usize>>,
}

impl HtmlRenderer<'_> {
    fn render(&mut self, node: &Node, depth: usize) {
        match &node.kind {
            NodeKind::Document => self.children(node, depth),

            NodeKind::Paragraph { tight: true } => self.children(node, depth),
            NodeKind::Paragraph { tight: false } => {
                self.writer.line();
                self.writer.events([Event::Start(Tag::Paragraph)]);
                self.children(node, depth);
                self.writer.events([Event::End(TagEnd::Paragraph)]);
            }
            NodeKind::Heading { level } => self.heading(node, *level, depth),
            NodeKind::BlockQuote => {
                self.writer.line();
                self.writer.raw("<blockquote>\n");
                self.children(node, depth);
                self.writer.line();
                self.writer.raw("</blockquote>\n");
            }
            NodeKind::BulletList { .. } => {
                self.writer.line();
                self.writer.raw("<ul>\n");
                self.children(node, depth);
                self.writer.line();
                self.writer.raw("</ul>\n");
            }
            NodeKind::OrderedList { start, .. } => {
                self.writer.line();
                if *start == 1 {
                    self.writer.raw("<ol>\n");
                } else {
                    self.writer.raw(&format!("<ol start=\"{start}\">\n"));
                }
                self.children(node, depth);
                self.writer.line();
                self.writer.raw("</ol>\n");
            }
            NodeKind::ListItem => {
                self.writer.line();
                self.writer.raw("<li>");
                self.children(node, depth);
                self.writer.raw("</li>\n");
            }
            NodeKind::FencedCodeBlock { info, literal } => {
                self.writer.line();
                self.writer.events([
                    Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info.as_str().into()))),
                    Event::Text(literal.as_str().into()),
                    Event::End(TagEnd::CodeBlock),
                ]);
            }
            NodeKind::IndentedCodeBlock { literal } => {
                self.writer.line();
                self.writer.events([
                    Event::Start(Tag::CodeBlock(CodeBlockKind::Indented)),
                    Event::Text(literal.as_str().into()),
                    Event::End(TagEnd::CodeBlock),
                ]);
            }
            NodeKind::HtmlBlock { literal } => {
                self.writer.line();
                self.writer.raw(literal);
            }
            NodeKind::ThematicBreak => {
                self.writer.line();
                self.writer.events([Event::Rule]);
            }

            NodeKind::Text(text) => self.writer.raw(&self.escaper.escape(text)),
            NodeKind::Code(code) => self.writer.events([Event::Code(code.as_str().into())]),
            NodeKind::Emphasis => {
                self.writer.events([Event::Start(Tag::Emphasis)]);
                self.children(node, depth);
                self.writer.events([Event::End(TagEnd::Emphasis)]);
            }
            NodeKind::StrongEmphasis => {
                self.writer.events([Event::Start(Tag::Strong)]);
                self.children(node, depth);
                self.writer.events([Event::End(TagEnd::Strong)]);
            }
            NodeKind::Link { destination, title } => self.link(node, destination, title, depth),
            NodeKind::Image { destination, title } => {
                let alt = node.plain_text();
                self.writer.events([
                    Event::Start(Tag::Image {
                        link_type: LinkType::Inline,
                        dest_url: destination.as_str().into(),
                        title: title.as_str().into(),
                        id: CowStr::Borrowed(""),
                    }),
                    Event::Text(alt.into()),
                    Event::End(TagEnd::Image),
                ]);
            }
            NodeKind::HtmlInline(html) => self.writer.raw(html),
            NodeKind::SoftLineBreak => self.writer.events([Event::SoftBreak]),
            NodeKind::HardLineBreak => self.writer.events([Event::HardBreak]),

            NodeKind::AnnotatedImage(image) => {
                let html = self.hooks.annotated_image(image, &self.escaper);
                self.writer.raw(&html);
            }
            NodeKind::CitationDefinition(citation) => {
                let html = self.hooks.citation_definition(citation);
                self.writer.raw(&html);
            }
            NodeKind::CitationReference(reference) => {
                let html = self.hooks.citation_reference(reference);
                self.writer.raw(&html);
            }
            NodeKind::MathSpan(math) => {
                let html = self.hooks.math_span(math);
                self.writer.raw(&html);
            }
            NodeKind::MathBlock(math) => {
                let html = self.hooks.math_block(math);
                self.writer.raw(&html);
            }
            NodeKind::CrossReference(reference) => {
                let html = self.hooks.cross_reference(reference);
                self.writer.raw(&html);
            }
            NodeKind::Label(label) => {
                let content = self.detached(|this| this.children(node, depth));
                let html = self.hooks.label(label, &content);
                self.writer.raw(&html);
            }
        }
    }

    fn children(&mut self, node: &Node, depth: usize) {
        if depth >= MAX_DEPTH {
            warn!(depth, "document nested too deeply, dropping subtree");
            return;
        }
        for child in &node.children {
            self.render(child, depth + 1);
        }
    }

    fn heading(&mut self, node: &Node, level: u8, depth: usize) {
        self.writer.line();
        if level == 1 {
            if let Some(splits) = self.splits.as_deref_mut() {
                splits.push(self.writer.len());
            }
        }
        self.writer.raw(&format!("<h{level}>"));
        if let Some(prefix) = self.hooks.on_heading(level) {
            self.writer.raw(&self.escaper.escape(&prefix));
        }
        self.children(node, depth);
        self.writer.raw(&format!("</h{level}>\n"));
    }

    fn link(&mut self, node: &Node, destination: &str, title: &str, depth: usize) {
        let translated = self.hooks.translate_ref(destination);
        let href = translated.as_deref().unwrap_or(destination);
        let title = if title.is_empty() {
            self.hooks
                .ref_title(destination, href)
                .filter(|t| !t.trim().is_empty())
                .map(|t| self.escaper.transcode(&t).trim().to_string())
                .unwrap_or_default()
        } else {
            self.escaper.transcode(title)
        };

        self.writer.events([Event::Start(Tag::Link {
            link_type: LinkType::Inline,
            dest_url: href.into(),
            title: title.into(),
            id: CowStr::Borrowed(""),
        })]);
        self.children(node, depth);
        self.writer.events([Event::End(TagEnd::Link)]);
    }

    /// Render into a scratch buffer; heading splits are not recorded meanwhile.
    fn detached(&mut self, render: impl FnOnce(&mut Self)) -> String {
        let outer = std::mem::take(&mut self.writer);
        let splits = self.splits.take();
        render(self);
        self.splits = splits;
        std::mem::replace(&mut self.writer, outer).into_string()
    }
}
