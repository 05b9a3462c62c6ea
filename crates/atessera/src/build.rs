//! Event stream to document tree.

use pulldown_cmark::{CodeBlockKind, Event, LinkType, Parser as MarkdownParser, Tag, TagEnd};
use tracing::{debug, trace};

use crate::blocks::RecognizedBlock;
use crate::inlines::{SPAN_SENTINEL, SpanCallback, reinterpret_span};
use crate::node::{Node, NodeKind};
use crate::options::Options;
use crate::registry::Definitions;
use crate::scan::{ScannedBlock, placeholder_index, scan};

/// Parses source text into a [`Node`] tree with the custom syntax applied.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: Options,
}

impl Parser {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Parse `source` with a throwaway set of definition registries.
    pub fn parse(&self, source: &str) -> Node {
        let mut definitions = Definitions::default();
        self.parse_with(source, &mut definitions)
    }

    /// Parse `source`, registering every keyed definition in `definitions`
    /// in document order.
    pub fn parse_with(&self, source: &str, definitions: &mut Definitions) -> Node {
        let scanned = scan(source, &self.options.features);
        let callback = SpanCallback::new(self.options.features.clone());
        let events = MarkdownParser::new_with_broken_link_callback(
            &scanned.text,
            pulldown_cmark::Options::empty(),
            Some(callback),
        );

        let mut builder = TreeBuilder {
            parser: self,
            definitions,
            blocks: scanned.blocks.into_iter().map(Some).collect(),
            stack: vec![Frame::Node(Node::new(NodeKind::Document))],
        };
        for event in events {
            builder.event(event);
        }
        builder.finish()
    }
}

enum Frame {
    Node(Node),
    /// Code or HTML block whose text events are accumulated
    Literal { kind: LiteralKind, text: String },
    /// Bracketed span turned into a custom inline; its children are dropped
    Span(NodeKind),
    /// Construct with no tree counterpart; children are spliced into the parent
    Transparent(Vec<Node>),
}

enum LiteralKind {
    Fenced(String),
    Indented,
    Html,
}

struct TreeBuilder<'a> {
    parser: &'a Parser,
    definitions: &'a mut Definitions,
    blocks: Vec<Option<ScannedBlock>>,
    stack: Vec<Frame>,
}

impl TreeBuilder<'_> {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if let Some(Frame::Literal { text: literal, .. }) = self.stack.last_mut() {
                    literal.push_str(&text);
                } else {
                    self.push(Node::text(text.to_string()));
                }
            }
            Event::Html(html) => {
                if let Some(Frame::Literal { text, .. }) = self.stack.last_mut() {
                    text.push_str(&html);
                } else {
                    self.push(Node::new(NodeKind::HtmlInline(html.to_string())));
                }
            }
            Event::InlineHtml(html) => {
                let kind = if self.parser.options.allow_inline_html {
                    NodeKind::HtmlInline(html.to_string())
                } else {
                    NodeKind::Text(html.to_string())
                };
                self.push(Node::new(kind));
            }
            Event::Code(code) => self.push(Node::new(NodeKind::Code(code.to_string()))),
            Event::SoftBreak => self.push(Node::new(NodeKind::SoftLineBreak)),
            Event::HardBreak => self.push(Node::new(NodeKind::HardLineBreak)),
            Event::Rule => self.push(Node::new(NodeKind::ThematicBreak)),
            Event::InlineMath(text) | Event::DisplayMath(text) | Event::FootnoteReference(text) => {
                self.push(Node::text(text.to_string()))
            }
            Event::TaskListMarker(_) => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph => Frame::Node(Node::new(NodeKind::Paragraph { tight: false })),
            Tag::Heading { level, .. } => Frame::Node(Node::new(NodeKind::Heading {
                level: level as u8,
            })),
            Tag::BlockQuote(_) => Frame::Node(Node::new(NodeKind::BlockQuote)),
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => Frame::Literal {
                kind: LiteralKind::Fenced(info.to_string()),
                text: String::new(),
            },
            Tag::CodeBlock(CodeBlockKind::Indented) => Frame::Literal {
                kind: LiteralKind::Indented,
                text: String::new(),
            },
            Tag::HtmlBlock => Frame::Literal {
                kind: LiteralKind::Html,
                text: String::new(),
            },
            Tag::List(Some(start)) => Frame::Node(Node::new(NodeKind::OrderedList {
                start,
                tight: true,
            })),
            Tag::List(None) => Frame::Node(Node::new(NodeKind::BulletList { tight: true })),
            Tag::Item => Frame::Node(Node::new(NodeKind::ListItem)),
            Tag::Emphasis => Frame::Node(Node::new(NodeKind::Emphasis)),
            Tag::Strong => Frame::Node(Node::new(NodeKind::StrongEmphasis)),
            Tag::Link {
                dest_url, title, ..
            } if dest_url.as_ref() == SPAN_SENTINEL => {
                let kind = match reinterpret_span(&title, &self.parser.options.features) {
                    Some(span) => span.into(),
                    None => NodeKind::Text(format!("[{title}]")),
                };
                Frame::Span(kind)
            }
            Tag::Image {
                dest_url, title, ..
            } if dest_url.as_ref() == SPAN_SENTINEL => {
                Frame::Span(NodeKind::Text(format!("![{title}]")))
            }
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                let destination = match link_type {
                    LinkType::Email => format!("mailto:{dest_url}"),
                    _ => dest_url.to_string(),
                };
                Frame::Node(Node::new(NodeKind::Link {
                    destination,
                    title: title.to_string(),
                }))
            }
            Tag::Image {
                dest_url, title, ..
            } => Frame::Node(Node::new(NodeKind::Image {
                destination: dest_url.to_string(),
                title: title.to_string(),
            })),
            _ => Frame::Transparent(Vec::new()),
        };
        self.stack.push(frame);
    }

    fn end(&mut self, _tag: TagEnd) {
        // The root frame is never closed by an event.
        if self.stack.len() < 2 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };
        match frame {
            Frame::Node(mut node) => {
                match &mut node.kind {
                    NodeKind::ListItem => {
                        node.children = wrap_inline_runs(std::mem::take(&mut node.children));
                    }
                    NodeKind::BulletList { tight } | NodeKind::OrderedList { tight, .. } => {
                        *tight = !node.children.iter().any(has_loose_paragraph);
                    }
                    _ => {}
                }
                self.push(node);
            }
            Frame::Literal { kind, text } => {
                let node = match kind {
                    LiteralKind::Fenced(info) => Node::new(NodeKind::FencedCodeBlock {
                        info,
                        literal: text,
                    }),
                    LiteralKind::Indented => {
                        Node::new(NodeKind::IndentedCodeBlock { literal: text })
                    }
                    LiteralKind::Html => self.html_block(text),
                };
                self.push(node);
            }
            Frame::Span(kind) => self.push(Node::new(kind)),
            Frame::Transparent(children) => {
                for child in children {
                    self.push(child);
                }
            }
        }
    }

    /// Either a placeholder left by the line scan, or an ordinary HTML block.
    fn html_block(&mut self, literal: String) -> Node {
        let Some(scanned) = placeholder_index(&literal)
            .and_then(|index| self.blocks.get_mut(index))
            .and_then(Option::take)
        else {
            return Node::new(NodeKind::HtmlBlock { literal });
        };
        trace!(block = ?scanned.block, "substituting placeholder");

        match scanned.block {
            RecognizedBlock::AnnotatedImage(image) => {
                self.definitions
                    .images
                    .register(image.key.clone(), image.clone());
                Node::new(NodeKind::AnnotatedImage(image))
            }
            RecognizedBlock::Citation(citation) => {
                self.definitions
                    .citations
                    .register(citation.key.clone(), citation.clone());
                Node::new(NodeKind::CitationDefinition(citation))
            }
            RecognizedBlock::Math(math) => Node::new(NodeKind::MathBlock(math)),
            RecognizedBlock::Label(label) => {
                self.definitions
                    .labels
                    .register(label.label.clone(), label.clone());
                let children = if scanned.body.is_empty() {
                    Vec::new()
                } else {
                    debug!(label = %label.label, "parsing label body");
                    let mut body = self.parser.parse_with(&scanned.body, self.definitions);
                    std::mem::take(&mut body.children)
                };
                Node::with_children(NodeKind::Label(label), children)
            }
        }
    }

    /// Append to the innermost open frame, merging adjacent text.
    fn push(&mut self, node: Node) {
        let children = match self.stack.last_mut() {
            Some(Frame::Node(parent)) => &mut parent.children,
            Some(Frame::Transparent(children)) => children,
            Some(Frame::Span(_)) | Some(Frame::Literal { .. }) | None => return,
        };
        if let NodeKind::Text(text) = &node.kind {
            if let Some(Node {
                kind: NodeKind::Text(previous),
                ..
            }) = children.last_mut()
            {
                previous.push_str(text);
                return;
            }
        }
        children.push(node);
    }

    fn finish(mut self) -> Node {
        while self.stack.len() > 1 {
            self.end(TagEnd::Paragraph);
        }
        match self.stack.pop() {
            Some(Frame::Node(root)) => root,
            _ => Node::new(NodeKind::Document),
        }
    }
}

/// Wrap each run of inline children (a tight list item's text) in a tight paragraph.
fn wrap_inline_runs(children: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(children.len());
    let mut run = Vec::new();
    for child in children {
        if child.kind.is_inline() {
            run.push(child);
            continue;
        }
        if !run.is_empty() {
            out.push(Node::with_children(
                NodeKind::Paragraph { tight: true },
                std::mem::take(&mut run),
            ));
        }
        out.push(child);
    }
    if !run.is_empty() {
        out.push(Node::with_children(NodeKind::Paragraph { tight: true }, run));
    }
    out
}

fn has_loose_paragraph(item: &Node) -> bool {
    item.children
        .iter()
        .any(|child| matches!(child.kind, NodeKind::Paragraph { tight: false }))
}
