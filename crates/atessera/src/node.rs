//! Document tree.
//!
//! Each [`Node`] owns its children. Render engines get parent and
//! next-sibling information from the traversal itself, never from the nodes.

use std::fmt;

/// Render engines stop descending below this many levels.
pub const MAX_DEPTH: usize = 256;

/// A node of the parsed document.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_children(kind: NodeKind, children: Vec<Node>) -> Self {
        Self { kind, children }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Text(text.into()))
    }

    /// Concatenated literal text of this subtree (used for image alt text).
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        crate::walk::enumerate(self, |node| match &node.kind {
            NodeKind::Text(t) | NodeKind::Code(t) => out.push_str(t),
            NodeKind::SoftLineBreak | NodeKind::HardLineBreak => out.push('\n'),
            _ => {}
        });
        out
    }
}

// Deeply nested documents would overflow the stack with the derived
// recursive drop.
impl Drop for Node {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

/// What a node is.
///
/// The CommonMark kinds mirror what the generic parser produces; the
/// remaining variants are the document-specific constructs.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Document,

    // Blocks
    Paragraph {
        /// Paragraph of a tight list item (rendered without `<p>` in HTML)
        tight: bool,
    },
    Heading {
        level: u8,
    },
    BlockQuote,
    BulletList {
        tight: bool,
    },
    OrderedList {
        start: u64,
        tight: bool,
    },
    ListItem,
    FencedCodeBlock {
        info: String,
        literal: String,
    },
    IndentedCodeBlock {
        literal: String,
    },
    HtmlBlock {
        literal: String,
    },
    ThematicBreak,

    // Inlines
    Text(String),
    Code(String),
    Emphasis,
    StrongEmphasis,
    Link {
        destination: String,
        title: String,
    },
    Image {
        destination: String,
        title: String,
    },
    HtmlInline(String),
    SoftLineBreak,
    HardLineBreak,

    // Document-specific
    AnnotatedImage(AnnotatedImage),
    CitationDefinition(CitationDefinition),
    CitationReference(CitationReference),
    Label(LabelBlock),
    MathSpan(MathSpan),
    MathBlock(MathBlock),
    CrossReference(CrossReference),
}

impl NodeKind {
    /// Whether this is one of the document-specific kinds.
    pub fn is_custom(&self) -> bool {
        matches!(
            self,
            NodeKind::AnnotatedImage(_)
                | NodeKind::CitationDefinition(_)
                | NodeKind::CitationReference(_)
                | NodeKind::Label(_)
                | NodeKind::MathSpan(_)
                | NodeKind::MathBlock(_)
                | NodeKind::CrossReference(_)
        )
    }

    pub(crate) fn is_inline(&self) -> bool {
        matches!(
            self,
            NodeKind::Text(_)
                | NodeKind::Code(_)
                | NodeKind::Emphasis
                | NodeKind::StrongEmphasis
                | NodeKind::Link { .. }
                | NodeKind::Image { .. }
                | NodeKind::HtmlInline(_)
                | NodeKind::SoftLineBreak
                | NodeKind::HardLineBreak
                | NodeKind::CitationReference(_)
                | NodeKind::MathSpan(_)
                | NodeKind::CrossReference(_)
        )
    }
}

/// `***[key]alt***comment`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedImage {
    pub key: String,
    pub alt: String,
    pub comment: String,
}

/// `***[#ref]text`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationDefinition {
    pub key: String,
    pub text: String,
}

/// `[#ref]` inside running text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationReference {
    pub key: String,
}

/// `@@ label @@`; the nested blocks are the node's children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelBlock {
    pub label: String,
}

impl fmt::Display for LabelBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(label \"{}\")", self.label)
    }
}

/// `[$expr]` inside running text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathSpan {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathKind {
    Regular,
    Equation,
}

/// A single-line math block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathBlock {
    pub kind: MathKind,
    pub text: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Regular,
    Page,
}

/// `[@key]` / `[@@key]` inside running text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossReference {
    pub kind: ReferenceKind,
    pub key: String,
}
