//! Line pre-pass that carves custom blocks out of the source.
//!
//! `pulldown-cmark` cannot be taught new block syntax, so every line that a
//! block recognizer claims is swapped for a placeholder HTML comment before
//! the generic parse. A comment line is an HTML block that starts at any
//! position where a block may start, interrupts paragraphs and ends on the
//! same line, so the custom block lands in the same container position it
//! occupied in the source. The tree builder swaps the placeholder back.
//!
//! The pass follows just enough of the block structure to know where a
//! block may start: open block quotes and list items (indentation is
//! measured from the innermost item's content column), fenced code and raw
//! HTML blocks (whose lines are never offered to the recognizers), and
//! whether a paragraph is open. A leaf ends with its container.
//!
//! Label bodies are removed from the outer text and kept alongside the
//! placeholder; the builder parses them on their own.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::blocks::{
    BlockStart, Continuation, RecognizedBlock, indent_of, recognize_block, strip_indent,
};
use crate::options::Features;

const PLACEHOLDER_OPEN: &str = "<!--\u{F8FF}atessera:";
const PLACEHOLDER_CLOSE: &str = "-->";

static QUOTE_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ {0,3}> ?").unwrap());

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(?:[-+*]|([0-9]{1,9})[.)])").unwrap());

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(`{3,}|~{3,})(.*)$").unwrap());

static BLOCK_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^ {0,3}(?:",
        r">",
        r"|#{1,6}(?:[ \t]|$)",
        r"|(?:`{3,}|~{3,})",
        r"|(?:(?:\*[ \t]*){3,}|(?:-[ \t]*){3,}|(?:_[ \t]*){3,})$",
        r"|(?:[-+*]|[0-9]{1,9}[.)])(?:[ \t]|$)",
        r"|<[A-Za-z/!?]",
        r"|=+[ \t]*$",
        r")"
    ))
    .unwrap()
});

static BREAK_OR_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^ {0,3}(?:",
        r"#{1,6}(?:[ \t]|$)",
        r"|(?:(?:\*[ \t]*){3,}|(?:-[ \t]*){3,}|(?:_[ \t]*){3,})$",
        r")"
    ))
    .unwrap()
});

static SETEXT_UNDERLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(?:=+|-+)[ \t]*$").unwrap());

static HTML_RAW_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^ {0,3}<(?:script|pre|style|textarea)(?:[ \t>]|$)").unwrap()
});

static HTML_BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^ {0,3}</?(?:",
        r"address|article|aside|base|basefont|blockquote|body|caption|center|col|colgroup",
        r"|dd|details|dialog|dir|div|dl|dt|fieldset|figcaption|figure|footer|form|frame",
        r"|frameset|h[1-6]|head|header|hr|html|iframe|legend|li|link|main|menu|menuitem",
        r"|nav|noframes|ol|optgroup|option|p|param|search|section|summary|table|tbody",
        r"|td|tfoot|th|thead|title|tr|track|ul",
        r")(?:[ \t>]|/>|$)"
    ))
    .unwrap()
});

static HTML_LONE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^ {0,3}(?:",
        r#"<[A-Za-z][A-Za-z0-9-]*(?:[ \t]+[A-Za-z_:][A-Za-z0-9_.:-]*(?:[ \t]*=[ \t]*(?:[^ \t"'=<>`]+|'[^']*'|"[^"]*"))?)*[ \t]*/?>"#,
        r"|</[A-Za-z][A-Za-z0-9-]*[ \t]*>",
        r")[ \t]*$"
    ))
    .unwrap()
});

/// Source text with custom blocks replaced by placeholders.
#[derive(Debug, Default)]
pub(crate) struct Scanned {
    pub text: String,
    pub blocks: Vec<ScannedBlock>,
}

#[derive(Debug)]
pub(crate) struct ScannedBlock {
    pub block: RecognizedBlock,
    /// Nested source of a label, already de-indented. Empty for leaf blocks.
    pub body: String,
}

pub(crate) fn placeholder(index: usize) -> String {
    format!("{PLACEHOLDER_OPEN}{index}{PLACEHOLDER_CLOSE}")
}

/// Index carried by a placeholder comment, if `html` is one.
pub(crate) fn placeholder_index(html: &str) -> Option<usize> {
    html.trim()
        .strip_prefix(PLACEHOLDER_OPEN)?
        .strip_suffix(PLACEHOLDER_CLOSE)?
        .parse()
        .ok()
}

pub(crate) fn scan(source: &str, features: &Features) -> Scanned {
    let lines: Vec<&str> = source.split_inclusive('\n').collect();
    let mut scanned = Scanned {
        text: String::with_capacity(source.len()),
        blocks: Vec::new(),
    };
    let mut tracker = Tracker::new(features);
    let mut i = 0;

    while i < lines.len() {
        let raw = lines[i];
        let line = chomp(raw);
        i += 1;

        let Step::Custom {
            content_start,
            indent,
            start,
        } = tracker.step(line)
        else {
            scanned.text.push_str(raw);
            continue;
        };
        debug!(line = i, block = ?start.block, "recognized custom block");

        let mut body = String::new();
        if start.block.continuation() == Continuation::Indented {
            let (taken, text) = collect_body(&lines[i..], &tracker, indent);
            i += taken;
            body = text;
        }

        scanned.text.push_str(&line[..content_start]);
        scanned.text.push_str(&placeholder(scanned.blocks.len()));
        scanned.text.push('\n');
        scanned.blocks.push(ScannedBlock {
            block: start.block,
            body,
        });
    }

    scanned
}

/// Gather the lines that belong to a label opened at column `base` of the
/// tracker's innermost container.
///
/// Returns how many lines were consumed and the de-indented body text.
fn collect_body(lines: &[&str], outer: &Tracker<'_>, base: usize) -> (usize, String) {
    let mut body: Vec<String> = Vec::new();
    let mut inner = Tracker::new(outer.features);

    for raw in lines {
        let line = chomp(raw);
        let (matched, offset) = match_containers(&outer.containers, line);
        let rest = &line[offset..];
        let blank = rest.trim().is_empty();

        let text = if matched == outer.containers.len() && indent_of(rest) >= base + 4 {
            if blank {
                String::new()
            } else {
                strip_indent(rest, base + 4)
            }
        } else if !blank && inner.in_paragraph() && outer.is_lazy(rest) {
            rest.trim_start().to_string()
        } else {
            break;
        };
        inner.step(&text);
        body.push(text);
    }

    let taken = body.len();
    let mut text = body.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    (taken, text)
}

#[derive(Debug, Clone, Copy)]
enum Container {
    Quote,
    /// List item whose content starts `width` columns in
    Item { width: usize },
}

#[derive(Debug)]
enum Leaf {
    None,
    Paragraph,
    Fence(Fence),
    Html(HtmlEnd),
}

/// What the tracker made of one line.
enum Step {
    Pass,
    Custom {
        /// Byte offset of the block's first character in the line
        content_start: usize,
        /// Indentation relative to the innermost container
        indent: usize,
        start: BlockStart,
    },
}

/// Block structure of the lines seen so far.
struct Tracker<'f> {
    features: &'f Features,
    containers: Vec<Container>,
    leaf: Leaf,
}

impl<'f> Tracker<'f> {
    fn new(features: &'f Features) -> Self {
        Self {
            features,
            containers: Vec::new(),
            leaf: Leaf::None,
        }
    }

    fn in_paragraph(&self) -> bool {
        matches!(self.leaf, Leaf::Paragraph)
    }

    /// Advance over one line (without its terminator).
    fn step(&mut self, line: &str) -> Step {
        let (matched, mut offset) = match_containers(&self.containers, line);

        if matched == self.containers.len() {
            let rest = &line[offset..];
            let closes = match &self.leaf {
                Leaf::Fence(fence) => Some(fence.closed_by(rest)),
                Leaf::Html(end) => Some(end.ends_at(rest)),
                Leaf::None | Leaf::Paragraph => None,
            };
            if let Some(closes) = closes {
                if closes {
                    self.leaf = Leaf::None;
                }
                return Step::Pass;
            }
        } else if self.in_paragraph() && self.is_lazy(&line[offset..]) {
            return Step::Pass;
        } else {
            self.containers.truncate(matched);
            self.leaf = Leaf::None;
        }

        let mut opened = false;
        loop {
            let rest = &line[offset..];
            if let Some(marker) = QUOTE_MARKER.find(rest) {
                self.containers.push(Container::Quote);
                offset += marker.end();
                opened = true;
                continue;
            }
            if BREAK_OR_HEADING.is_match(rest) {
                break;
            }
            let interrupts = !opened && self.in_paragraph();
            let Some((consumed, width)) = list_item(rest, interrupts) else {
                break;
            };
            self.containers.push(Container::Item { width });
            offset += consumed;
            opened = true;
        }
        if opened {
            self.leaf = Leaf::None;
        }

        self.leaf_line(&line[offset..], offset)
    }

    /// Classify the part of a line left after its container markers.
    fn leaf_line(&mut self, rest: &str, offset: usize) -> Step {
        let paragraph = self.in_paragraph();
        if rest.trim().is_empty() {
            self.leaf = Leaf::None;
            return Step::Pass;
        }

        let indent = indent_of(rest);
        if indent >= 4 {
            // Paragraph continuation or indented code.
            if !paragraph {
                self.leaf = Leaf::None;
            }
            return Step::Pass;
        }
        if let Some(fence) = Fence::open(rest) {
            self.leaf = Leaf::Fence(fence);
            return Step::Pass;
        }
        if let Some(end) = html_block_start(rest, paragraph) {
            self.leaf = if end.ends_at(rest) {
                Leaf::None
            } else {
                Leaf::Html(end)
            };
            return Step::Pass;
        }
        if let Some(start) = recognize_block(rest, indent, self.features) {
            self.leaf = Leaf::None;
            let leading = rest.len() - rest.trim_start().len();
            return Step::Custom {
                content_start: offset + leading,
                indent,
                start,
            };
        }
        if BREAK_OR_HEADING.is_match(rest) || (paragraph && SETEXT_UNDERLINE.is_match(rest)) {
            self.leaf = Leaf::None;
        } else {
            self.leaf = Leaf::Paragraph;
        }
        Step::Pass
    }

    /// Whether `rest` can only continue the open paragraph.
    fn is_lazy(&self, rest: &str) -> bool {
        !rest.trim().is_empty()
            && !BLOCK_START.is_match(rest)
            && recognize_block(rest, indent_of(rest), self.features).is_none()
    }
}

/// How many of `containers` continue on `line`, and the byte offset where
/// the rest of the line starts.
fn match_containers(containers: &[Container], line: &str) -> (usize, usize) {
    let mut offset = 0;
    for (matched, container) in containers.iter().enumerate() {
        let rest = &line[offset..];
        match container {
            Container::Quote => match QUOTE_MARKER.find(rest) {
                Some(marker) => offset += marker.end(),
                None => return (matched, offset),
            },
            Container::Item { width } => {
                if !rest.trim().is_empty() && indent_of(rest) < *width {
                    return (matched, offset);
                }
                offset += skip_columns(rest, *width);
            }
        }
    }
    (containers.len(), offset)
}

/// A list item starting `content`: bytes taken by its marker, and the
/// column its content starts at.
fn list_item(content: &str, interrupts_paragraph: bool) -> Option<(usize, usize)> {
    let caps = LIST_MARKER.captures(content)?;
    let marker = caps.get(0)?.end();
    let after = &content[marker..];
    if !(after.is_empty() || after.starts_with([' ', '\t'])) {
        return None;
    }

    let empty = after.trim().is_empty();
    if interrupts_paragraph {
        let ordered_not_one = caps
            .get(1)
            .is_some_and(|n| n.as_str().parse::<u64>().ok() != Some(1));
        if empty || ordered_not_one {
            return None;
        }
    }

    let spaces = indent_of(after);
    if empty {
        Some((content.len(), marker + 1))
    } else if spaces > 4 {
        Some((marker + 1, marker + 1))
    } else {
        Some((marker + skip_columns(after, spaces), marker + spaces))
    }
}

/// Bytes of leading whitespace spanning up to `columns` columns.
fn skip_columns(text: &str, columns: usize) -> usize {
    let mut column = 0;
    for (idx, c) in text.char_indices() {
        if column >= columns {
            return idx;
        }
        match c {
            ' ' => column += 1,
            '\t' => column += 4 - column % 4,
            _ => return idx,
        }
    }
    text.len()
}

fn chomp(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

#[derive(Debug)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    fn open(content: &str) -> Option<Self> {
        let caps = FENCE.captures(content)?;
        let run = &caps[1];
        let marker = run.chars().next()?;
        if marker == '`' && caps[2].contains('`') {
            return None;
        }
        Some(Self {
            marker,
            len: run.len(),
        })
    }

    fn closed_by(&self, content: &str) -> bool {
        let Some(caps) = FENCE.captures(content) else {
            return false;
        };
        let run = &caps[1];
        run.starts_with(self.marker) && run.len() >= self.len && caps[2].trim().is_empty()
    }
}

/// How a raw HTML block ends.
#[derive(Debug, Clone, Copy)]
enum HtmlEnd {
    /// On the line containing one of these (lowercase) markers
    Marker(&'static [&'static str]),
    BlankLine,
}

impl HtmlEnd {
    fn ends_at(&self, line: &str) -> bool {
        match self {
            HtmlEnd::BlankLine => line.trim().is_empty(),
            HtmlEnd::Marker(markers) => {
                let lower = line.to_ascii_lowercase();
                markers.iter().any(|marker| lower.contains(marker))
            }
        }
    }
}

/// The raw HTML block `content` opens, if any.
fn html_block_start(content: &str, paragraph: bool) -> Option<HtmlEnd> {
    let trimmed = content.trim_start();
    if HTML_RAW_TEXT.is_match(content) {
        Some(HtmlEnd::Marker(&["</script>", "</pre>", "</style>", "</textarea>"]))
    } else if trimmed.starts_with("<!--") {
        Some(HtmlEnd::Marker(&["-->"]))
    } else if trimmed.starts_with("<?") {
        Some(HtmlEnd::Marker(&["?>"]))
    } else if trimmed.starts_with("<![CDATA[") {
        Some(HtmlEnd::Marker(&["]]>"]))
    } else if trimmed
        .strip_prefix("<!")
        .is_some_and(|tail| tail.starts_with(|c: char| c.is_ascii_alphabetic()))
    {
        Some(HtmlEnd::Marker(&[">"]))
    } else if HTML_BLOCK_TAG.is_match(content) || (!paragraph && HTML_LONE_TAG.is_match(content)) {
        Some(HtmlEnd::BlankLine)
    } else {
        None
    }
}
