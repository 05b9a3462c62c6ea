//! Block recognizers.
//!
//! Each recognizer is a pure function of one source line (without its line
//! terminator) and the line's indentation column. A line indented by four
//! or more columns belongs to an enclosing construct and never starts a
//! custom block.

use std::sync::LazyLock;

use regex::Regex;

use crate::node::{AnnotatedImage, CitationDefinition, LabelBlock, MathBlock, MathKind};
use crate::options::{Feature, Features};

static ANNOTATED_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\*\*\*\s*\[([a-zA-Z0-9_=+/:.\-]+)\](.*)\*\*\*(.*)$").unwrap()
});

static CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\*\*\*\s*\[#([\p{L}\p{N}_=+: .\-]+)\](.*)$").unwrap());

static LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*@@\s*(.{1,30})\s*@@\s*$").unwrap());

static MATH_EQUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\$\$\$(.+)\$\$\$\s*$").unwrap());

static MATH_EQUATION_LABELED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\$\$(.+)\$\$\(([a-zA-Z0-9=_:.\-]+)\)\s*$").unwrap()
});

static MATH_SIMPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\$\$(.+)\$\$\s*$").unwrap());

/// A custom block recognised at the start of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizedBlock {
    AnnotatedImage(AnnotatedImage),
    Citation(CitationDefinition),
    Label(LabelBlock),
    Math(MathBlock),
}

/// How a started block absorbs the lines that follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Single-line block.
    Never,
    /// Lines indented by four or more columns belong to the block; other
    /// lines may still be taken as lazy paragraph continuation.
    Indented,
}

impl RecognizedBlock {
    pub fn continuation(&self) -> Continuation {
        match self {
            RecognizedBlock::Label(_) => Continuation::Indented,
            RecognizedBlock::AnnotatedImage(_)
            | RecognizedBlock::Citation(_)
            | RecognizedBlock::Math(_) => Continuation::Never,
        }
    }
}

/// A successful recognizer match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockStart {
    pub block: RecognizedBlock,
    /// Bytes of the line consumed by the match
    pub consumed: usize,
}

/// Try every enabled recognizer in priority order.
pub fn recognize_block(line: &str, indent: usize, features: &Features) -> Option<BlockStart> {
    if indent >= 4 {
        return None;
    }
    let recognizers: [(Feature, fn(&str, usize) -> Option<BlockStart>); 4] = [
        (Feature::AnnotatedImages, annotated_image),
        (Feature::Citations, citation),
        (Feature::Labels, label),
        (Feature::Math, math),
    ];
    recognizers
        .into_iter()
        .filter(|(feature, _)| features.contains(*feature))
        .find_map(|(_, recognize)| recognize(line, indent))
}

/// `***[KEY]ALT***COMMENT`, which must start at column zero.
pub fn annotated_image(line: &str, indent: usize) -> Option<BlockStart> {
    if indent >= 4 {
        return None;
    }
    let caps = ANNOTATED_IMAGE.captures(line)?;
    let consumed = caps.get(0)?.end();
    Some(BlockStart {
        block: RecognizedBlock::AnnotatedImage(AnnotatedImage {
            key: caps[1].trim().to_string(),
            alt: caps[2].trim().to_string(),
            comment: caps[3].trim().to_string(),
        }),
        consumed,
    })
}

/// `***[#REF]TEXT`
pub fn citation(line: &str, indent: usize) -> Option<BlockStart> {
    if indent >= 4 {
        return None;
    }
    let caps = CITATION.captures(line)?;
    let consumed = caps.get(0)?.end();
    Some(BlockStart {
        block: RecognizedBlock::Citation(CitationDefinition {
            key: caps[1].trim().to_string(),
            text: caps[2].trim().to_string(),
        }),
        consumed,
    })
}

/// `@@ LABEL @@` with a label of at most 30 characters.
pub fn label(line: &str, indent: usize) -> Option<BlockStart> {
    if indent >= 4 {
        return None;
    }
    let caps = LABEL.captures(line)?;
    let consumed = caps.get(0)?.end();
    Some(BlockStart {
        block: RecognizedBlock::Label(LabelBlock {
            label: caps[1].trim().to_string(),
        }),
        consumed,
    })
}

/// `$$$EXPR$$$`, then `$$EXPR$$(LABEL)`, then `$$EXPR$$`.
pub fn math(line: &str, indent: usize) -> Option<BlockStart> {
    if indent >= 4 {
        return None;
    }
    let (kind, caps, labeled) = if let Some(caps) = MATH_EQUATION.captures(line) {
        (MathKind::Equation, caps, false)
    } else if let Some(caps) = MATH_EQUATION_LABELED.captures(line) {
        (MathKind::Equation, caps, true)
    } else {
        (MathKind::Regular, MATH_SIMPLE.captures(line)?, false)
    };
    let consumed = caps.get(0)?.end();
    Some(BlockStart {
        block: RecognizedBlock::Math(MathBlock {
            kind,
            text: caps[1].trim().to_string(),
            label: labeled.then(|| caps[2].trim().to_string()),
        }),
        consumed,
    })
}

/// Indentation column of `line`, with tabs advancing to the next multiple of four.
pub(crate) fn indent_of(line: &str) -> usize {
    let mut column = 0;
    for c in line.chars() {
        match c {
            ' ' => column += 1,
            '\t' => column += 4 - column % 4,
            _ => break,
        }
    }
    column
}

/// Remove up to `columns` columns of leading indentation.
pub(crate) fn strip_indent(line: &str, columns: usize) -> String {
    let mut column = 0;
    for (idx, c) in line.char_indices() {
        if column >= columns {
            return line[idx..].to_string();
        }
        match c {
            ' ' => column += 1,
            '\t' => {
                let next = column + 4 - column % 4;
                if next > columns {
                    // Split the tab: keep the columns it spans past the cut.
                    let mut rest = " ".repeat(next - columns);
                    rest.push_str(&line[idx + 1..]);
                    return rest;
                }
                column = next;
            }
            _ => return line[idx..].to_string(),
        }
    }
    String::new()
}
