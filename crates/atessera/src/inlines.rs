//! Inline span reinterpretation.
//!
//! A bare bracketed span (`[text]`, with no destination and no reference
//! label) whose text starts with a discriminator becomes a custom inline
//! node instead of a link:
//!
//! | Prefix | Node |
//! |--------|------|
//! | `#`    | [`CitationReference`] |
//! | `$`    | [`MathSpan`] |
//! | `@@`   | [`CrossReference`], page kind |
//! | `@`    | [`CrossReference`], regular kind |
//!
//! The span text after the discriminator is kept verbatim.

use pulldown_cmark::{BrokenLink, BrokenLinkCallback, CowStr, LinkType};
use tracing::trace;

use crate::node::{CitationReference, CrossReference, MathSpan, NodeKind, ReferenceKind};
use crate::options::{Feature, Features};

/// Destination given to spans claimed by [`SpanCallback`].
pub(crate) const SPAN_SENTINEL: &str = "\u{F8FF}atessera:span";

/// The custom inline a bracketed span turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanKind {
    Citation(CitationReference),
    Math(MathSpan),
    CrossReference(CrossReference),
}

impl From<SpanKind> for NodeKind {
    fn from(kind: SpanKind) -> Self {
        match kind {
            SpanKind::Citation(c) => NodeKind::CitationReference(c),
            SpanKind::Math(m) => NodeKind::MathSpan(m),
            SpanKind::CrossReference(r) => NodeKind::CrossReference(r),
        }
    }
}

/// Classify the text of an eligible bracketed span.
pub fn reinterpret_span(text: &str, features: &Features) -> Option<SpanKind> {
    if let Some(key) = text.strip_prefix('#') {
        return features.contains(Feature::Citations).then(|| {
            SpanKind::Citation(CitationReference {
                key: key.to_string(),
            })
        });
    }
    if let Some(expr) = text.strip_prefix('$') {
        return features.contains(Feature::Math).then(|| {
            SpanKind::Math(MathSpan {
                text: expr.to_string(),
            })
        });
    }
    if !features.contains(Feature::References) {
        return None;
    }
    let (kind, key) = match text.strip_prefix("@@") {
        Some(key) => (ReferenceKind::Page, key),
        None => (ReferenceKind::Regular, text.strip_prefix('@')?),
    };
    Some(SpanKind::CrossReference(CrossReference {
        kind,
        key: key.to_string(),
    }))
}

/// Broken-link callback that claims reinterpretable shortcut spans.
///
/// A claimed span comes back from the parser as a link whose destination is
/// [`SPAN_SENTINEL`] and whose title is the original span text.
pub(crate) struct SpanCallback {
    features: Features,
}

impl SpanCallback {
    pub(crate) fn new(features: Features) -> Self {
        Self { features }
    }
}

impl<'input> BrokenLinkCallback<'input> for SpanCallback {
    fn handle_broken_link(
        &mut self,
        link: BrokenLink<'input>,
    ) -> Option<(CowStr<'input>, CowStr<'input>)> {
        if link.link_type != LinkType::Shortcut {
            return None;
        }
        reinterpret_span(&link.reference, &self.features)?;
        trace!(span = %link.reference, "claimed bracketed span");
        Some((CowStr::Borrowed(SPAN_SENTINEL), link.reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str) -> Option<SpanKind> {
        reinterpret_span(text, &Features::default())
    }

    #[test]
    fn test_citation_reference() {
        assert_eq!(
            span("#smith99"),
            Some(SpanKind::Citation(CitationReference {
                key: "smith99".into()
            }))
        );
    }

    #[test]
    fn test_math_span_keeps_text_verbatim() {
        assert_eq!(
            span("$ x^2 + 1"),
            Some(SpanKind::Math(MathSpan {
                text: " x^2 + 1".into()
            }))
        );
    }

    #[test]
    fn test_cross_references() {
        assert_eq!(
            span("@fig1"),
            Some(SpanKind::CrossReference(CrossReference {
                kind: ReferenceKind::Regular,
                key: "fig1".into()
            }))
        );
        assert_eq!(
            span("@@fig1"),
            Some(SpanKind::CrossReference(CrossReference {
                kind: ReferenceKind::Page,
                key: "fig1".into()
            }))
        );
    }

    #[test]
    fn test_discriminators_do_not_combine() {
        assert_eq!(
            span("#$x"),
            Some(SpanKind::Citation(CitationReference { key: "$x".into() }))
        );
        assert_eq!(span("plain"), None);
        assert_eq!(span(" #x"), None);
    }

    #[test]
    fn test_disabled_feature() {
        let features = Features::default().without(Feature::Citations);
        assert_eq!(reinterpret_span("#x", &features), None);
        let features = Features::default().without(Feature::References);
        assert_eq!(reinterpret_span("@x", &features), None);
    }
}
