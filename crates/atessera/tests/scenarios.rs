//! End-to-end behaviour of both engines on whole documents.

use atessera::{
    BlockStart, CrossReference, Feature, Features, HtmlTarget, LatexTarget, MAX_DEPTH, MathBlock,
    MathKind, Node, NodeKind, Options, Parser, RecognizedBlock, ReferenceKind, enumerate,
    escape_relaxed, escape_strict, recognize_block,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn kinds(document: &Node) -> Vec<NodeKind> {
    let mut out = Vec::new();
    enumerate(document, |node| out.push(node.kind.clone()));
    out
}

#[test]
fn test_annotated_image_renders_img() {
    let mut target = HtmlTarget::default();
    assert_eq!(
        target.parse("***[img1]an apple***caption\n"),
        "<img src=\"img1\" alt=\"an apple\">\n"
    );
    assert_eq!(
        target.parse("***[fig.2]  salt & <pepper>  ***comment\n"),
        "<img src=\"fig.2\" alt=\"salt &amp; &lt;pepper&gt;\">\n"
    );
}

#[test]
fn test_duplicate_images_render_but_first_is_registered() {
    let mut target = HtmlTarget::default();
    let out = target.parse("***[img1]first***a\n***[img1]second***b\n");
    assert_eq!(
        out,
        "<img src=\"img1\" alt=\"first\">\n<img src=\"img1\" alt=\"second\">\n"
    );
    assert_eq!(target.definitions().images.len(), 1);
    assert_eq!(
        target.definitions().image("img1").map(|i| i.alt.as_str()),
        Some("first")
    );
}

#[test]
fn test_duplicate_citations() {
    let mut target = HtmlTarget::default();
    target.parse("***[#k]First\n***[#k]Second\n");
    assert_eq!(
        target.definitions().citation("k").map(|c| c.text.as_str()),
        Some("First")
    );
    // The bibliography keeps the last text seen.
    assert_eq!(target.biblio().get("k"), Some("Second"));
}

#[test]
fn test_definitions_accumulate_until_reset() {
    let mut target = HtmlTarget::default();
    target.parse("***[img1]first***a\n***[#smith99]Smith. 1999\n");
    target.parse("***[img1]second***b\n");
    assert_eq!(
        target.definitions().image("img1").map(|i| i.alt.as_str()),
        Some("first")
    );
    assert_eq!(target.biblio().len(), 1);

    target.reset();
    assert!(target.definitions().image("img1").is_none());
    assert!(target.biblio().is_empty());

    target.parse("***[img1]third***c\n");
    assert_eq!(
        target.definitions().image("img1").map(|i| i.alt.as_str()),
        Some("third")
    );
}

#[test]
fn test_inline_citation_does_not_touch_bibliography() {
    let mut target = HtmlTarget::default();
    assert_eq!(target.parse("See [#smith99].\n"), "<p>See citeref.</p>\n");
    assert!(target.biblio().is_empty());
}

#[test]
fn test_citation_span_needs_no_destination() {
    let parser = Parser::default();
    let bare = kinds(&parser.parse("[#key]\n"));
    assert!(bare.iter().any(|k| matches!(k, NodeKind::CitationReference(c) if c.key == "key")));

    let linked = kinds(&parser.parse("[#key](dest)\n"));
    assert!(!linked.iter().any(|k| matches!(k, NodeKind::CitationReference(_))));
    assert_eq!(
        HtmlTarget::default().parse("[#key](dest)\n"),
        "<p><a href=\"dest\">#key</a></p>\n"
    );
}

#[test]
fn test_cross_references() {
    let tree = Parser::default().parse("See [@fig1] on [@@fig1].\n");
    let refs: Vec<CrossReference> = kinds(&tree)
        .into_iter()
        .filter_map(|k| match k {
            NodeKind::CrossReference(r) => Some(r),
            _ => None,
        })
        .collect();
    assert_eq!(
        refs,
        vec![
            CrossReference {
                kind: ReferenceKind::Regular,
                key: "fig1".into()
            },
            CrossReference {
                kind: ReferenceKind::Page,
                key: "fig1".into()
            },
        ]
    );
}

#[test]
fn test_math_equation_wins_over_simple_form() {
    let expected = MathBlock {
        kind: MathKind::Equation,
        text: "E=mc^2".into(),
        label: None,
    };
    let start = recognize_block("$$$E=mc^2$$$", 0, &Features::all());
    assert!(matches!(
        start,
        Some(BlockStart { block: RecognizedBlock::Math(ref m), .. }) if *m == expected
    ));

    let tree = Parser::default().parse("$$$E=mc^2$$$\n");
    assert_eq!(tree.children.len(), 1);
    assert_eq!(tree.children[0].kind, NodeKind::MathBlock(expected));
}

#[test]
fn test_labeled_equation() {
    let tree = Parser::default().parse("$$E=mc^2$$(eq:1)\n");
    assert_eq!(
        tree.children[0].kind,
        NodeKind::MathBlock(MathBlock {
            kind: MathKind::Equation,
            text: "E=mc^2".into(),
            label: Some("eq:1".into()),
        })
    );
}

#[test]
fn test_label_holds_one_paragraph() {
    let tree = Parser::default().parse("@@ Note @@\n    A paragraph\n    on two lines.\n");
    assert_eq!(tree.children.len(), 1);
    let label = &tree.children[0];
    assert!(matches!(&label.kind, NodeKind::Label(l) if l.label == "Note"));
    assert_eq!(label.children.len(), 1);
    assert_eq!(label.children[0].kind, NodeKind::Paragraph { tight: false });
}

#[test]
fn test_two_headings_two_splits() {
    let mut target = HtmlTarget::default();
    let (out, splits) = target.parse_with_splits("intro\n\n# One\n\nbody\n\n# Two\n");
    assert_eq!(splits.len(), 2);
    assert!(out[splits[0]..].starts_with("<h1>One</h1>"));
    assert!(out[splits[1]..].starts_with("<h1>Two</h1>"));
}

#[test]
fn test_ext_chars_longest_match() {
    let mut target = HtmlTarget::new(Options::default().with_feature(Feature::ExtChars));
    assert_eq!(
        target.parse("a---b a--b\n"),
        "<p>a\u{2014}b a\u{2013}b</p>\n"
    );
    assert_eq!(HtmlTarget::default().parse("a---b\n"), "<p>a---b</p>\n");
}

#[test]
fn test_strict_and_relaxed_differ_on_tilde() {
    assert_ne!(escape_strict("x~y"), escape_relaxed("x~y"));
}

#[test]
fn test_disabled_features_leave_prose() {
    let options = Options::default().with_features(Features::none());
    let mut target = HtmlTarget::new(options);
    assert_eq!(target.parse("$$x$$\n"), "<p>$$x$$</p>\n");
    assert_eq!(target.parse("See [#k].\n"), "<p>See [#k].</p>\n");
    assert!(target.biblio().is_empty());
}

#[test]
fn test_options_from_yaml() {
    let options = Options::from_yaml_str("features: [math, ext_chars]\nstrip_newlines: true\n")
        .expect("valid options");
    assert!(options.has(Feature::Math));
    assert!(options.has(Feature::ExtChars));
    assert!(!options.has(Feature::Citations));
    assert!(options.strip_newlines);
    assert!(!options.allow_inline_html);
}

#[test]
fn test_latex_document() {
    let mut target = LatexTarget::default();
    assert_eq!(
        target.parse("# Intro\n\n> *Quoted* text\n\n- one\n- two\n"),
        "\\section{Intro}\n\n«{\\it Quoted} text\n»\n\
         \\begin{itemize}\n\\item{\none\n}\n\\item{\ntwo\n}\n\\end{itemize}\n"
    );
}

#[test]
fn test_parse_lines_splits_code_blocks() {
    let mut target = HtmlTarget::default();
    let out = target.parse_lines(&["```", "a", "b", "```"]);
    // Four lines in, three out: the code block's own line breaks split it.
    assert_eq!(out, vec!["<pre><code>a", "b", "</code></pre>"]);
}

#[test_log::test]
fn test_deep_nesting_is_cut_off() {
    let source = format!("{}deep\n", "> ".repeat(MAX_DEPTH + 50));
    let html = HtmlTarget::default().parse(&source);
    assert!(html.matches("<blockquote>").count() <= MAX_DEPTH);

    let tex = LatexTarget::default().parse(&source);
    assert!(tex.matches('«').count() <= MAX_DEPTH);
}

/// Kinds of the children of the first list item in `document`.
fn first_item_children(document: &Node) -> Vec<NodeKind> {
    let mut item = None;
    enumerate(document, |node| {
        if item.is_none() && node.kind == NodeKind::ListItem {
            item = Some(node.children.iter().map(|c| c.kind.clone()).collect());
        }
    });
    item.unwrap_or_default()
}

#[test]
fn test_fence_on_list_marker_line_hides_math() {
    let source = "- ```\n  $$x$$\n  ```\n";
    let tree = Parser::default().parse(source);
    assert!(!kinds(&tree).iter().any(|k| matches!(k, NodeKind::MathBlock(_))));
    assert_eq!(
        HtmlTarget::default().parse(source),
        "<ul>\n<li>\n<pre><code>$$x$$\n</code></pre>\n</li>\n</ul>\n"
    );
}

#[test]
fn test_math_after_unclosed_fence_in_quote() {
    let tree = Parser::default().parse("> ```\n> code\n\n$$x$$\n");
    assert_eq!(tree.children.len(), 2);
    assert_eq!(tree.children[0].kind, NodeKind::BlockQuote);
    assert!(matches!(&tree.children[1].kind, NodeKind::MathBlock(m) if m.text == "x"));
}

#[test]
fn test_html_block_content_is_left_alone() {
    let source = "<div>\n$$x$$\n</div>\n";
    assert_eq!(HtmlTarget::default().parse(source), source);

    let tex = LatexTarget::default().parse(source);
    assert!(tex.contains("div"));
    assert!(!tex.contains('\u{F8FF}'));
}

#[test]
fn test_math_in_list_item_continuation() {
    let tree = Parser::default().parse("- a\n\n    $$x$$\n");
    let children = first_item_children(&tree);
    assert_eq!(children.len(), 2);
    assert!(matches!(&children[1], NodeKind::MathBlock(m) if m.text == "x"));
}

#[test]
fn test_math_in_nested_list_item() {
    let tree = Parser::default().parse("- a\n  - $$x$$\n");
    let found = kinds(&tree);
    let items = found.iter().filter(|k| **k == NodeKind::ListItem).count();
    assert_eq!(items, 2);
    assert!(matches!(found.last(), Some(NodeKind::MathBlock(m)) if m.text == "x"));
}

#[test]
fn test_annotated_image_in_list_is_registered() {
    let mut target = HtmlTarget::default();
    let out = target.parse("- ***[img1]an apple***c\n");
    assert!(out.starts_with("<ul>\n<li>"));
    assert!(out.contains("<img src=\"img1\" alt=\"an apple\">"));
    assert_eq!(
        target.definitions().image("img1").map(|i| i.alt.as_str()),
        Some("an apple")
    );
}

#[test]
fn test_label_in_list_item() {
    let tree = Parser::default().parse("- @@ Note @@\n      inside\n- next\n");
    let children = first_item_children(&tree);
    assert_eq!(children.len(), 1);
    assert!(matches!(&children[0], NodeKind::Label(l) if l.label == "Note"));

    let labels: Vec<&Node> = {
        let mut out = Vec::new();
        enumerate(&tree, |node| {
            if matches!(node.kind, NodeKind::Label(_)) {
                out.push(node);
            }
        });
        out
    };
    assert_eq!(labels[0].children.len(), 1);
    assert_eq!(kinds(&labels[0].children[0])[1], NodeKind::Text("inside".into()));
}

proptest! {
    #[test]
    fn test_annotated_image_html(
        key in "[A-Za-z0-9_=+/:.-]{1,24}",
        alt in "[A-Za-z0-9 &<>\"'.,]{0,32}",
    ) {
        let mut target = HtmlTarget::default();
        let out = target.parse(&format!("***[{key}]{alt}***comment\n"));
        let escaped = alt
            .trim()
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;");
        prop_assert_eq!(out, format!("<img src=\"{key}\" alt=\"{escaped}\">\n"));
        prop_assert_eq!(target.definitions().images.len(), 1);
    }
}
