//! Element classifier: turns rendered markup into a flat, ordered sequence of
//! measured [`ContentElement`]s.
//!
//! Structural wrappers (`div`, `section`, …) are flattened by descending into
//! their children. Content-bearing tags become exactly one element each. A
//! subtree that contains a forced-break marker is never collapsed into one
//! element; its children are visited individually so the break lands in order.
//!
//! Traversal uses an explicit work stack, so deeply nested input cannot exhaust
//! the call stack. Nothing here returns an error: unknown nodes degrade to text
//! extraction and empty input yields an empty sequence.

use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node};

use crate::layout::element::{ContentElement, ElementKind};
use crate::layout::metrics::HeightModel;
use crate::layout::profile::LayoutContext;

/// Containers that are flattened rather than classified.
const WRAPPER_TAGS: &[&str] = &[
    "html", "body", "div", "section", "article", "main", "header", "footer", "aside", "nav",
];

/// Nodes that contribute nothing to layout.
const SKIPPED_TAGS: &[&str] = &[
    "head", "title", "meta", "link", "style", "script", "template", "noscript",
];

const BREAK_CLASS: &str = "pagebreak-marker";
const BREAK_ATTR: &str = "data-pagebreak";
const BREAK_COMMENT: &str = "pagebreak";

/// Fallback measurement text for images without `alt`.
const IMAGE_PLACEHOLDER_TEXT: &str = "image";

enum Classified {
    Element(ContentElement),
    Descend,
    Skip,
}

// ────────────────────────────────────────────────────────────────────────────
// Public entry point
// ────────────────────────────────────────────────────────────────────────────

/// Classifies `markup` into document-ordered content elements measured with
/// the heights in `ctx`.
pub fn classify(markup: &str, ctx: &LayoutContext) -> Vec<ContentElement> {
    if markup.trim().is_empty() {
        return Vec::new();
    }

    let fragment = Html::parse_fragment(markup);
    let model = HeightModel::new(ctx);
    let mut elements = Vec::new();
    let mut work: Vec<NodeRef<'_, Node>> = Vec::new();
    push_children(&mut work, *fragment.root_element());

    while let Some(node) = work.pop() {
        match node.value() {
            Node::Text(raw) => {
                let text = normalize_whitespace(raw);
                if !text.is_empty() {
                    let height = model.text_height(&text);
                    elements.push(ContentElement::new(
                        ElementKind::PlainText,
                        escape_html(raw),
                        text,
                        height,
                    ));
                }
            }
            Node::Comment(comment) if is_break_comment(comment) => {
                elements.push(ContentElement::forced_break(format!("<!--{}-->", &**comment)));
            }
            Node::Element(_) => {
                let Some(el) = ElementRef::wrap(node) else {
                    continue;
                };
                match classify_element(el, &model) {
                    Classified::Element(element) => elements.push(element),
                    Classified::Descend => push_children(&mut work, node),
                    Classified::Skip => {}
                }
            }
            _ => {}
        }
    }

    elements
}

/// Pushes `node`'s children so that the first child is popped first.
fn push_children<'a>(work: &mut Vec<NodeRef<'a, Node>>, node: NodeRef<'a, Node>) {
    let children: Vec<NodeRef<'a, Node>> = node.children().collect();
    work.extend(children.into_iter().rev());
}

// ────────────────────────────────────────────────────────────────────────────
// Per-tag classification
// ────────────────────────────────────────────────────────────────────────────

fn classify_element(el: ElementRef<'_>, model: &HeightModel<'_>) -> Classified {
    if is_break_marker(el) {
        return Classified::Element(ContentElement::forced_break(el.html()));
    }

    let name = el.value().name();
    if SKIPPED_TAGS.contains(&name) {
        return Classified::Skip;
    }
    if WRAPPER_TAGS.contains(&name) || contains_break(el) {
        return Classified::Descend;
    }

    match name {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let text = element_text(el);
            if text.is_empty() {
                return Classified::Skip;
            }
            let level = name.as_bytes()[1] - b'0';
            let height = model.heading_height(level);
            emit(ElementKind::Heading { level }, el, text, height)
        }

        "p" => {
            let text = element_text(el);
            let images = count_tag(el, "img");
            match (text.is_empty(), images) {
                (false, 0) => {
                    let height = model.paragraph_height(&text);
                    emit(ElementKind::Paragraph, el, text, height)
                }
                (false, n) => {
                    let height = model.paragraph_height(&text) + model.images_height(n);
                    emit(ElementKind::ParagraphWithImages { images: n }, el, text, height)
                }
                (true, 0) => emit(
                    ElementKind::Paragraph,
                    el,
                    text,
                    model.empty_paragraph_height(),
                ),
                (true, n) => {
                    let height = model.images_height(n) + model.heights().margin;
                    emit(ElementKind::ParagraphWithImages { images: n }, el, text, height)
                }
            }
        }

        "img" => {
            let text = el
                .value()
                .attr("alt")
                .map(normalize_whitespace)
                .filter(|alt| !alt.is_empty())
                .unwrap_or_else(|| IMAGE_PLACEHOLDER_TEXT.to_string());
            emit(ElementKind::Image, el, text, model.image_height())
        }

        "ul" | "ol" => {
            let items = el
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|child| child.value().name() == "li")
                .count();
            let images = count_tag(el, "img");
            let height = model.list_height(items, images);
            emit(ElementKind::List { items }, el, element_text(el), height)
        }

        "pre" => {
            let code: String = descendant_elements(el)
                .find(|child| child.value().name() == "code")
                .unwrap_or(el)
                .text()
                .collect();
            let lines = code.lines().count().max(1);
            emit(ElementKind::Code { lines }, el, code, model.code_height(lines))
        }

        "blockquote" => {
            let text = element_text(el);
            let images = count_tag(el, "img");
            let height = if !text.is_empty() {
                model.blockquote_height(&text) + model.images_height(images)
            } else if images > 0 {
                model.images_height(images) + model.heights().margin
            } else {
                model.blockquote_height("")
            };
            emit(ElementKind::Blockquote, el, text, height)
        }

        "table" => {
            let rows: Vec<ElementRef<'_>> = descendant_elements(el)
                .filter(|child| child.value().name() == "tr")
                .collect();
            let header_rows = rows
                .iter()
                .filter(|row| {
                    row.children()
                        .filter_map(ElementRef::wrap)
                        .any(|cell| cell.value().name() == "th")
                })
                .count();
            let height = model.table_height(header_rows, rows.len() - header_rows);
            emit(
                ElementKind::Table { rows: rows.len() },
                el,
                element_text(el),
                height,
            )
        }

        "hr" => emit(ElementKind::Rule, el, String::new(), model.rule_height()),

        _ => {
            if el.children().any(|child| child.value().is_element()) {
                return Classified::Descend;
            }
            let text = element_text(el);
            if text.is_empty() {
                return Classified::Skip;
            }
            let height = model.text_height(&text);
            emit(ElementKind::Unclassified, el, text, height)
        }
    }
}

fn emit(kind: ElementKind, el: ElementRef<'_>, text: String, height: u32) -> Classified {
    Classified::Element(ContentElement::new(kind, el.html(), text, height))
}

// ────────────────────────────────────────────────────────────────────────────
// Forced-break detection
// ────────────────────────────────────────────────────────────────────────────

fn is_break_marker(el: ElementRef<'_>) -> bool {
    let value = el.value();
    value.classes().any(|class| class == BREAK_CLASS)
        || value
            .attr(BREAK_ATTR)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// `<!-- pagebreak -->`, any case, any surrounding whitespace.
fn is_break_comment(comment: &str) -> bool {
    comment.trim().eq_ignore_ascii_case(BREAK_COMMENT)
}

fn contains_break(el: ElementRef<'_>) -> bool {
    el.descendants().skip(1).any(|node| match node.value() {
        Node::Element(_) => ElementRef::wrap(node).is_some_and(is_break_marker),
        Node::Comment(comment) => is_break_comment(comment),
        _ => false,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Text helpers
// ────────────────────────────────────────────────────────────────────────────

/// Every element strictly below `el`, in document order.
fn descendant_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.descendants().skip(1).filter_map(ElementRef::wrap)
}

fn count_tag(el: ElementRef<'_>, tag: &str) -> usize {
    descendant_elements(el)
        .filter(|child| child.value().name() == tag)
        .count()
}

/// Text content with whitespace runs collapsed to single spaces.
fn element_text(el: ElementRef<'_>) -> String {
    normalize_whitespace(&el.text().collect::<String>())
}

pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::profile::{FontScaleConfig, PageSizeTable, REFERENCE_HEIGHTS};

    fn medium() -> LayoutContext {
        LayoutContext::new(
            PageSizeTable::builtin().get("medium").unwrap().clone(),
            FontScaleConfig::default(),
            &REFERENCE_HEIGHTS,
        )
    }

    fn kinds(elements: &[ContentElement]) -> Vec<&'static str> {
        elements.iter().map(|e| e.kind().name()).collect()
    }

    #[test]
    fn test_empty_and_whitespace_input_yield_nothing() {
        let ctx = medium();
        assert!(classify("", &ctx).is_empty());
        assert!(classify("   \n\t  ", &ctx).is_empty());
    }

    #[test]
    fn test_headings_get_level_and_margin() {
        let ctx = medium();
        let elements = classify("<h1>Title</h1><h3>Sub</h3>", &ctx);
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].kind(), ElementKind::Heading { level: 1 });
        assert_eq!(elements[0].height(), 85 + 18);
        assert_eq!(elements[1].kind(), ElementKind::Heading { level: 3 });
        assert_eq!(elements[1].text(), "Sub");
        assert_eq!(elements[1].markup(), "<h3>Sub</h3>");
    }

    #[test]
    fn test_empty_heading_is_dropped() {
        let ctx = medium();
        let elements = classify("<h2>   </h2><p>body</p>", &ctx);
        assert_eq!(kinds(&elements), vec!["paragraph"]);
    }

    #[test]
    fn test_plain_paragraph_is_splittable() {
        let ctx = medium();
        let elements = classify("<p>Hello <b>bold</b>   world</p>", &ctx);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].kind(), ElementKind::Paragraph);
        assert_eq!(elements[0].text(), "Hello bold world");
        assert!(elements[0].is_splittable());
        assert_eq!(elements[0].height(), 64);
    }

    #[test]
    fn test_paragraph_with_images_is_not_splittable() {
        let ctx = medium();
        let elements = classify(r#"<p>caption <img src="a.png"><img src="b.png"></p>"#, &ctx);
        assert_eq!(elements[0].kind(), ElementKind::ParagraphWithImages { images: 2 });
        assert!(!elements[0].is_splittable());
        assert_eq!(elements[0].height(), 64 + 600);
    }

    #[test]
    fn test_image_only_paragraph() {
        let ctx = medium();
        let elements = classify(r#"<p><img src="a.png"></p>"#, &ctx);
        assert_eq!(elements[0].kind(), ElementKind::ParagraphWithImages { images: 1 });
        assert_eq!(elements[0].text(), "");
        assert_eq!(elements[0].height(), 300 + 18);
    }

    #[test]
    fn test_empty_paragraph_keeps_minimum_height() {
        let ctx = medium();
        let elements = classify("<p></p>", &ctx);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].height(), 20);
        assert!(!elements[0].is_splittable());
    }

    #[test]
    fn test_standalone_image_uses_alt_text() {
        let ctx = medium();
        let elements = classify(r#"<img src="x.png" alt="A cat"><img src="y.png">"#, &ctx);
        assert_eq!(kinds(&elements), vec!["image", "image"]);
        assert_eq!(elements[0].text(), "A cat");
        assert_eq!(elements[1].text(), "image");
        assert_eq!(elements[0].height(), 318);
    }

    #[test]
    fn test_list_counts_direct_items_only() {
        let ctx = medium();
        let html = "<ul><li>one</li><li>two<ul><li>nested</li></ul></li><li>three</li></ul>";
        let elements = classify(html, &ctx);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].kind(), ElementKind::List { items: 3 });
        assert_eq!(elements[0].height(), 3 * 32 + 18);
    }

    #[test]
    fn test_code_block_counts_lines() {
        let ctx = medium();
        let code = (1..=12).map(|i| format!("let x{i} = {i};")).collect::<Vec<_>>().join("\n");
        let html = format!("<pre><code>{code}</code></pre>");
        let elements = classify(&html, &ctx);
        assert_eq!(elements[0].kind(), ElementKind::Code { lines: 12 });
        assert!(elements[0].kind().is_long_code());
        assert!(!elements[0].is_splittable());
        assert_eq!(elements[0].height(), 35 + 12 * 22 + 18);
    }

    #[test]
    fn test_blockquote_heights() {
        let ctx = medium();
        let elements = classify("<blockquote><p>Quoted</p></blockquote><blockquote></blockquote>", &ctx);
        assert_eq!(kinds(&elements), vec!["blockquote", "blockquote"]);
        assert_eq!(elements[0].height(), 55 + 26 + 18);
        assert_eq!(elements[1].height(), 55 + 18);
    }

    #[test]
    fn test_table_separates_header_rows() {
        let ctx = medium();
        let html = "<table><thead><tr><th>A</th><th>B</th></tr></thead>\
                    <tbody><tr><td>1</td><td>2</td></tr><tr><td>3</td><td>4</td></tr></tbody></table>";
        let elements = classify(html, &ctx);
        assert_eq!(elements[0].kind(), ElementKind::Table { rows: 3 });
        assert_eq!(elements[0].height(), 42 + 2 * 38 + 18);
    }

    #[test]
    fn test_rule() {
        let ctx = medium();
        let elements = classify("<hr>", &ctx);
        assert_eq!(elements[0].kind(), ElementKind::Rule);
        assert_eq!(elements[0].height(), 30);
    }

    #[test]
    fn test_wrappers_are_flattened_in_order() {
        let ctx = medium();
        let html = "<div><section><h2>A</h2><p>one</p></section><article><p>two</p></article></div>";
        let elements = classify(html, &ctx);
        assert_eq!(kinds(&elements), vec!["heading", "paragraph", "paragraph"]);
        assert_eq!(elements[2].text(), "two");
    }

    #[test]
    fn test_break_marker_by_class_and_attribute() {
        let ctx = medium();
        let html = r#"<p>a</p><div class="pagebreak-marker"></div><p>b</p><span data-pagebreak="true"></span><p>c</p>"#;
        let elements = classify(html, &ctx);
        assert_eq!(
            kinds(&elements),
            vec!["paragraph", "pagebreak", "paragraph", "pagebreak", "paragraph"]
        );
        assert_eq!(elements[1].height(), 0);
    }

    #[test]
    fn test_break_comment_directive() {
        let ctx = medium();
        let elements = classify("<p>a</p><!--  PageBreak --><p>b</p><!-- note --><p>c</p>", &ctx);
        assert_eq!(
            kinds(&elements),
            vec!["paragraph", "pagebreak", "paragraph", "paragraph"]
        );
    }

    #[test]
    fn test_break_inside_container_is_kept_in_order() {
        let ctx = medium();
        let html = r#"<blockquote><p>before</p><div class="pagebreak-marker"></div><p>after</p></blockquote>"#;
        let elements = classify(html, &ctx);
        assert_eq!(kinds(&elements), vec!["paragraph", "pagebreak", "paragraph"]);
        assert_eq!(elements[0].text(), "before");
        assert_eq!(elements[2].text(), "after");
    }

    #[test]
    fn test_top_level_text_and_unknown_tags() {
        let ctx = medium();
        let elements = classify("loose text <span>inline</span><figure><img src=\"f.png\"></figure>", &ctx);
        assert_eq!(kinds(&elements), vec!["text", "unclassified", "image"]);
        assert_eq!(elements[0].text(), "loose text");
        assert_eq!(elements[1].text(), "inline");
    }

    #[test]
    fn test_plain_text_markup_is_escaped() {
        let ctx = medium();
        let elements = classify("a &lt; b", &ctx);
        assert_eq!(elements[0].text(), "a < b");
        assert_eq!(elements[0].markup(), "a &lt; b");
    }

    #[test]
    fn test_style_and_script_are_skipped() {
        let ctx = medium();
        let html = "<style>.x { color: red }</style><script>var a = 1;</script><p>body</p>";
        let elements = classify(html, &ctx);
        assert_eq!(kinds(&elements), vec!["paragraph"]);
    }

    #[test]
    fn test_malformed_markup_degrades_gracefully() {
        let ctx = medium();
        let elements = classify("<p>unclosed <b>bold <div>inner</p></unknown><<>>", &ctx);
        assert!(!elements.is_empty());
        assert!(elements.iter().all(|e| e.height() > 0));
    }

    #[test]
    fn test_deep_nesting_does_not_overflow_stack() {
        let ctx = medium();
        let depth = 2_000;
        let html = format!("{}<p>deep</p>{}", "<div>".repeat(depth), "</div>".repeat(depth));
        let elements = classify(&html, &ctx);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].text(), "deep");
    }

    #[test]
    fn test_classification_is_deterministic() {
        let ctx = medium();
        let html = "<h1>T</h1><p>one</p><ul><li>x</li></ul>";
        assert_eq!(classify(html, &ctx), classify(html, &ctx));
    }
}
