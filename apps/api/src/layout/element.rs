//! Content elements and pages: the units moved through the pagination pipeline.

use serde::{Deserialize, Serialize};

use crate::layout::profile::CODE_SPLIT_THRESHOLD_LINES;

// ────────────────────────────────────────────────────────────────────────────
// Element kinds
// ────────────────────────────────────────────────────────────────────────────

/// What a classified element is. Counts carried by a variant are the inputs
/// its height formula was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    Heading { level: u8 },
    Paragraph,
    ParagraphWithImages { images: usize },
    List { items: usize },
    Code { lines: usize },
    Blockquote,
    Table { rows: usize },
    Image,
    Rule,
    PlainText,
    ForcedBreak,
    Unclassified,
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Heading { .. } => "heading",
            ElementKind::Paragraph => "paragraph",
            ElementKind::ParagraphWithImages { .. } => "paragraph_with_images",
            ElementKind::List { .. } => "list",
            ElementKind::Code { .. } => "code",
            ElementKind::Blockquote => "blockquote",
            ElementKind::Table { .. } => "table",
            ElementKind::Image => "image",
            ElementKind::Rule => "rule",
            ElementKind::PlainText => "text",
            ElementKind::ForcedBreak => "pagebreak",
            ElementKind::Unclassified => "unclassified",
        }
    }

    /// True for code blocks past the line threshold.
    pub fn is_long_code(&self) -> bool {
        matches!(self, ElementKind::Code { lines } if *lines > CODE_SPLIT_THRESHOLD_LINES)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Content element
// ────────────────────────────────────────────────────────────────────────────

/// One classified, measured unit of content.
///
/// Immutable after construction: a font or page-size change produces a fresh
/// classification rather than patching heights in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentElement {
    kind: ElementKind,
    markup: String,
    text: String,
    height: u32,
}

impl ContentElement {
    pub fn new(kind: ElementKind, markup: String, text: String, height: u32) -> Self {
        Self {
            kind,
            markup,
            text,
            height,
        }
    }

    /// A zero-height marker that ends the current page.
    pub fn forced_break(markup: String) -> Self {
        Self::new(ElementKind::ForcedBreak, markup, String::new(), 0)
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Reassemblable fragment. Never re-parsed by the packer.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Plain-text extract, used only for measuring and splitting.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Only plain paragraphs with text may be divided across pages.
    pub fn is_splittable(&self) -> bool {
        matches!(self.kind, ElementKind::Paragraph) && !self.text.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Page
// ────────────────────────────────────────────────────────────────────────────

/// An ordered run of elements destined for one canvas.
///
/// `follows_forced_break` records that the page began immediately after an
/// author-inserted break; the optimizer never merges such a page backwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    elements: Vec<ContentElement>,
    follows_forced_break: bool,
}

impl Page {
    pub fn new(elements: Vec<ContentElement>, follows_forced_break: bool) -> Self {
        Self {
            elements,
            follows_forced_break,
        }
    }

    pub fn elements(&self) -> &[ContentElement] {
        &self.elements
    }

    pub fn follows_forced_break(&self) -> bool {
        self.follows_forced_break
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Summed estimated height of every element on the page.
    pub fn height(&self) -> u32 {
        self.elements.iter().map(|e| e.height()).sum()
    }

    pub(crate) fn push(&mut self, element: ContentElement) {
        self.elements.push(element);
    }

    /// Appends `next`'s elements after this page's, keeping this page's
    /// break flag.
    pub(crate) fn absorb(&mut self, next: Page) {
        self.elements.extend(next.elements);
    }

    /// Joins the elements' markup in order, one element per line.
    pub fn to_markup(&self) -> String {
        self.elements
            .iter()
            .filter(|e| e.kind() != ElementKind::ForcedBreak)
            .map(|e| e.markup())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn para(text: &str, height: u32) -> ContentElement {
        ContentElement::new(
            ElementKind::Paragraph,
            format!("<p>{text}</p>"),
            text.to_string(),
            height,
        )
    }

    #[test]
    fn test_only_paragraphs_with_text_are_splittable() {
        assert!(para("hello", 64).is_splittable());
        assert!(!para("", 20).is_splittable());

        let quote = ContentElement::new(
            ElementKind::Blockquote,
            "<blockquote>hi</blockquote>".to_string(),
            "hi".to_string(),
            99,
        );
        assert!(!quote.is_splittable());

        let with_images = ContentElement::new(
            ElementKind::ParagraphWithImages { images: 1 },
            "<p>hi<img></p>".to_string(),
            "hi".to_string(),
            364,
        );
        assert!(!with_images.is_splittable());
    }

    #[test]
    fn test_forced_break_has_zero_height() {
        let brk = ContentElement::forced_break("<div class=\"pagebreak-marker\"></div>".into());
        assert_eq!(brk.height(), 0);
        assert_eq!(brk.kind().name(), "pagebreak");
    }

    #[test]
    fn test_long_code_threshold() {
        assert!(!ElementKind::Code { lines: 10 }.is_long_code());
        assert!(ElementKind::Code { lines: 11 }.is_long_code());
        assert!(!ElementKind::Paragraph.is_long_code());
    }

    #[test]
    fn test_page_height_and_markup() {
        let page = Page::new(vec![para("a", 64), para("b", 64)], false);
        assert_eq!(page.height(), 128);
        assert_eq!(page.to_markup(), "<p>a</p>\n<p>b</p>");
    }

    #[test]
    fn test_absorb_keeps_order_and_first_flag() {
        let mut first = Page::new(vec![para("a", 10)], true);
        let second = Page::new(vec![para("b", 20)], false);
        first.absorb(second);
        assert!(first.follows_forced_break());
        let texts: Vec<&str> = first.elements().iter().map(|e| e.text()).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn test_kind_serializes_with_type_tag() {
        let json = serde_json::to_value(ElementKind::Heading { level: 2 }).unwrap();
        assert_eq!(json["type"], "heading");
        assert_eq!(json["level"], 2);
    }
}
