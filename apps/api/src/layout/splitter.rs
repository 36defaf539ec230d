//! Paragraph splitter: divides a plain paragraph so its first part fills the
//! space left on the current page.
//!
//! The cut lands near a character budget derived from the remaining height,
//! pulled back to the nearest whitespace or clause punctuation when one is
//! within a line's worth of characters. Both parts are re-measured from their
//! own text; nothing is prorated from the original height.

use tracing::debug;

use crate::layout::classifier::escape_html;
use crate::layout::element::{ContentElement, ElementKind};
use crate::layout::metrics::HeightModel;
use crate::layout::profile::LayoutContext;

/// Fewer lines than this on the current page is not worth a fragment.
const MIN_SPLIT_LINES: u32 = 2;

/// Splits `paragraph` so the first part fits within `available` pixels.
///
/// Returns `None` when the paragraph is not splittable, when too little space
/// remains, or when the whole text already fits the budget. `None` is an
/// ordinary outcome, not an error.
pub fn try_split(
    paragraph: &ContentElement,
    available: u32,
    ctx: &LayoutContext,
) -> Option<(ContentElement, ContentElement)> {
    if !paragraph.is_splittable() {
        return None;
    }

    let model = HeightModel::new(ctx);
    let h = model.heights();
    if available < h.paragraph_base + MIN_SPLIT_LINES * h.paragraph_line {
        return None;
    }

    let chars: Vec<char> = paragraph.text().chars().collect();
    let max_lines = model.paragraph_lines_within(available).max(MIN_SPLIT_LINES);
    let budget = char_budget(&chars, max_lines, &model);
    if budget == 0 || budget >= chars.len() {
        return None;
    }

    let window = model.chars_per_line().max(1) as usize;
    let cut = find_cut(&chars, budget, window);

    let head: String = chars[..cut].iter().collect();
    let tail: String = chars[cut..].iter().collect();
    let (head, tail) = (head.trim_end(), tail.trim_start());
    if head.is_empty() || tail.is_empty() {
        return None;
    }

    let first = paragraph_part(head, &model);
    if first.height() > available {
        debug!(
            first_height = first.height(),
            available, "Split rejected: first part would overflow"
        );
        return None;
    }
    let second = paragraph_part(tail, &model);

    Some((first, second))
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// Characters that fit in `max_lines` lines.
///
/// The nominal budget is `chars_per_line × max_lines` in narrow glyphs; it is
/// clamped to the prefix whose measured ink width still wraps to at most
/// `max_lines` lines, so wide-glyph text is not over-filled.
fn char_budget(chars: &[char], max_lines: u32, model: &HeightModel<'_>) -> usize {
    let nominal = model.chars_per_line() as usize * max_lines as usize;
    let ink_limit = max_lines as u64 * model.content_width() as u64;

    let mut width = 0u64;
    let mut fitting = 0usize;
    for &c in chars.iter().take(nominal) {
        width += model.glyph_width(c) as u64;
        if width >= ink_limit {
            break;
        }
        fitting += 1;
    }
    fitting
}

/// Searches back from `budget` (at most `window` characters) for a position
/// right after a boundary character. Falls back to the raw budget.
fn find_cut(chars: &[char], budget: usize, window: usize) -> usize {
    let floor = budget.saturating_sub(window);
    (floor + 1..=budget)
        .rev()
        .find(|&i| is_cut_boundary(chars[i - 1]))
        .unwrap_or(budget)
}

fn is_cut_boundary(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            ',' | '.'
                | ';'
                | ':'
                | '!'
                | '?'
                | ')'
                | '，'
                | '。'
                | '；'
                | '：'
                | '、'
                | '！'
                | '？'
                | '）'
        )
}

fn paragraph_part(text: &str, model: &HeightModel<'_>) -> ContentElement {
    ContentElement::new(
        ElementKind::Paragraph,
        format!("<p>{}</p>", escape_html(text)),
        text.to_string(),
        model.paragraph_height(text),
    )
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

    fn paragraph(text: &str, ctx: &LayoutContext) -> ContentElement {
        paragraph_part(text, &HeightModel::new(ctx))
    }

    /// Asserts `original == head + whitespace seam + tail`.
    fn assert_fidelity(original: &str, head: &str, tail: &str) {
        assert!(original.starts_with(head), "head must be a prefix");
        assert!(original.ends_with(tail), "tail must be a suffix");
        assert!(head.len() + tail.len() <= original.len(), "parts overlap");
        let seam = &original[head.len()..original.len() - tail.len()];
        assert!(seam.trim().is_empty(), "seam should be whitespace, got {seam:?}");
    }

    #[test]
    fn test_refuses_when_space_too_small() {
        let ctx = medium();
        let para = paragraph(&"word ".repeat(500), &ctx);
        // base 20 + 2 lines × 26 = 72
        assert!(try_split(&para, 71, &ctx).is_none());
    }

    #[test]
    fn test_refuses_when_first_part_would_overflow() {
        let ctx = medium();
        let para = paragraph(&"word ".repeat(500), &ctx);
        // Two lines need 20 + 52 + 18 = 90px; 72px passes the gate but cannot hold them.
        assert!(try_split(&para, 72, &ctx).is_none());
    }

    #[test]
    fn test_refuses_non_splittable_elements() {
        let ctx = medium();
        let quote = ContentElement::new(
            ElementKind::Blockquote,
            "<blockquote>x</blockquote>".into(),
            "word ".repeat(500),
            2000,
        );
        assert!(try_split(&quote, 600, &ctx).is_none());
    }

    #[test]
    fn test_refuses_when_text_fits_budget() {
        let ctx = medium();
        let para = paragraph("A short paragraph.", &ctx);
        assert!(try_split(&para, 600, &ctx).is_none());
    }

    #[test]
    fn test_split_preserves_text_exactly() {
        let ctx = medium();
        let text = "word ".repeat(600);
        let text = text.trim_end();
        let para = paragraph(text, &ctx);
        let (first, second) = try_split(&para, 500, &ctx).expect("should split");
        assert_fidelity(text, first.text(), second.text());
        assert!(first.height() <= 500);
    }

    #[test]
    fn test_split_lands_on_word_boundary() {
        let ctx = medium();
        let text = "alpha beta gamma delta ".repeat(200);
        let text = text.trim_end();
        let para = paragraph(text, &ctx);
        let (first, second) = try_split(&para, 400, &ctx).expect("should split");
        let words = ["alpha", "beta", "gamma", "delta"];
        assert!(first.text().split(' ').all(|w| words.contains(&w)));
        assert!(second.text().split(' ').all(|w| words.contains(&w)));
    }

    #[test]
    fn test_split_prefers_cjk_sentence_end() {
        let ctx = medium();
        let text = "这是一个测试句子。".repeat(300);
        let para = paragraph(&text, &ctx);
        let (first, second) = try_split(&para, 400, &ctx).expect("should split");
        assert!(first.text().ends_with('。'), "cut should follow punctuation");
        assert_fidelity(&text, first.text(), second.text());
    }

    #[test]
    fn test_wide_glyph_first_part_fits() {
        let ctx = medium();
        let text = "字".repeat(2000);
        let para = paragraph(&text, &ctx);
        let (first, second) = try_split(&para, 400, &ctx).expect("should split");
        assert!(first.height() <= 400, "got {}", first.height());
        assert_eq!(first.text().chars().count() + second.text().chars().count(), 2000);
    }

    #[test]
    fn test_parts_are_remeasured() {
        let ctx = medium();
        let model = HeightModel::new(&ctx);
        let text = "word ".repeat(600);
        let para = paragraph(text.trim_end(), &ctx);
        let (first, second) = try_split(&para, 500, &ctx).unwrap();
        assert_eq!(first.height(), model.paragraph_height(first.text()));
        assert_eq!(second.height(), model.paragraph_height(second.text()));
        assert!(second.is_splittable());
        assert_eq!(first.markup(), format!("<p>{}</p>", first.text()));
    }

    #[test]
    fn test_split_part_markup_is_escaped() {
        let ctx = medium();
        let text = "a<b & c ".repeat(400);
        let para = paragraph(text.trim_end(), &ctx);
        let (first, _) = try_split(&para, 400, &ctx).unwrap();
        assert!(first.markup().contains("&lt;"));
        assert!(!first.markup()[3..first.markup().len() - 4].contains('<'));
    }

    #[test]
    fn test_find_cut_falls_back_to_budget() {
        let chars: Vec<char> = "abcdefghij".chars().collect();
        assert_eq!(find_cut(&chars, 6, 3), 6);
        let chars: Vec<char> = "abc defghij".chars().collect();
        assert_eq!(find_cut(&chars, 6, 3), 4);
        assert_eq!(find_cut(&chars, 9, 3), 9);
    }
}
