//! Height estimation model.
//!
//! Maps element kind plus text to an estimated pixel height without access to
//! the real renderer. Text is measured by summing per-glyph advance widths
//! (wide for CJK and other non-Latin code points, narrow for Latin), then
//! wrapped against the content width:
//!
//! ```text
//! lines  = max(1, floor(ink_width / content_width) + 1)
//! height = base + lines × per_line + margin
//! ```
//!
//! The classifier, splitter and optimizer all measure through [`HeightModel`];
//! no other module repeats these formulas.

use crate::layout::profile::{HeightTable, LayoutContext, IMAGE_HEIGHT_PX, QUOTE_INDENT_PX};

/// Last code point treated as a narrow glyph (end of Latin Extended-B).
const NARROW_GLYPH_MAX: char = '\u{024F}';

/// Height formulas bound to one [`LayoutContext`].
#[derive(Debug, Clone, Copy)]
pub struct HeightModel<'a> {
    heights: &'a HeightTable,
    content_width: u32,
}

impl<'a> HeightModel<'a> {
    pub fn new(ctx: &'a LayoutContext) -> Self {
        Self {
            heights: &ctx.heights,
            content_width: ctx.content_width().max(1),
        }
    }

    pub fn heights(&self) -> &HeightTable {
        self.heights
    }

    // ── Glyph measurement ───────────────────────────────────────────────────

    pub fn glyph_width(&self, c: char) -> u32 {
        if c <= NARROW_GLYPH_MAX {
            self.heights.narrow_glyph
        } else {
            self.heights.wide_glyph
        }
    }

    /// Summed advance width of every character in `text`.
    pub fn ink_width(&self, text: &str) -> u64 {
        text.chars().map(|c| self.glyph_width(c) as u64).sum()
    }

    /// Estimated wrapped line count when laid out at `width` pixels.
    pub fn line_count(&self, text: &str, width: u32) -> u32 {
        let lines = self.ink_width(text) / width.max(1) as u64 + 1;
        lines.min(u32::MAX as u64) as u32
    }

    /// How many narrow glyphs fit on one full-width line.
    pub fn chars_per_line(&self) -> u32 {
        self.content_width / self.heights.narrow_glyph
    }

    pub fn content_width(&self) -> u32 {
        self.content_width
    }

    // ── Text blocks ─────────────────────────────────────────────────────────

    /// Height of a run of body text. Empty text still occupies the base
    /// height plus margin.
    pub fn text_height(&self, text: &str) -> u32 {
        let h = self.heights;
        if text.is_empty() {
            return h.paragraph_base + h.margin;
        }
        let lines = self.line_count(text, self.content_width);
        h.paragraph_base
            .saturating_add(lines.saturating_mul(h.paragraph_line))
            .saturating_add(h.margin)
    }

    pub fn paragraph_height(&self, text: &str) -> u32 {
        self.text_height(text)
    }

    /// An empty `<p>` keeps the bare base height so it never vanishes from
    /// layout accounting.
    pub fn empty_paragraph_height(&self) -> u32 {
        self.heights.paragraph_base
    }

    /// Same formula as body text, wrapped against the content width minus the
    /// quote indent.
    pub fn blockquote_height(&self, text: &str) -> u32 {
        let h = self.heights;
        if text.is_empty() {
            return h.blockquote_base + h.margin;
        }
        let width = self.content_width.saturating_sub(QUOTE_INDENT_PX).max(1);
        let lines = self.line_count(text, width);
        h.blockquote_base
            .saturating_add(lines.saturating_mul(h.blockquote_line))
            .saturating_add(h.margin)
    }

    /// Largest number of paragraph lines whose block fits in `available`.
    pub fn paragraph_lines_within(&self, available: u32) -> u32 {
        let h = self.heights;
        available.saturating_sub(h.paragraph_base + h.margin) / h.paragraph_line
    }

    // ── Fixed-shape blocks ──────────────────────────────────────────────────

    /// `level` is clamped to 1..=6.
    pub fn heading_height(&self, level: u8) -> u32 {
        let idx = level.clamp(1, 6) as usize - 1;
        self.heights.heading[idx] + self.heights.margin
    }

    pub fn images_height(&self, count: usize) -> u32 {
        (count as u32).saturating_mul(IMAGE_HEIGHT_PX)
    }

    pub fn image_height(&self) -> u32 {
        IMAGE_HEIGHT_PX + self.heights.margin
    }

    pub fn list_height(&self, items: usize, images: usize) -> u32 {
        (items as u32)
            .saturating_mul(self.heights.list_item)
            .saturating_add(self.images_height(images))
            .saturating_add(self.heights.margin)
    }

    pub fn code_height(&self, lines: usize) -> u32 {
        let h = self.heights;
        h.code_base
            .saturating_add((lines as u32).saturating_mul(h.code_line))
            .saturating_add(h.margin)
    }

    /// A table without rows still reserves one row.
    pub fn table_height(&self, header_rows: usize, body_rows: usize) -> u32 {
        let h = self.heights;
        if header_rows + body_rows == 0 {
            return h.table_row + h.margin;
        }
        (header_rows as u32)
            .saturating_mul(h.table_header)
            .saturating_add((body_rows as u32).saturating_mul(h.table_row))
            .saturating_add(h.margin)
    }

    pub fn rule_height(&self) -> u32 {
        self.heights.rule
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::profile::{FontScaleConfig, PageSizeTable, REFERENCE_HEIGHTS};

    fn ctx(size: &str, font_px: u32) -> LayoutContext {
        LayoutContext::new(
            PageSizeTable::builtin().get(size).unwrap().clone(),
            FontScaleConfig::new(font_px).unwrap(),
            &REFERENCE_HEIGHTS,
        )
    }

    #[test]
    fn test_glyph_width_distinguishes_wide_and_narrow() {
        let ctx = ctx("medium", 18);
        let model = HeightModel::new(&ctx);
        assert_eq!(model.glyph_width('a'), 8);
        assert_eq!(model.glyph_width('é'), 8);
        assert_eq!(model.glyph_width('中'), 15);
        assert_eq!(model.ink_width("ab中"), 31);
        assert_eq!(model.ink_width(""), 0);
    }

    #[test]
    fn test_short_text_is_one_line() {
        let ctx = ctx("medium", 18);
        let model = HeightModel::new(&ctx);
        // 20 + 1×26 + 18
        assert_eq!(model.text_height("Hello world"), 64);
    }

    #[test]
    fn test_empty_text_keeps_base_and_margin() {
        let ctx = ctx("medium", 18);
        let model = HeightModel::new(&ctx);
        assert_eq!(model.text_height(""), 38);
        assert_eq!(model.empty_paragraph_height(), 20);
    }

    #[test]
    fn test_line_count_wraps_at_content_width() {
        let ctx = ctx("medium", 18);
        let model = HeightModel::new(&ctx);
        // Medium content width is 944px = 118 narrow glyphs.
        assert_eq!(model.line_count(&"a".repeat(117), 944), 1);
        assert_eq!(model.line_count(&"a".repeat(118), 944), 2);
        assert_eq!(model.paragraph_height(&"a".repeat(118)), 20 + 2 * 26 + 18);
    }

    #[test]
    fn test_cjk_text_wraps_sooner_than_latin() {
        let ctx = ctx("small", 18);
        let model = HeightModel::new(&ctx);
        let latin = "a".repeat(100);
        let cjk = "字".repeat(100);
        assert!(model.paragraph_height(&cjk) > model.paragraph_height(&latin));
    }

    #[test]
    fn test_blockquote_uses_narrower_width() {
        let ctx = ctx("medium", 18);
        let model = HeightModel::new(&ctx);
        // 112 glyphs = 896px: one line at 944px, two lines at 884px.
        let text = "a".repeat(112);
        assert_eq!(model.line_count(&text, 944), 1);
        assert_eq!(model.blockquote_height(&text), 55 + 2 * 26 + 18);
        assert_eq!(model.blockquote_height(""), 55 + 18);
    }

    #[test]
    fn test_fixed_shape_formulas() {
        let ctx = ctx("medium", 18);
        let model = HeightModel::new(&ctx);
        assert_eq!(model.heading_height(1), 85 + 18);
        assert_eq!(model.heading_height(6), 38 + 18);
        assert_eq!(model.heading_height(9), 38 + 18);
        assert_eq!(model.list_height(3, 0), 3 * 32 + 18);
        assert_eq!(model.list_height(2, 1), 2 * 32 + 300 + 18);
        assert_eq!(model.code_height(4), 35 + 4 * 22 + 18);
        assert_eq!(model.table_height(1, 3), 42 + 3 * 38 + 18);
        assert_eq!(model.table_height(0, 0), 38 + 18);
        assert_eq!(model.rule_height(), 30);
        assert_eq!(model.image_height(), 318);
    }

    #[test]
    fn test_heights_scale_with_font() {
        let base = ctx("medium", 18);
        let big = ctx("medium", 36);
        let text = "The quick brown fox jumps over the lazy dog";
        assert!(HeightModel::new(&big).text_height(text) > HeightModel::new(&base).text_height(text));
        assert_eq!(HeightModel::new(&big).heading_height(1), 170 + 36);
    }

    #[test]
    fn test_paragraph_lines_within_budget() {
        let ctx = ctx("medium", 18);
        let model = HeightModel::new(&ctx);
        // (300 - 20 - 18) / 26 = 10
        assert_eq!(model.paragraph_lines_within(300), 10);
        assert_eq!(model.paragraph_lines_within(10), 0);
    }

    #[test]
    fn test_chars_per_line_uses_narrow_glyph() {
        let ctx = ctx("small", 18);
        assert_eq!(HeightModel::new(&ctx).chars_per_line(), 660 / 8);
    }
}
