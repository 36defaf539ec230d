//! Page-size profiles, font scaling and the reference height table.
//!
//! Every pixel constant the height model uses lives in [`HeightTable`]. The
//! reference values were hand-calibrated against one renderer at an 18px base
//! font; other font sizes scale the whole table by `font_px / 18`. Recalibrating
//! for a different renderer means supplying a new reference table to
//! [`LayoutContext::new`], never editing call sites.
//!
//! Nothing here is global or mutable: preset tables and the active
//! configuration are plain values owned by the caller.

use serde::{Deserialize, Serialize};

use crate::layout::error::LayoutError;

// ────────────────────────────────────────────────────────────────────────────
// Fixed constants (not scaled with font size)
// ────────────────────────────────────────────────────────────────────────────

pub const REFERENCE_FONT_SIZE_PX: u32 = 18;
pub const MIN_FONT_SIZE_PX: u32 = 10;
pub const MAX_FONT_SIZE_PX: u32 = 48;

/// Height reserved for every embedded image, regardless of its real size.
pub const IMAGE_HEIGHT_PX: u32 = 300;
/// Horizontal space a blockquote loses to its indent and border.
pub const QUOTE_INDENT_PX: u32 = 60;
/// Minimum space that must remain below a heading for it to stay on a page.
pub const KEEP_WITH_NEXT_PX: u32 = 120;
/// Code blocks longer than this many lines are flagged as long.
pub const CODE_SPLIT_THRESHOLD_LINES: usize = 10;
/// Ceiling (as a fraction of content height) for a page produced by merging.
pub const MERGE_SAFETY_FRACTION: f32 = 0.95;

pub const DEFAULT_PAGE_SIZE: &str = "medium";

// ────────────────────────────────────────────────────────────────────────────
// Page size profiles
// ────────────────────────────────────────────────────────────────────────────

/// Named canvas dimensions plus padding.
///
/// Derived values are methods rather than stored fields, so swapping a profile
/// always replaces content width and height together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSizeProfile {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub padding_top: u32,
    pub padding_bottom: u32,
    pub padding_sides: u32,
    /// Fill fraction below which the optimizer treats a page as under-filled.
    /// Small canvases use a looser value because fixed overhead weighs more.
    pub merge_threshold: f32,
}

impl PageSizeProfile {
    /// 720×960 canvas.
    pub fn small() -> Self {
        Self {
            name: "small".to_string(),
            width: 720,
            height: 960,
            padding_top: 35,
            padding_bottom: 50,
            padding_sides: 30,
            merge_threshold: 0.30,
        }
    }

    /// 1024×1365 canvas, the default.
    pub fn medium() -> Self {
        Self {
            name: "medium".to_string(),
            width: 1024,
            height: 1365,
            padding_top: 50,
            padding_bottom: 70,
            padding_sides: 40,
            merge_threshold: 0.35,
        }
    }

    /// 1440×1920 canvas.
    pub fn large() -> Self {
        Self {
            name: "large".to_string(),
            width: 1440,
            height: 1920,
            padding_top: 55,
            padding_bottom: 90,
            padding_sides: 50,
            merge_threshold: 0.35,
        }
    }

    pub fn content_width(&self) -> u32 {
        self.width.saturating_sub(self.padding_sides * 2)
    }

    pub fn content_height(&self) -> u32 {
        self.height
            .saturating_sub(self.padding_top + self.padding_bottom)
    }
}

/// Immutable lookup table of page-size presets, keyed by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSizeTable {
    profiles: Vec<PageSizeProfile>,
}

impl PageSizeTable {
    pub fn new(profiles: Vec<PageSizeProfile>) -> Self {
        Self { profiles }
    }

    /// The three built-in presets: small, medium and large.
    pub fn builtin() -> Self {
        Self::new(vec![
            PageSizeProfile::small(),
            PageSizeProfile::medium(),
            PageSizeProfile::large(),
        ])
    }

    /// Looks up a preset by name (case-insensitive).
    pub fn get(&self, name: &str) -> Result<&PageSizeProfile, LayoutError> {
        let wanted = name.trim();
        self.profiles
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| LayoutError::UnknownPageSize {
                name: name.to_string(),
                known: self.names().join(", "),
            })
    }

    pub fn profiles(&self) -> &[PageSizeProfile] {
        &self.profiles
    }

    pub fn names(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }
}

impl Default for PageSizeTable {
    fn default() -> Self {
        Self::builtin()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font scale
// ────────────────────────────────────────────────────────────────────────────

/// Base font size; every height and glyph-width constant scales with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontScaleConfig {
    base_font_size_px: u32,
}

impl FontScaleConfig {
    pub fn new(base_font_size_px: u32) -> Result<Self, LayoutError> {
        if !(MIN_FONT_SIZE_PX..=MAX_FONT_SIZE_PX).contains(&base_font_size_px) {
            return Err(LayoutError::FontSizeOutOfRange {
                px: base_font_size_px,
                min: MIN_FONT_SIZE_PX,
                max: MAX_FONT_SIZE_PX,
            });
        }
        Ok(Self { base_font_size_px })
    }

    pub fn base_font_size_px(&self) -> u32 {
        self.base_font_size_px
    }

    /// `base_font_size_px / 18`.
    pub fn ratio(&self) -> f32 {
        self.base_font_size_px as f32 / REFERENCE_FONT_SIZE_PX as f32
    }
}

impl Default for FontScaleConfig {
    fn default() -> Self {
        Self {
            base_font_size_px: REFERENCE_FONT_SIZE_PX,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Height table
// ────────────────────────────────────────────────────────────────────────────

/// Per-element pixel constants used by the height model.
///
/// The reference table describes an 18px base font. Use [`HeightTable::scaled`]
/// to derive the table for any other size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightTable {
    /// `h1` through `h6`, heading block height excluding the trailing margin.
    pub heading: [u32; 6],
    pub paragraph_base: u32,
    /// One rendered text line at line-height 1.8.
    pub paragraph_line: u32,
    pub list_item: u32,
    pub code_base: u32,
    pub code_line: u32,
    pub blockquote_base: u32,
    pub blockquote_line: u32,
    pub table_header: u32,
    pub table_row: u32,
    pub rule: u32,
    /// Bottom margin added after most block elements.
    pub margin: u32,
    /// Advance width of a CJK / wide glyph.
    pub wide_glyph: u32,
    /// Advance width of a Latin / narrow glyph.
    pub narrow_glyph: u32,
}

pub const REFERENCE_HEIGHTS: HeightTable = HeightTable {
    heading: [85, 68, 58, 48, 43, 38],
    paragraph_base: 20,
    paragraph_line: 26,
    list_item: 32,
    code_base: 35,
    code_line: 22,
    blockquote_base: 55,
    blockquote_line: 26,
    table_header: 42,
    table_row: 38,
    rule: 30,
    margin: 18,
    wide_glyph: 15,
    narrow_glyph: 8,
};

impl HeightTable {
    /// Multiplies every constant by `ratio`, truncating to whole pixels.
    ///
    /// Divisors (glyph widths and line height) never drop below 1px.
    pub fn scaled(&self, ratio: f32) -> Self {
        let s = |v: u32| (v as f32 * ratio) as u32;
        Self {
            heading: self.heading.map(s),
            paragraph_base: s(self.paragraph_base),
            paragraph_line: s(self.paragraph_line).max(1),
            list_item: s(self.list_item),
            code_base: s(self.code_base),
            code_line: s(self.code_line),
            blockquote_base: s(self.blockquote_base),
            blockquote_line: s(self.blockquote_line),
            table_header: s(self.table_header),
            table_row: s(self.table_row),
            rule: s(self.rule),
            margin: s(self.margin),
            wide_glyph: s(self.wide_glyph).max(1),
            narrow_glyph: s(self.narrow_glyph).max(1),
        }
    }
}

impl Default for HeightTable {
    fn default() -> Self {
        REFERENCE_HEIGHTS
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Layout context
// ────────────────────────────────────────────────────────────────────────────

/// Immutable snapshot of the active configuration, passed explicitly into
/// every pipeline function. `heights` is already scaled to `font`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutContext {
    pub profile: PageSizeProfile,
    pub font: FontScaleConfig,
    pub heights: HeightTable,
}

impl LayoutContext {
    pub fn new(profile: PageSizeProfile, font: FontScaleConfig, reference: &HeightTable) -> Self {
        Self {
            heights: reference.scaled(font.ratio()),
            profile,
            font,
        }
    }

    pub fn content_width(&self) -> u32 {
        self.profile.content_width()
    }

    pub fn content_height(&self) -> u32 {
        self.profile.content_height()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
