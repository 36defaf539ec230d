//! Pagination engine: the configuration surface over the layout pipeline.
//!
//! [`Paginator`] owns the active page-size profile and font scale. Every
//! pipeline run works from an immutable [`LayoutContext`] snapshot taken at
//! its start. The paginator does no locking of its own; callers that share
//! one serialize access to it, or clone it and run the clone elsewhere.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::classifier::classify;
use crate::layout::diagnostics::{analyze_pages, PageDiagnostics};
use crate::layout::element::Page;
use crate::layout::error::LayoutError;
use crate::layout::optimizer::optimize;
use crate::layout::packer::pack;
use crate::layout::profile::{
    FontScaleConfig, HeightTable, LayoutContext, PageSizeProfile, PageSizeTable,
    REFERENCE_HEIGHTS,
};

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// Canvas geometry for the style collaborator that wraps each fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page_size: String,
    pub page_width: u32,
    pub page_height: u32,
    pub content_width: u32,
    pub content_height: u32,
    pub padding_top: u32,
    pub padding_bottom: u32,
    pub padding_sides: u32,
    pub font_size_px: u32,
}

/// Page fragments plus the 0-based indices of pages that start right after a
/// forced break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub pages: Vec<String>,
    pub page_count: usize,
    pub forced_break_pages: Vec<usize>,
}

impl Pagination {
    pub fn from_pages(pages: &[Page]) -> Self {
        Self {
            pages: pages.iter().map(Page::to_markup).collect(),
            page_count: pages.len(),
            forced_break_pages: forced_break_indices(pages),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Paginator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Paginator {
    presets: PageSizeTable,
    reference: HeightTable,
    profile: PageSizeProfile,
    font: FontScaleConfig,
}

impl Paginator {
    /// Builds a paginator with `page_size` and `font_size_px` active.
    pub fn new(
        presets: PageSizeTable,
        reference: HeightTable,
        page_size: &str,
        font_size_px: u32,
    ) -> Result<Self, LayoutError> {
        let profile = presets.get(page_size)?.clone();
        let font = FontScaleConfig::new(font_size_px)?;
        Ok(Self {
            presets,
            reference,
            profile,
            font,
        })
    }

    pub fn presets(&self) -> &PageSizeTable {
        &self.presets
    }

    pub fn page_size(&self) -> &PageSizeProfile {
        &self.profile
    }

    pub fn font(&self) -> FontScaleConfig {
        self.font
    }

    /// Switches to a named preset. On error the active profile is unchanged.
    pub fn set_page_size(&mut self, name: &str) -> Result<(), LayoutError> {
        self.profile = self.presets.get(name)?.clone();
        debug!(page_size = %self.profile.name, "Page size changed");
        Ok(())
    }

    /// Changes the base font size. On error the active scale is unchanged.
    pub fn set_font_size(&mut self, px: u32) -> Result<(), LayoutError> {
        self.font = FontScaleConfig::new(px)?;
        debug!(font_size_px = px, "Font size changed");
        Ok(())
    }

    /// Immutable snapshot of the active configuration with scaled heights.
    pub fn context(&self) -> LayoutContext {
        LayoutContext::new(self.profile.clone(), self.font, &self.reference)
    }

    pub fn page_info(&self) -> PageInfo {
        let p = &self.profile;
        PageInfo {
            page_size: p.name.clone(),
            page_width: p.width,
            page_height: p.height,
            content_width: p.content_width(),
            content_height: p.content_height(),
            padding_top: p.padding_top,
            padding_bottom: p.padding_bottom,
            padding_sides: p.padding_sides,
            font_size_px: self.font.base_font_size_px(),
        }
    }

    /// Full pipeline returning one markup fragment per page. Empty or
    /// whitespace-only input yields no pages.
    pub fn paginate(&self, markup: &str, optimize_pass: bool) -> Pagination {
        Pagination::from_pages(&self.layout(markup, optimize_pass))
    }

    pub fn optimize_pages(&self, pages: Vec<Page>) -> Vec<Page> {
        optimize(pages, &self.context())
    }

    /// Runs the optimizer over fragments produced earlier.
    ///
    /// Each fragment is re-classified so it is measured under the active
    /// configuration, which may differ from the one it was packed with.
    pub fn optimize_fragments(
        &self,
        fragments: &[String],
        forced_break_pages: &[usize],
    ) -> Result<Vec<String>, LayoutError> {
        if let Some(&index) = forced_break_pages.iter().find(|&&i| i >= fragments.len()) {
            return Err(LayoutError::PageIndexOutOfRange {
                index,
                page_count: fragments.len(),
            });
        }

        let ctx = self.context();
        let pages: Vec<Page> = fragments
            .iter()
            .enumerate()
            .map(|(i, fragment)| {
                Page::new(classify(fragment, &ctx), forced_break_pages.contains(&i))
            })
            .collect();

        Ok(self.optimize_pages(pages).iter().map(Page::to_markup).collect())
    }

    /// Per-page diagnostics for the pages `paginate` would produce.
    pub fn debug_pagination(&self, markup: &str) -> Vec<PageDiagnostics> {
        analyze_pages(&self.layout(markup, true), &self.context())
    }

    /// Classify → pack → (optionally) optimize, all under one snapshot.
    fn layout(&self, markup: &str, optimize_pass: bool) -> Vec<Page> {
        let ctx = self.context();
        let pages = pack(classify(markup, &ctx), &ctx);
        if optimize_pass {
            optimize(pages, &ctx)
        } else {
            pages
        }
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            presets: PageSizeTable::builtin(),
            reference: REFERENCE_HEIGHTS,
            profile: PageSizeProfile::medium(),
            font: FontScaleConfig::default(),
        }
    }
}

/// 0-based indices of pages that begin right after a forced break.
fn forced_break_indices(pages: &[Page]) -> Vec<usize> {
    pages
        .iter()
        .enumerate()
        .filter(|(_, p)| p.follows_forced_break())
        .map(|(i, _)| i)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
