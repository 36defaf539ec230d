//! Pagination diagnostics: per-page fill analysis for calibration tooling.
//!
//! Reports what the packer decided and how full each page is estimated to be.
//! Nothing here feeds back into pagination.
//!
//! # Fill verdicts
//! - fill > 100%                 → `Overflow` (a lone oversized element)
//! - fill < profile merge threshold → `UnderFilled`
//! - otherwise                   → `Acceptable`

use serde::{Deserialize, Serialize};

use crate::layout::element::{ContentElement, Page};
use crate::layout::profile::LayoutContext;

/// Characters of element text shown in a preview.
const PREVIEW_CHARS: usize = 50;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillVerdict {
    Acceptable,
    /// Below the merge threshold; the optimizer would try to merge it.
    UnderFilled,
    /// Taller than the content area.
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDiagnostic {
    #[serde(rename = "type")]
    pub kind: String,
    pub height: u32,
    pub text_preview: String,
    /// Code block long enough to be cut by line count.
    pub long_code: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDiagnostics {
    /// 1-based.
    pub page_index: usize,
    pub element_count: usize,
    pub total_height: u32,
    pub capacity: u32,
    /// `total_height / capacity`.
    pub fill_fraction: f32,
    /// Fill as a percentage with one decimal, e.g. `"87.5%"`.
    pub fill_rate: String,
    pub follows_forced_break: bool,
    pub verdict: FillVerdict,
    pub elements: Vec<ElementDiagnostic>,
}

// ────────────────────────────────────────────────────────────────────────────
// Core functions
// ────────────────────────────────────────────────────────────────────────────

/// Analyzes every page in order.
pub fn analyze_pages(pages: &[Page], ctx: &LayoutContext) -> Vec<PageDiagnostics> {
    pages
        .iter()
        .enumerate()
        .map(|(i, page)| analyze_page(i + 1, page, ctx))
        .collect()
}

pub fn analyze_page(page_index: usize, page: &Page, ctx: &LayoutContext) -> PageDiagnostics {
    let capacity = ctx.content_height();
    let total_height = page.height();
    let fill_fraction = total_height as f32 / capacity.max(1) as f32;

    let verdict = if fill_fraction > 1.0 {
        FillVerdict::Overflow
    } else if fill_fraction < ctx.profile.merge_threshold {
        FillVerdict::UnderFilled
    } else {
        FillVerdict::Acceptable
    };

    PageDiagnostics {
        page_index,
        element_count: page.elements().len(),
        total_height,
        capacity,
        fill_fraction,
        fill_rate: format!("{:.1}%", fill_fraction * 100.0),
        follows_forced_break: page.follows_forced_break(),
        verdict,
        elements: page.elements().iter().map(describe).collect(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn describe(element: &ContentElement) -> ElementDiagnostic {
    ElementDiagnostic {
        kind: element.kind().name().to_string(),
        height: element.height(),
        text_preview: text_preview(element.text()),
        long_code: element.kind().is_long_code(),
    }
}

fn text_preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
