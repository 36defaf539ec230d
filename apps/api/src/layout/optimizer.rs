//! Page optimizer: merges abnormally short pages into their successor.
//!
//! A single forward scan. A page filled below the profile's merge threshold
//! absorbs the next page when:
//! - the next page does not start right after a forced break,
//! - neither page is blank (blank pages are intentional and kept),
//! - the merged height stays within `MERGE_SAFETY_FRACTION` of capacity.
//!
//! A merged page that is still under-filled is reconsidered against its new
//! successor, one pair at a time.

use tracing::debug;

use crate::layout::element::Page;
use crate::layout::profile::{LayoutContext, MERGE_SAFETY_FRACTION};

/// Merges under-filled pages with their successors where safe.
pub fn optimize(pages: Vec<Page>, ctx: &LayoutContext) -> Vec<Page> {
    if pages.len() <= 1 {
        return pages;
    }

    let limits = MergeLimits::for_context(ctx);
    let before = pages.len();
    let mut optimized = Vec::with_capacity(before);
    let mut iter = pages.into_iter().peekable();

    while let Some(mut page) = iter.next() {
        while let Some(next) = iter.next_if(|next| limits.should_merge(&page, next)) {
            page.absorb(next);
        }
        optimized.push(page);
    }

    debug!(
        before,
        after = optimized.len(),
        merged = before - optimized.len(),
        "Optimized page sequence"
    );
    optimized
}

/// Pixel thresholds derived once per run from the active profile.
#[derive(Debug, Clone, Copy)]
struct MergeLimits {
    under_filled_below: f32,
    merged_at_most: f32,
}

impl MergeLimits {
    fn for_context(ctx: &LayoutContext) -> Self {
        let capacity = ctx.content_height() as f32;
        Self {
            under_filled_below: capacity * ctx.profile.merge_threshold,
            merged_at_most: capacity * MERGE_SAFETY_FRACTION,
        }
    }

    fn should_merge(&self, page: &Page, next: &Page) -> bool {
        if page.is_empty() || next.is_empty() || next.follows_forced_break() {
            return false;
        }
        let height = page.height() as f32;
        height < self.under_filled_below
            && height + next.height() as f32 <= self.merged_at_most
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
