//! Page packer: greedy, order-preserving assignment of elements to pages.
//!
//! # Placement rules
//! Each element is handled according to its [`Placement`]:
//! - `Break`        → close the current page (even when empty); the next page
//!   is marked as following a forced break.
//! - `KeepWithNext` → headings; placed only if at least `KEEP_WITH_NEXT_PX`
//!   remains below them, otherwise retried on a fresh page.
//! - `Splittable`   → plain paragraphs; when they do not fit, the splitter
//!   fills the remaining space and the tail is queued for a fresh page.
//! - `Atomic`       → everything else; moves to a fresh page when it does not fit.
//!
//! An element taller than a whole page is placed alone on its own page. This
//! is the only overflow the packer allows and it keeps the loop advancing.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::layout::element::{ContentElement, ElementKind, Page};
use crate::layout::profile::{LayoutContext, KEEP_WITH_NEXT_PX};
use crate::layout::splitter::try_split;

/// How the packer treats an element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Break,
    KeepWithNext,
    Splittable,
    Atomic,
}

fn placement(kind: ElementKind) -> Placement {
    match kind {
        ElementKind::ForcedBreak => Placement::Break,
        ElementKind::Heading { .. } => Placement::KeepWithNext,
        ElementKind::Paragraph => Placement::Splittable,
        ElementKind::ParagraphWithImages { .. }
        | ElementKind::List { .. }
        | ElementKind::Code { .. }
        | ElementKind::Blockquote
        | ElementKind::Table { .. }
        | ElementKind::Image
        | ElementKind::Rule
        | ElementKind::PlainText
        | ElementKind::Unclassified => Placement::Atomic,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Page builder
// ────────────────────────────────────────────────────────────────────────────

/// The page under construction plus the pages already closed.
struct PageBuilder {
    capacity: u32,
    current: Page,
    used: u32,
    pages: Vec<Page>,
}

impl PageBuilder {
    fn new(capacity: u32) -> Self {
        Self {
            capacity,
            current: Page::default(),
            used: 0,
            pages: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    fn fits(&self, height: u32) -> bool {
        self.used.saturating_add(height) <= self.capacity
    }

    fn remaining_after(&self, height: u32) -> u32 {
        self.capacity
            .saturating_sub(self.used.saturating_add(height))
    }

    fn available(&self) -> u32 {
        self.capacity.saturating_sub(self.used)
    }

    fn place(&mut self, element: ContentElement) {
        self.used = self.used.saturating_add(element.height());
        self.current.push(element);
    }

    /// Emits the current page, even an empty one, and starts the next.
    fn close(&mut self, next_follows_break: bool) {
        let page = std::mem::replace(&mut self.current, Page::new(Vec::new(), next_follows_break));
        self.pages.push(page);
        self.used = 0;
    }

    /// Emits the current page only if it has content.
    fn close_if_started(&mut self) {
        if !self.is_empty() {
            self.close(false);
        }
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.current.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Public entry point
// ────────────────────────────────────────────────────────────────────────────

/// Packs `elements` into pages no taller than `ctx.content_height()`.
///
/// Order is preserved exactly. Forced-break markers are consumed: they end a
/// page and set `follows_forced_break` on the page that starts after them.
pub fn pack(elements: Vec<ContentElement>, ctx: &LayoutContext) -> Vec<Page> {
    let capacity = ctx.content_height();
    let element_count = elements.len();
    let mut queue: VecDeque<ContentElement> = elements.into();
    let mut builder = PageBuilder::new(capacity);
    let mut splits = 0usize;
    let mut oversized = 0usize;

    while let Some(element) = queue.pop_front() {
        let height = element.height();

        match placement(element.kind()) {
            Placement::Break => {
                builder.close(true);
                continue;
            }
            Placement::KeepWithNext if builder.fits(height) => {
                if builder.remaining_after(height) < KEEP_WITH_NEXT_PX && !builder.is_empty() {
                    builder.close(false);
                    queue.push_front(element);
                } else {
                    builder.place(element);
                }
                continue;
            }
            _ if builder.fits(height) => {
                builder.place(element);
                continue;
            }
            Placement::Splittable => {
                if let Some((first, rest)) = try_split(&element, builder.available(), ctx) {
                    splits += 1;
                    builder.place(first);
                    builder.close(false);
                    queue.push_front(rest);
                    continue;
                }
            }
            Placement::KeepWithNext | Placement::Atomic => {}
        }

        // Does not fit and was not split.
        if !builder.is_empty() {
            builder.close(false);
            queue.push_front(element);
        } else {
            if height > capacity {
                oversized += 1;
                warn!(
                    kind = element.kind().name(),
                    height,
                    capacity,
                    "Element taller than page content area, placing alone"
                );
            }
            builder.place(element);
            builder.close_if_started();
        }
    }

    let pages = builder.finish();
    debug!(
        elements = element_count,
        pages = pages.len(),
        splits,
        oversized,
        "Packed elements into pages"
    );
    pages
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
