// Layout pagination engine.
// Pipeline: classify markup → pack into pages (splitting long paragraphs) → merge short pages.
// Everything below `handlers` is synchronous and pure over a `LayoutContext` snapshot.

pub mod classifier;
pub mod diagnostics;
pub mod element;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod optimizer;
pub mod packer;
pub mod profile;
pub mod splitter;

// Re-export the public API consumed by other modules (state, config, errors).
pub use engine::Paginator;
pub use error::LayoutError;
pub use profile::{PageSizeTable, DEFAULT_PAGE_SIZE, REFERENCE_FONT_SIZE_PX, REFERENCE_HEIGHTS};
