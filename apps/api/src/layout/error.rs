use thiserror::Error;

/// Errors raised by the engine's configuration surface.
///
/// Pagination itself never fails: malformed markup degrades to text extraction
/// and oversized elements are placed alone. Only configuration changes and
/// caller-supplied page indices can be rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("Unknown page size '{name}' (expected one of: {known})")]
    UnknownPageSize { name: String, known: String },

    #[error("Font size {px}px is outside the supported range {min}..={max}px")]
    FontSizeOutOfRange { px: u32, min: u32, max: u32 },

    #[error("Forced-break page index {index} is out of range for {page_count} pages")]
    PageIndexOutOfRange { index: usize, page_count: usize },
}
