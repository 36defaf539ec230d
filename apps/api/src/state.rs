use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::layout::{LayoutError, PageSizeTable, Paginator, REFERENCE_HEIGHTS};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Active page size and font scale. Handlers snapshot a `LayoutContext`
    /// under the read lock and release it before paginating.
    pub paginator: Arc<RwLock<Paginator>>,
}

impl AppState {
    /// Builds state with the configured default page size and font.
    pub fn new(config: Config) -> Result<Self, LayoutError> {
        let paginator = Paginator::new(
            PageSizeTable::builtin(),
            REFERENCE_HEIGHTS,
            &config.default_page_size,
            config.default_font_size_px,
        )?;
        Ok(Self {
            config,
            paginator: Arc::new(RwLock::new(paginator)),
        })
    }
}
