pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::layout::handlers;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    // JSON escaping can roughly double the encoded size of a markup string.
    let body_limit = state.config.max_markup_bytes.saturating_mul(2);

    Router::new()
        .route("/health", get(health::health_handler))
        // Configuration surface
        .route("/api/v1/presets", get(handlers::handle_list_presets))
        .route(
            "/api/v1/settings",
            get(handlers::handle_get_settings).put(handlers::handle_update_settings),
        )
        // Pagination
        .route("/api/v1/paginate", post(handlers::handle_paginate))
        .route(
            "/api/v1/paginate/debug",
            post(handlers::handle_debug_paginate),
        )
        .route(
            "/api/v1/pages/optimize",
            post(handlers::handle_optimize_pages),
        )
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
