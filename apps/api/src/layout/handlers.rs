//! Axum route handlers for the Pagination API.
//!
//! Each handler clones the active `Paginator` under a short read lock, then
//! runs the CPU-bound pipeline on that clone through
//! `tokio::task::spawn_blocking` with owned inputs.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::layout::diagnostics::PageDiagnostics;
use crate::layout::engine::{PageInfo, Pagination};
use crate::layout::profile::PageSizeProfile;
use crate::layout::Paginator;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PaginateRequest {
    pub markup: String,
    /// Run the short-page merge pass. Defaults to true.
    #[serde(default = "default_optimize")]
    pub optimize: bool,
}

fn default_optimize() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct DebugRequest {
    pub markup: String,
}

#[derive(Debug, Serialize)]
pub struct DebugResponse {
    pub page_info: PageInfo,
    pub pages: Vec<PageDiagnostics>,
}

#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    pub pages: Vec<String>,
    /// 0-based indices of pages that start right after a forced break.
    #[serde(default)]
    pub forced_break_pages: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct OptimizeResponse {
    pub pages: Vec<String>,
    pub page_count: usize,
}

#[derive(Debug, Serialize)]
pub struct PresetView {
    #[serde(flatten)]
    pub profile: PageSizeProfile,
    pub content_width: u32,
    pub content_height: u32,
}

#[derive(Debug, Serialize)]
pub struct PresetsResponse {
    pub presets: Vec<PresetView>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub page_size: Option<String>,
    pub font_size_px: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub page_size: String,
    pub font_size_px: u32,
    pub page_info: PageInfo,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/presets
pub async fn handle_list_presets(State(state): State<AppState>) -> Json<PresetsResponse> {
    let paginator = state.paginator.read().await;
    let presets = paginator
        .presets()
        .profiles()
        .iter()
        .map(|p| PresetView {
            content_width: p.content_width(),
            content_height: p.content_height(),
            profile: p.clone(),
        })
        .collect();
    Json(PresetsResponse { presets })
}

/// GET /api/v1/settings
pub async fn handle_get_settings(State(state): State<AppState>) -> Json<SettingsResponse> {
    Json(settings_response(&snapshot(&state).await))
}

/// PUT /api/v1/settings
///
/// Validates every supplied field before applying any of them, so a rejected
/// request leaves the active configuration untouched.
pub async fn handle_update_settings(
    State(state): State<AppState>,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>, AppError> {
    let mut paginator = state.paginator.write().await;
    let mut updated = paginator.clone();
    if let Some(name) = request.page_size.as_deref() {
        updated.set_page_size(name)?;
    }
    if let Some(px) = request.font_size_px {
        updated.set_font_size(px)?;
    }
    *paginator = updated;

    info!(
        page_size = %paginator.page_size().name,
        font_size_px = paginator.font().base_font_size_px(),
        "Pagination settings updated"
    );
    Ok(Json(settings_response(&paginator)))
}

/// POST /api/v1/paginate
///
/// Splits markup into page fragments under the active settings.
pub async fn handle_paginate(
    State(state): State<AppState>,
    Json(request): Json<PaginateRequest>,
) -> Result<Json<Pagination>, AppError> {
    check_markup_size(request.markup.len(), state.config.max_markup_bytes)?;

    let paginator = snapshot(&state).await;
    let PaginateRequest { markup, optimize } = request;
    let pagination =
        run_blocking("pagination", move || paginator.paginate(&markup, optimize)).await?;

    Ok(Json(pagination))
}

/// POST /api/v1/paginate/debug
///
/// Per-page fill diagnostics for calibration; not meant for production flow.
pub async fn handle_debug_paginate(
    State(state): State<AppState>,
    Json(request): Json<DebugRequest>,
) -> Result<Json<DebugResponse>, AppError> {
    check_markup_size(request.markup.len(), state.config.max_markup_bytes)?;

    let paginator = snapshot(&state).await;
    let info = paginator.page_info();
    let markup = request.markup;
    let pages =
        run_blocking("debug pagination", move || paginator.debug_pagination(&markup)).await?;

    Ok(Json(DebugResponse {
        page_info: info,
        pages,
    }))
}

/// POST /api/v1/pages/optimize
///
/// Re-measures previously produced fragments and merges short pages.
pub async fn handle_optimize_pages(
    State(state): State<AppState>,
    Json(request): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, AppError> {
    let total: usize = request.pages.iter().map(String::len).sum();
    check_markup_size(total, state.config.max_markup_bytes)?;

    let paginator = snapshot(&state).await;
    let OptimizeRequest {
        pages,
        forced_break_pages,
    } = request;
    let pages = run_blocking("page optimization", move || {
        paginator.optimize_fragments(&pages, &forced_break_pages)
    })
    .await??;

    Ok(Json(OptimizeResponse {
        page_count: pages.len(),
        pages,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

async fn snapshot(state: &AppState) -> Paginator {
    state.paginator.read().await.clone()
}

fn settings_response(paginator: &Paginator) -> SettingsResponse {
    SettingsResponse {
        page_size: paginator.page_size().name.clone(),
        font_size_px: paginator.font().base_font_size_px(),
        page_info: paginator.page_info(),
    }
}

fn check_markup_size(len: usize, limit: usize) -> Result<(), AppError> {
    if len > limit {
        return Err(AppError::Validation(format!(
            "markup is {len} bytes; the limit is {limit} bytes"
        )));
    }
    Ok(())
}

/// Runs CPU-bound layout work off the async executor.
async fn run_blocking<T, F>(what: &'static str, work: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in {what}: {e}")))
}
