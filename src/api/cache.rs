//! Cache administration endpoints.

use axum::{Json, extract::State};
use std::sync::Arc;

use super::types::CacheClearDto;
use super::{ApiError, ApiResponse, AppState};
use crate::db::CacheStats;

/// Returns component cache statistics.
///
/// # Endpoint
/// `GET /api/cache/status`
///
/// Reports row counts split into live and expired, plus per-category and
/// per-source breakdowns.
pub async fn get_cache_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<CacheStats>>, ApiError> {
    let stats = state
        .store()
        .component_cache_stats()
        .await
        .map_err(|e| ApiError::database(e.to_string()))?;

    Ok(Json(ApiResponse::success(stats)))
}

/// Deletes expired rows from the component cache.
///
/// # Endpoint
/// `POST /api/cache/clear`
///
/// Live rows are left alone; they age out on their own once `expires_at`
/// passes, and lookups already skip them after that point.
pub async fn clear_cache(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<CacheClearDto>>, ApiError> {
    let deleted_count = state
        .store()
        .sweep_expired_components()
        .await
        .map_err(|e| ApiError::database(e.to_string()))?;

    tracing::info!(deleted_count, "cleared expired component cache rows");

    Ok(Json(ApiResponse::success(CacheClearDto { deleted_count })))
}
