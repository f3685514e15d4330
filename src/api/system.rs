//! System API endpoints.

use axum::{Json, extract::State};
use chrono::Utc;
use std::sync::Arc;

use super::types::HealthDto;
use super::{ApiResponse, AppState};
use crate::clients::SourceAdapter;

/// Returns service health and upstream configuration status.
///
/// # Endpoint
/// `GET /api/health`
///
/// Reports `degraded` when the database ping fails; the search endpoints keep
/// working in that state because cache failures are treated as misses.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthDto>> {
    let database_connected = state.store().ping().await.is_ok();

    let status = if database_connected {
        "healthy"
    } else {
        "degraded"
    };

    Json(ApiResponse::success(HealthDto {
        status,
        timestamp: Utc::now().to_rfc3339(),
        database_connected,
        digikey_configured: state.digikey().is_configured(),
        mouser_configured: state.mouser().is_configured(),
    }))
}
