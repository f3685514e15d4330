use axum::{Json, extract::State};
use std::sync::Arc;
use tracing::info;

use crate::services::{BatchResult, BatchSearchRequest, SearchRequest, SearchResult};

use super::{ApiError, ApiResponse, AppState, validation};

/// # Endpoint
///
/// `POST /api/search`
pub async fn search_components(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<ApiResponse<SearchResult>>, ApiError> {
    validation::validate_search_term(&request.search_term)?;
    validation::validate_limit_per_source(request.limit_per_source)?;

    info!(
        "searching '{}' in '{}' across {:?}",
        request.search_term, request.category, request.sources
    );

    let result = state.search_service().search(request).await?;

    Ok(Json(ApiResponse::success(result)))
}

/// # Endpoint
///
/// `POST /api/search/batch`
pub async fn search_batch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchSearchRequest>,
) -> Result<Json<ApiResponse<BatchResult>>, ApiError> {
    let batch = state.batch_service().search_many(request.searches).await;

    Ok(Json(ApiResponse::success(batch)))
}
