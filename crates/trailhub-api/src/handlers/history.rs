//! History handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use trailhub_core::error::AppError;
use trailhub_service::{
    GroupedHistory, PresentedDetail, PresentedFilterOptions, ViewerContext, present_detail,
    present_filter_options, present_groups,
};

use crate::dto::request::{HistoryQueryParams, RecordHistoryRequest, ViewerParams};
use crate::dto::response::{ApiFailure, ApiResponse, HistoryListResponse, RecordedResponse};
use crate::state::AppState;

/// POST /api/history
pub async fn record_history(
    State(state): State<AppState>,
    payload: Result<Json<RecordHistoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<RecordedResponse>>), AppError> {
    let Json(request) =
        payload.map_err(|e| AppError::validation(format!("Invalid request body: {e}")))?;

    let id = state.recorder.record(request.into_record()?).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(RecordedResponse { id }))))
}

/// GET /api/history
pub async fn list_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQueryParams>,
) -> Response {
    let viewer = state.viewer(params.tz.as_deref());
    let criteria = params.criteria();
    let has_active_filters = criteria.has_active_filters();

    let result = state.engine.find(&criteria, &viewer).await;
    list_response(result, &viewer, has_active_filters)
}

/// GET /api/history/entities/{entity_type}/{entity_id}
pub async fn entity_history(
    State(state): State<AppState>,
    Path((entity_type, entity_id)): Path<(String, String)>,
    Query(params): Query<ViewerParams>,
) -> Response {
    let viewer = state.viewer(params.tz.as_deref());
    let result = state
        .engine
        .entity_timeline(&entity_type, &entity_id, &viewer)
        .await;
    list_response(result, &viewer, false)
}

/// GET /api/history/filters
pub async fn filter_options(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PresentedFilterOptions>>, AppError> {
    let options = state.engine.filter_options().await?;
    Ok(Json(ApiResponse::ok(present_filter_options(&options))))
}

/// GET /api/history/{id}
pub async fn get_history_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<ViewerParams>,
) -> Result<Json<ApiResponse<PresentedDetail>>, AppError> {
    let viewer = state.viewer(params.tz.as_deref());
    let entry = state.engine.entry(id).await?;
    Ok(Json(ApiResponse::ok(present_detail(&entry, &viewer))))
}

/// Storage failures on list endpoints degrade to an empty result with an
/// error attached.
fn list_response(
    result: Result<GroupedHistory, AppError>,
    viewer: &ViewerContext,
    has_active_filters: bool,
) -> Response {
    match result {
        Ok(grouped) => Json(ApiResponse::ok(HistoryListResponse {
            groups: present_groups(&grouped, viewer),
            total: grouped.total,
            has_active_filters,
        }))
        .into_response(),
        Err(e) if e.is_storage() => {
            warn!(error = %e, "History query failed, returning empty result");
            let body = ApiFailure::new(
                HistoryListResponse {
                    has_active_filters,
                    ..HistoryListResponse::default()
                },
                e.to_body(),
            );
            (e.kind.status(), Json(body)).into_response()
        }
        Err(e) => e.into_response(),
    }
}
