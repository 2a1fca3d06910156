use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use contracts::dashboards::d401_rfv_overview::{
    ClassificationCount, RecencyFrequencyCount, RfvByCodesRequest, RfvFilterQuery, StatusCount,
    ValueCount,
};
use contracts::domain::a002_rfv_entry::aggregate::{RfvEntry, RfvSummary};
use contracts::shared::api::ApiEnvelope;

use crate::dashboards::d401_rfv_overview::service::{self, FilterSet};
use crate::shared::data::RfvQuery;
use crate::shared::error::{ApiError, ApiResult};
use crate::state::AppState;

fn parse_filters(raw: &RfvFilterQuery, filters: FilterSet) -> ApiResult<RfvQuery> {
    service::build_query(raw, filters).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// GET /api/rfv
pub async fn list_entries(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiEnvelope<Vec<RfvEntry>>>> {
    let rows = service::list_entries(state.store.as_ref()).await?;
    Ok(Json(ApiEnvelope::new(rows)))
}

/// GET /api/rfv/:id
pub async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiEnvelope<RfvEntry>>> {
    let id: i64 = id
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("ID inválido: {}", id)))?;
    let entry = service::get_entry(state.store.as_ref(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Registro não encontrado".into()))?;
    Ok(Json(ApiEnvelope::new(entry)))
}

/// GET /api/rfv/classification
pub async fn by_classification(
    State(state): State<AppState>,
    Query(raw): Query<RfvFilterQuery>,
) -> ApiResult<Json<ApiEnvelope<Vec<ClassificationCount>>>> {
    let query = parse_filters(&raw, FilterSet::FOR_CLASSIFICATION)?;
    let rows = state.store.rfv_entries(&query).await?;
    Ok(Json(ApiEnvelope::new(service::count_by_classification(&rows))))
}

/// GET /api/rfv/value
pub async fn by_value(
    State(state): State<AppState>,
    Query(raw): Query<RfvFilterQuery>,
) -> ApiResult<Json<ApiEnvelope<Vec<ValueCount>>>> {
    let query = parse_filters(&raw, FilterSet::FOR_VALUE)?;
    let rows = state.store.rfv_entries(&query).await?;
    Ok(Json(ApiEnvelope::new(service::count_by_value(&rows))))
}

/// GET /api/rfv/status
pub async fn by_status(
    State(state): State<AppState>,
    Query(raw): Query<RfvFilterQuery>,
) -> ApiResult<Json<ApiEnvelope<Vec<StatusCount>>>> {
    let query = parse_filters(&raw, FilterSet::FOR_STATUS)?;
    let rows = state.store.rfv_entries(&query).await?;
    Ok(Json(ApiEnvelope::new(service::count_by_status(&rows))))
}

/// GET /api/rfv/recency-frequency
pub async fn by_recency_frequency(
    State(state): State<AppState>,
    Query(raw): Query<RfvFilterQuery>,
) -> ApiResult<Json<ApiEnvelope<Vec<RecencyFrequencyCount>>>> {
    let query = parse_filters(&raw, FilterSet::ALL)?;
    let rows = state.store.rfv_entries(&query).await?;
    Ok(Json(ApiEnvelope::new(service::count_by_recency_frequency(
        &rows,
    ))))
}

/// POST /api/rfv/by-codigos
pub async fn by_codes(
    State(state): State<AppState>,
    request: Result<Json<RfvByCodesRequest>, JsonRejection>,
) -> ApiResult<Json<ApiEnvelope<Vec<RfvSummary>>>> {
    let Json(request) = request?;
    let rows = service::summaries_by_codes(state.store.as_ref(), &request.codigos).await?;
    Ok(Json(ApiEnvelope::new(rows)))
}
