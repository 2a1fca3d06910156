use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use contracts::dashboards::d402_client_heatmap::{GeolocQuery, MapCenter, NearbyClientsRequest};
use contracts::domain::a002_rfv_entry::aggregate::RfvSummary;
use contracts::domain::a004_client_geoloc::aggregate::ClientGeoloc;
use contracts::shared::api::ApiEnvelope;

use crate::dashboards::d402_client_heatmap::service;
use crate::shared::error::ApiResult;
use crate::state::AppState;

/// GET /api/geoloc
pub async fn list_points(
    State(state): State<AppState>,
    query: Result<Query<GeolocQuery>, QueryRejection>,
) -> ApiResult<Json<ApiEnvelope<Vec<ClientGeoloc>>>> {
    let Query(query) = query?;
    let points = service::list_points(state.store.as_ref(), query.rfv).await?;
    Ok(Json(ApiEnvelope::new(points)))
}

/// GET /api/geoloc/center
pub async fn center(
    State(state): State<AppState>,
    query: Result<Query<GeolocQuery>, QueryRejection>,
) -> ApiResult<Json<ApiEnvelope<MapCenter>>> {
    let Query(query) = query?;
    let center = service::center(state.store.as_ref(), query.rfv).await?;
    Ok(Json(ApiEnvelope::new(center)))
}

/// POST /api/geoloc/nearby
pub async fn nearby(
    State(state): State<AppState>,
    request: Result<Json<NearbyClientsRequest>, JsonRejection>,
) -> ApiResult<Json<ApiEnvelope<Vec<RfvSummary>>>> {
    let Json(request) = request?;
    let clients =
        service::find_nearby_clients(state.store.as_ref(), request.lat, request.lon, request.rfv)
            .await?;
    Ok(Json(ApiEnvelope::new(clients)))
}
