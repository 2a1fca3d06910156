use axum::{
    extract::{Path, Query, State},
    Json,
};
use contracts::dashboards::d400_seller_performance::{
    PortfolioQuery, SellerInsight, SellerListQuery, SellerMetricsDetail, SellerWithMetrics,
};
use contracts::domain::a002_rfv_entry::aggregate::RfvEntry;
use contracts::shared::api::ApiEnvelope;

use super::today;
use crate::dashboards::d400_seller_performance::service;
use crate::shared::error::{ApiError, ApiResult};
use crate::state::AppState;

const SELLER_NOT_FOUND: &str = "Vendedor não encontrado";

/// GET /api/sellers
pub async fn list_sellers(
    State(state): State<AppState>,
    Query(query): Query<SellerListQuery>,
) -> ApiResult<Json<ApiEnvelope<Vec<SellerWithMetrics>>>> {
    let items = service::list_sellers(state.store.clone(), &query, today()).await?;
    Ok(Json(ApiEnvelope::new(items)))
}

/// GET /api/sellers/:id/metrics
pub async fn get_seller_metrics(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiEnvelope<SellerMetricsDetail>>> {
    let detail = service::get_seller_metrics(state.store.as_ref(), &id, today())
        .await?
        .ok_or_else(|| ApiError::NotFound(SELLER_NOT_FOUND.into()))?;
    Ok(Json(ApiEnvelope::new(detail)))
}

/// GET /api/sellers/:id/portfolio
pub async fn get_seller_portfolio(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PortfolioQuery>,
) -> ApiResult<Json<ApiEnvelope<Vec<RfvEntry>>>> {
    let rows = service::get_seller_portfolio(state.store.as_ref(), &id, &query)
        .await?
        .ok_or_else(|| ApiError::NotFound(SELLER_NOT_FOUND.into()))?;
    Ok(Json(ApiEnvelope::new(rows)))
}

/// GET /api/sellers/:id/insights
pub async fn get_seller_insights(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiEnvelope<Vec<SellerInsight>>>> {
    let insights = service::get_seller_insights(state.store.as_ref(), &id, today())
        .await?
        .ok_or_else(|| ApiError::NotFound(SELLER_NOT_FOUND.into()))?;
    Ok(Json(ApiEnvelope::new(insights)))
}
