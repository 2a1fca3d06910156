use std::collections::HashSet;

use contracts::dashboards::d402_client_heatmap::MapCenter;
use contracts::domain::a002_rfv_entry::aggregate::RfvSummary;
use contracts::domain::a004_client_geoloc::aggregate::ClientGeoloc;

use crate::dashboards::d401_rfv_overview::service::summaries_by_codes;
use crate::shared::data::{AnalyticsStore, StoreResult};
use crate::shared::geo::{clients_within, map_center, NEARBY_RADIUS_KM};

/// Больше этого числа клиентов показывается одной сводной записью
pub const MAX_DETAILED_CLIENTS: usize = 5;

/// Точки карты; при `rfv_only` только клиенты, которые есть в таблице RFV
pub async fn list_points(
    store: &dyn AnalyticsStore,
    rfv_only: bool,
) -> StoreResult<Vec<ClientGeoloc>> {
    let points = store.geolocations().await?;
    if !rfv_only {
        return Ok(points);
    }

    let codes: HashSet<String> = store.rfv_codes().await?.into_iter().collect();
    if codes.is_empty() {
        return Ok(Vec::new());
    }

    Ok(points
        .into_iter()
        .filter(|p| p.client_id.as_ref().is_some_and(|id| codes.contains(id)))
        .collect())
}

pub async fn center(store: &dyn AnalyticsStore, rfv_only: bool) -> StoreResult<MapCenter> {
    let points = list_points(store, rfv_only).await?;
    let (lat, lon) = map_center(&points);
    Ok(MapCenter {
        lat,
        lon,
        point_count: points.len(),
    })
}

/// Клиенты в радиусе 500 м от точки клика
pub async fn find_nearby_clients(
    store: &dyn AnalyticsStore,
    lat: f64,
    lon: f64,
    rfv_only: bool,
) -> StoreResult<Vec<RfvSummary>> {
    let points = list_points(store, rfv_only).await?;
    let nearby = clients_within(&points, lat, lon, NEARBY_RADIUS_KM);

    let codes: Vec<String> = nearby
        .iter()
        .filter_map(|p| p.client_id.clone())
        .filter(|c| !c.is_empty())
        .collect();
    if codes.is_empty() {
        return Ok(Vec::new());
    }

    let summaries = summaries_by_codes(store, &codes).await?;
    if summaries.len() > MAX_DETAILED_CLIENTS {
        return Ok(vec![area_summary(&summaries)]);
    }
    Ok(summaries)
}

fn area_summary(summaries: &[RfvSummary]) -> RfvSummary {
    RfvSummary {
        code: String::new(),
        company_name: Some(format!("{} clientes nesta área", summaries.len())),
        seller_name: None,
        revenue_total: Some(summaries.iter().filter_map(|s| s.revenue_total).sum()),
        average_ticket: Some(0.0),
        recency: Some(0),
        frequency: Some(0),
        value: Some(0),
        status: None,
        classification: None,
        description: None,
    }
}
