use std::cmp::Ordering;
use std::sync::Arc;

use chrono::NaiveDate;
use contracts::dashboards::d400_seller_performance::{
    AvailabilityFilter, PortfolioQuery, SellerInsight, SellerListQuery, SellerMetrics,
    SellerMetricsDetail, SellerOrder, SellerWithMetrics,
};
use contracts::domain::a002_rfv_entry::aggregate::RfvEntry;
use contracts::domain::a003_seller::aggregate::SellerIdentity;

use super::insights::build_insights;
use super::metrics::{compute_seller_metrics, compute_seller_metrics_or_zero, MetricsError};
use crate::shared::data::{filter_value, AnalyticsStore, RfvQuery, StoreResult};

/// Список продавцов с метриками.
///
/// Метрики каждого продавца считаются в отдельной задаче; результат
/// собирается в порядке справочника, затем применяются фильтры списка.
pub async fn list_sellers(
    store: Arc<dyn AnalyticsStore>,
    query: &SellerListQuery,
    today: NaiveDate,
) -> StoreResult<Vec<SellerWithMetrics>> {
    let sellers = store.sellers().await?;

    let handles: Vec<_> = sellers
        .iter()
        .cloned()
        .map(|seller| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                compute_seller_metrics_or_zero(store.as_ref(), &seller, today).await
            })
        })
        .collect();

    let mut items = Vec::with_capacity(sellers.len());
    for (seller, handle) in sellers.iter().zip(handles) {
        let metrics = match handle.await {
            Ok(metrics) => metrics,
            Err(e) => {
                tracing::warn!("Metrics task for seller {} failed: {}", seller.id, e);
                SellerMetrics::zeroed()
            }
        };
        items.push(SellerWithMetrics {
            seller: SellerIdentity::from(seller),
            metrics,
        });
    }

    Ok(apply_list_filters(items, query))
}

pub fn apply_list_filters(
    mut items: Vec<SellerWithMetrics>,
    query: &SellerListQuery,
) -> Vec<SellerWithMetrics> {
    if let Some(search) = filter_value(query.search.as_deref()) {
        let needle = search.to_lowercase();
        items.retain(|i| i.seller.name.to_lowercase().contains(&needle));
    }

    match query.availability {
        AvailabilityFilter::All => {}
        AvailabilityFilter::Available => items.retain(|i| i.seller.available),
        AvailabilityFilter::Unavailable => items.retain(|i| !i.seller.available),
    }

    match query.order_by {
        SellerOrder::Name => {
            items.sort_by_key(|i| i.seller.name.to_lowercase());
        }
        SellerOrder::Revenue => items.sort_by(|a, b| {
            b.metrics
                .current_period_revenue
                .total_cmp(&a.metrics.current_period_revenue)
        }),
        SellerOrder::Orders => {
            items.sort_by(|a, b| b.metrics.current_period_orders.cmp(&a.metrics.current_period_orders))
        }
        SellerOrder::Clients => {
            items.sort_by(|a, b| b.metrics.portfolio_size.cmp(&a.metrics.portfolio_size))
        }
    }

    items
}

/// Детальная карточка: `None`, если продавца нет
pub async fn get_seller_metrics(
    store: &dyn AnalyticsStore,
    seller_id: &str,
    today: NaiveDate,
) -> Result<Option<SellerMetricsDetail>, MetricsError> {
    let Some(seller) = store.seller_by_id(seller_id).await? else {
        return Ok(None);
    };

    let metrics = compute_seller_metrics(store, &seller, today).await?;
    Ok(Some(SellerMetricsDetail {
        seller: SellerIdentity::from(&seller),
        metrics,
    }))
}

pub async fn get_seller_insights(
    store: &dyn AnalyticsStore,
    seller_id: &str,
    today: NaiveDate,
) -> Result<Option<Vec<SellerInsight>>, MetricsError> {
    let detail = get_seller_metrics(store, seller_id, today).await?;
    Ok(detail.map(|d| build_insights(&d.metrics)))
}

/// Портфель клиентов продавца, по убыванию выручки (пустая выручка первой)
pub async fn get_seller_portfolio(
    store: &dyn AnalyticsStore,
    seller_id: &str,
    query: &PortfolioQuery,
) -> StoreResult<Option<Vec<RfvEntry>>> {
    let Some(seller) = store.seller_by_id(seller_id).await? else {
        return Ok(None);
    };

    let rfv_query = RfvQuery {
        seller_name: Some(seller.name),
        status: filter_value(query.status.as_deref()),
        classification: filter_value(query.classification.as_deref()),
        value: None,
    };

    let mut rows = store.rfv_entries(&rfv_query).await?;
    rows.sort_by(|a, b| revenue_desc_nulls_first(a.revenue_total, b.revenue_total));
    Ok(Some(rows))
}

fn revenue_desc_nulls_first(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => y.total_cmp(&x),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::memory::MemoryStore;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn today() -> NaiveDate {
        d(2026, 10, 17)
    }

    fn rfv(id: i64, seller: &str, revenue: Option<f64>, status: &str) -> RfvEntry {
        RfvEntry {
            id,
            code: format!("C{}", id),
            seller_name: Some(seller.into()),
            revenue_total: revenue,
            status: Some(status.into()),
            recency: Some(1),
            frequency: Some(3),
            ..RfvEntry::default()
        }
    }

    fn sample_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.add_seller("002", "Bruno", false);
        store.add_seller("001", "Ana", true);
        store.add_seller("003", "Carla", true);
        store.add_sale("001", "1", "100", d(2026, 10, 1));
        store.add_sale("002", "2", "900", d(2026, 10, 1));
        store.add_sale("002", "3", "900", d(2026, 10, 2));
        store.add_sale("003", "4", "500", d(2026, 10, 1));
        store.rfv = vec![
            rfv(1, "Ana", Some(10.0), "Ativo"),
            rfv(2, "Ana", None, "Ativo"),
            rfv(3, "Ana", Some(50.0), "Inativo"),
            rfv(4, "Carla", Some(5.0), "Ativo"),
        ];
        store
    }

    #[tokio::test]
    async fn test_list_in_directory_order() {
        let store: Arc<dyn AnalyticsStore> = Arc::new(sample_store());
        let items = list_sellers(store, &SellerListQuery::default(), today())
            .await
            .unwrap();
        let names: Vec<_> = items.iter().map(|i| i.seller.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Bruno", "Carla"]);
        assert_eq!(items[0].metrics.portfolio_size, 3);
        assert_eq!(items[1].metrics.current_period_revenue, 1800.0);
    }

    #[tokio::test]
    async fn test_failed_seller_is_zeroed_not_dropped() {
        let mut store = sample_store();
        store.failing_sellers.insert("002".into());
        let store: Arc<dyn AnalyticsStore> = Arc::new(store);

        let items = list_sellers(store, &SellerListQuery::default(), today())
            .await
            .unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].seller.id, "002");
        assert_eq!(items[1].metrics, SellerMetrics::zeroed());
        assert_eq!(items[0].metrics.current_period_revenue, 100.0);
    }

    #[tokio::test]
    async fn test_portfolio_failure_zeroes_only_that_seller() {
        let mut store = sample_store();
        store.failing_rfv_sellers.insert("Bruno".into());
        let store: Arc<dyn AnalyticsStore> = Arc::new(store);

        let items = list_sellers(store, &SellerListQuery::default(), today())
            .await
            .unwrap();
        assert_eq!(items.len(), 3);

        let bruno = &items[1];
        assert_eq!(bruno.seller.id, "002");
        assert_eq!(bruno.seller.name, "Bruno");
        assert!(!bruno.seller.available);
        assert_eq!(bruno.metrics, SellerMetrics::zeroed());

        assert_eq!(items[0].seller.id, "001");
        assert_eq!(items[0].metrics.current_period_revenue, 100.0);
        assert_eq!(items[0].metrics.portfolio_size, 3);
        assert_eq!(items[2].seller.id, "003");
        assert_eq!(items[2].metrics.current_period_revenue, 500.0);
        assert_eq!(items[2].metrics.portfolio_size, 1);
    }

    #[tokio::test]
    async fn test_active_customers_never_exceed_portfolio() {
        let mut store = sample_store();
        let entry = |id: i64, seller: &str, recency: Option<i32>, frequency: Option<i32>| RfvEntry {
            id,
            code: format!("M{}", id),
            seller_name: Some(seller.into()),
            recency,
            frequency,
            ..RfvEntry::default()
        };
        store.rfv.extend([
            entry(10, "Ana", Some(5), Some(5)),
            entry(11, "Ana", Some(2), Some(1)),
            entry(12, "Bruno", None, None),
            entry(13, "Bruno", Some(2), Some(2)),
            entry(14, "Carla", Some(3), Some(4)),
            entry(15, "Carla", None, Some(4)),
        ]);
        let store: Arc<dyn AnalyticsStore> = Arc::new(store);

        let items = list_sellers(store, &SellerListQuery::default(), today())
            .await
            .unwrap();
        for item in &items {
            assert!(
                item.metrics.active_customer_count <= item.metrics.portfolio_size,
                "seller {}: {} active of {}",
                item.seller.id,
                item.metrics.active_customer_count,
                item.metrics.portfolio_size
            );
        }

        let counts: Vec<_> = items
            .iter()
            .map(|i| (i.metrics.active_customer_count, i.metrics.portfolio_size))
            .collect();
        // Ana: 3 активных из 5, Bruno: 1 из 2, Carla: 2 из 3
        assert_eq!(counts, vec![(3, 5), (1, 2), (2, 3)]);
    }

    #[tokio::test]
    async fn test_directory_failure_propagates() {
        let mut store = sample_store();
        store.fail_sellers = true;
        let store: Arc<dyn AnalyticsStore> = Arc::new(store);
        assert!(list_sellers(store, &SellerListQuery::default(), today())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_list_filters_and_ordering() {
        let store: Arc<dyn AnalyticsStore> = Arc::new(sample_store());

        let query = SellerListQuery {
            search: Some("AR".into()),
            ..SellerListQuery::default()
        };
        let items = list_sellers(store.clone(), &query, today()).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].seller.name, "Carla");

        let query = SellerListQuery {
            availability: AvailabilityFilter::Available,
            order_by: SellerOrder::Revenue,
            ..SellerListQuery::default()
        };
        let items = list_sellers(store.clone(), &query, today()).await.unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.seller.id.as_str()).collect();
        assert_eq!(ids, vec!["003", "001"]);

        let query = SellerListQuery {
            order_by: SellerOrder::Clients,
            ..SellerListQuery::default()
        };
        let items = list_sellers(store, &query, today()).await.unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.seller.id.as_str()).collect();
        // Ana 3, Carla 1, Bruno 0
        assert_eq!(ids, vec!["001", "003", "002"]);
    }

    #[tokio::test]
    async fn test_unknown_seller_is_none() {
        let store = sample_store();
        assert!(get_seller_metrics(&store, "999", today())
            .await
            .unwrap()
            .is_none());
        assert!(get_seller_portfolio(&store, "999", &PortfolioQuery::default())
            .await
            .unwrap()
            .is_none());
        assert!(get_seller_insights(&store, "999", today())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_detail_propagates_errors() {
        let mut store = sample_store();
        store.failing_rfv_sellers.insert("Ana".into());
        assert!(get_seller_metrics(&store, "001", today()).await.is_err());
    }

    #[tokio::test]
    async fn test_detail_carries_identity() {
        let store = sample_store();
        let detail = get_seller_metrics(&store, "001", today())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.seller.name, "Ana");
        assert_eq!(detail.metrics.current_period_orders, 1);
    }

    #[tokio::test]
    async fn test_portfolio_sorted_with_nulls_first() {
        let store = sample_store();
        let rows = get_seller_portfolio(&store, "001", &PortfolioQuery::default())
            .await
            .unwrap()
            .unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        let query = PortfolioQuery {
            status: Some("Ativo".into()),
            classification: Some("null".into()),
        };
        let rows = get_seller_portfolio(&store, "001", &query)
            .await
            .unwrap()
            .unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }
}
