//! Метрики продавца: текущий месяц против предыдущего, усечённое среднее
//! за 12 месяцев, активность портфеля клиентов.

use std::collections::HashSet;

use chrono::NaiveDate;
use contracts::dashboards::d400_seller_performance::SellerMetrics;
use contracts::domain::a001_sales_record::aggregate::SalesRecord;
use contracts::domain::a003_seller::aggregate::Seller;
use thiserror::Error;

use super::periods::{month_window, variation_pct};
use crate::shared::data::{AnalyticsStore, RfvQuery, StoreError};
use crate::shared::format::parse_amount;

pub const HISTORY_MONTHS: u32 = 12;

/// Minimum number of monthly values for a trimmed average
const MIN_TRIMMED_SAMPLES: usize = 3;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("{0}")]
    DataFetch(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthlyMetric {
    Revenue,
    OrderCount,
}

/// Сравнение текущего и предыдущего месяца
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PeriodComparison {
    pub current_revenue: f64,
    pub prior_revenue: f64,
    pub revenue_variation_pct: f64,
    pub current_orders: u64,
    pub prior_orders: u64,
    pub orders_variation_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortfolioMetrics {
    pub portfolio_size: u64,
    pub active_customer_count: u64,
}

/// Sum of positive parsed amounts; refunds and zero rows are skipped
pub fn revenue_of(rows: &[SalesRecord]) -> f64 {
    rows.iter()
        .map(|r| r.amount.as_deref().map(parse_amount).unwrap_or(0.0))
        .filter(|v| *v > 0.0)
        .sum()
}

/// Количество различных номеров накладных (пустой номер считается одним значением)
pub fn order_count_of(rows: &[SalesRecord]) -> u64 {
    rows.iter()
        .map(|r| r.invoice_id.as_deref())
        .collect::<HashSet<_>>()
        .len() as u64
}

pub async fn compute_current_vs_prior_period(
    store: &dyn AnalyticsStore,
    seller_id: &str,
    today: NaiveDate,
) -> Result<PeriodComparison, MetricsError> {
    let (cur_from, cur_to) = month_window(today, 0);
    let (prior_from, prior_to) = month_window(today, 1);

    let (current, prior) = tokio::join!(
        store.sales_between(seller_id, cur_from, cur_to),
        store.sales_between(seller_id, prior_from, prior_to),
    );

    // Ошибка текущего периода важнее
    let current = current.map_err(|e| MetricsError::DataFetch(e.to_string()))?;
    let prior = prior.map_err(|e| MetricsError::DataFetch(e.to_string()))?;

    let current_revenue = revenue_of(&current);
    let prior_revenue = revenue_of(&prior);
    let current_orders = order_count_of(&current);
    let prior_orders = order_count_of(&prior);

    Ok(PeriodComparison {
        current_revenue,
        prior_revenue,
        revenue_variation_pct: variation_pct(current_revenue, prior_revenue),
        current_orders,
        prior_orders,
        orders_variation_pct: variation_pct(current_orders as f64, prior_orders as f64),
    })
}

/// Усечённое среднее: без одного минимума и одного максимума
pub fn trimmed_mean(values: &[f64]) -> f64 {
    if values.len() < MIN_TRIMMED_SAMPLES {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let inner = &sorted[1..sorted.len() - 1];
    if inner.is_empty() {
        return 0.0;
    }
    inner.iter().sum::<f64>() / inner.len() as f64
}

/// Average of the last `months` calendar months (current month included)
/// with the single lowest and highest month dropped.
/// Months whose fetch fails are skipped.
pub async fn compute_trimmed_monthly_average(
    store: &dyn AnalyticsStore,
    seller_id: &str,
    metric: MonthlyMetric,
    months: u32,
    today: NaiveDate,
) -> f64 {
    let mut values = Vec::with_capacity(months as usize);

    for i in 0..months {
        let (from, to) = month_window(today, i);
        match store.sales_between(seller_id, from, to).await {
            Ok(rows) => values.push(match metric {
                MonthlyMetric::Revenue => revenue_of(&rows),
                MonthlyMetric::OrderCount => order_count_of(&rows) as f64,
            }),
            Err(e) => {
                tracing::debug!(
                    "Skipping month {} for seller {} ({:?}): {}",
                    from.format("%Y-%m"),
                    seller_id,
                    metric,
                    e
                );
            }
        }
    }

    trimmed_mean(&values)
}

/// Портфель: строки RFV с точным (регистрозависимым) совпадением имени продавца
pub async fn compute_portfolio_metrics(
    store: &dyn AnalyticsStore,
    seller_name: &str,
) -> Result<PortfolioMetrics, MetricsError> {
    let rows = store
        .rfv_entries(&RfvQuery::for_seller(seller_name))
        .await
        .map_err(|e| MetricsError::DataFetch(e.to_string()))?;

    Ok(PortfolioMetrics {
        portfolio_size: rows.len() as u64,
        active_customer_count: rows.iter().filter(|r| r.is_active()).count() as u64,
    })
}

pub async fn compute_seller_metrics(
    store: &dyn AnalyticsStore,
    seller: &Seller,
    today: NaiveDate,
) -> Result<SellerMetrics, MetricsError> {
    let (periods, avg_revenue, avg_orders, portfolio) = tokio::try_join!(
        compute_current_vs_prior_period(store, &seller.id, today),
        async {
            Ok::<_, MetricsError>(
                compute_trimmed_monthly_average(
                    store,
                    &seller.id,
                    MonthlyMetric::Revenue,
                    HISTORY_MONTHS,
                    today,
                )
                .await,
            )
        },
        async {
            Ok::<_, MetricsError>(
                compute_trimmed_monthly_average(
                    store,
                    &seller.id,
                    MonthlyMetric::OrderCount,
                    HISTORY_MONTHS,
                    today,
                )
                .await,
            )
        },
        compute_portfolio_metrics(store, &seller.name),
    )?;

    Ok(SellerMetrics {
        current_period_revenue: periods.current_revenue,
        prior_period_revenue: periods.prior_revenue,
        // Выручка сравнивается со средним за год, а не с прошлым месяцем
        revenue_variation_pct: variation_pct(periods.current_revenue, avg_revenue),
        historical_average_revenue: avg_revenue,
        current_period_orders: periods.current_orders,
        prior_period_orders: periods.prior_orders,
        orders_variation_pct: periods.orders_variation_pct,
        historical_average_orders: avg_orders,
        portfolio_size: portfolio.portfolio_size,
        active_customer_count: portfolio.active_customer_count,
    })
}

/// Same as [`compute_seller_metrics`], but a failure yields a zeroed record
pub async fn compute_seller_metrics_or_zero(
    store: &dyn AnalyticsStore,
    seller: &Seller,
    today: NaiveDate,
) -> SellerMetrics {
    match compute_seller_metrics(store, seller, today).await {
        Ok(metrics) => metrics,
        Err(e) => {
            tracing::warn!(
                "Metrics for seller {} ({}) unavailable, using zeros: {}",
                seller.id,
                seller.name,
                e
            );
            SellerMetrics::zeroed()
        }
    }
}
