use serde::{Deserialize, Serialize};

use crate::domain::a003_seller::aggregate::SellerIdentity;

/// Метрики продавца, пересчитываются на каждый запрос
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SellerMetrics {
    pub current_period_revenue: f64,
    pub prior_period_revenue: f64,
    /// Variation of the current month against the historical average revenue
    pub revenue_variation_pct: f64,
    pub historical_average_revenue: f64,
    pub current_period_orders: u64,
    pub prior_period_orders: u64,
    /// Month-over-month variation of distinct invoices
    pub orders_variation_pct: f64,
    pub historical_average_orders: f64,
    pub portfolio_size: u64,
    pub active_customer_count: u64,
}

impl SellerMetrics {
    /// Явная "нулевая" запись для продавца, метрики которого не удалось посчитать
    pub fn zeroed() -> Self {
        Self::default()
    }
}

/// Элемент списка продавцов: идентичность + метрики в одном объекте
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerWithMetrics {
    #[serde(flatten)]
    pub seller: SellerIdentity,
    #[serde(flatten)]
    pub metrics: SellerMetrics,
}

/// Ответ детальной карточки продавца
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerMetricsDetail {
    pub seller: SellerIdentity,
    #[serde(flatten)]
    pub metrics: SellerMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityFilter {
    #[default]
    All,
    Available,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SellerOrder {
    /// Directory order (by name)
    #[default]
    Name,
    Revenue,
    Orders,
    Clients,
}

/// Параметры фильтрации списка продавцов
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SellerListQuery {
    pub search: Option<String>,
    #[serde(default)]
    pub availability: AvailabilityFilter,
    #[serde(default)]
    pub order_by: SellerOrder,
}

/// Фильтры карточки портфеля продавца
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioQuery {
    pub status: Option<String>,
    #[serde(alias = "classificacao")]
    pub classification: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Opportunity,
    Alert,
    Recommendation,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightPriority {
    Low,
    Medium,
    High,
}

/// Подсказка для карточки продавца
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerInsight {
    pub kind: InsightKind,
    pub priority: InsightPriority,
    pub message: String,
}
