use serde::{Deserialize, Serialize};

/// Строка сегментации RFV (один клиент)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RfvEntry {
    pub id: i64,
    pub code: String,
    pub company_name: Option<String>,
    pub seller_name: Option<String>,
    pub order_count: Option<i64>,
    pub revenue_total: Option<f64>,
    pub average_ticket: Option<f64>,
    pub first_purchase: Option<String>,
    pub last_purchase: Option<String>,
    pub purchase_interval: Option<f64>,
    pub days_since_last_purchase: Option<i64>,
    /// Lower is more recent
    pub recency: Option<i32>,
    /// Higher is more frequent
    pub frequency: Option<i32>,
    pub value: Option<i32>,
    pub average_rating: Option<f64>,
    pub status: Option<String>,
    pub action: Option<String>,
    pub ranking: Option<String>,
    pub recency_frequency: Option<i32>,
    pub attendant_id: Option<i64>,
    pub document: Option<String>,
    pub cs_active: Option<bool>,
    pub classification: Option<String>,
    pub description: Option<String>,
    pub business_type: Option<String>,
}

impl RfvEntry {
    /// Клиент активен: recency <= 2 и frequency >= 2 (пустые значения = 0)
    pub fn is_active(&self) -> bool {
        self.recency.unwrap_or(0) <= 2 && self.frequency.unwrap_or(0) >= 2
    }

    pub fn to_summary(&self) -> RfvSummary {
        RfvSummary {
            code: self.code.clone(),
            company_name: self.company_name.clone(),
            seller_name: self.seller_name.clone(),
            revenue_total: self.revenue_total,
            average_ticket: self.average_ticket,
            recency: self.recency,
            frequency: self.frequency,
            value: self.value,
            status: self.status.clone(),
            classification: self.classification.clone(),
            description: self.description.clone(),
        }
    }
}

/// Сокращённая проекция RFV для всплывающих карточек карты
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RfvSummary {
    pub code: String,
    pub company_name: Option<String>,
    pub seller_name: Option<String>,
    pub revenue_total: Option<f64>,
    pub average_ticket: Option<f64>,
    pub recency: Option<i32>,
    pub frequency: Option<i32>,
    pub value: Option<i32>,
    pub status: Option<String>,
    pub classification: Option<String>,
    pub description: Option<String>,
}
