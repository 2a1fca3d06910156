use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Строка реестра продаж (одна строка на позицию счёта-фактуры)
///
/// `amount` хранится так, как пришёл из источника: текст с локальным
/// форматированием ("R$ 1.234,56"). Разбор выполняет движок метрик.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub seller_id: String,
    pub invoice_id: Option<String>,
    pub amount: Option<String>,
    pub issue_date: NaiveDate,
}
