//! Источник данных: реестр продаж, RFV, геолокация, справочник продавцов,
//! пользователи портала.
//!
//! Движок метрик работает только через трейт [`AnalyticsStore`], поэтому
//! хранилище подменяется (SQLite, PostgREST, память в тестах).

pub mod db;
pub mod postgrest;

#[cfg(test)]
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use contracts::domain::a001_sales_record::aggregate::SalesRecord;
use contracts::domain::a002_rfv_entry::aggregate::RfvEntry;
use contracts::domain::a003_seller::aggregate::Seller;
use contracts::domain::a004_client_geoloc::aggregate::ClientGeoloc;
use thiserror::Error;

use crate::shared::config::{Config, StoreBackend};
use crate::system::users::PortalUser;

/// Ошибки источника данных
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Query(String),

    #[error("Failed to decode row: {0}")]
    Decode(String),

    #[error("{0}")]
    Http(String),

    #[error("Store configuration error: {0}")]
    Config(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Фильтры равенства по таблице RFV (объединяются через AND)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RfvQuery {
    pub seller_name: Option<String>,
    pub status: Option<String>,
    pub classification: Option<String>,
    pub value: Option<i32>,
}

/// Пустое значение фильтра и литерал "null" означают "без фильтра"
pub fn filter_value(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty() && *v != "null")
        .map(str::to_string)
}

impl RfvQuery {
    pub fn for_seller(name: &str) -> Self {
        Self {
            seller_name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn matches(&self, entry: &RfvEntry) -> bool {
        fn eq(filter: &Option<String>, field: &Option<String>) -> bool {
            match filter {
                Some(f) => field.as_deref() == Some(f.as_str()),
                None => true,
            }
        }
        eq(&self.seller_name, &entry.seller_name)
            && eq(&self.status, &entry.status)
            && eq(&self.classification, &entry.classification)
            && self.value.map_or(true, |v| entry.value == Some(v))
    }
}

#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Sales rows of one seller with `from <= issue_date <= to`
    async fn sales_between(
        &self,
        seller_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<SalesRecord>>;

    /// RFV rows matching every set filter, ordered by id
    async fn rfv_entries(&self, query: &RfvQuery) -> StoreResult<Vec<RfvEntry>>;

    async fn rfv_by_id(&self, id: i64) -> StoreResult<Option<RfvEntry>>;

    async fn rfv_by_codes(&self, codes: &[String]) -> StoreResult<Vec<RfvEntry>>;

    /// Non-empty customer codes present in the RFV table
    async fn rfv_codes(&self) -> StoreResult<Vec<String>>;

    /// Geolocation rows with valid coordinates only
    async fn geolocations(&self) -> StoreResult<Vec<ClientGeoloc>>;

    /// Seller directory ordered by name
    async fn sellers(&self) -> StoreResult<Vec<Seller>>;

    async fn seller_by_id(&self, id: &str) -> StoreResult<Option<Seller>>;

    async fn portal_user_by_email(&self, email: &str) -> StoreResult<Option<PortalUser>>;

    async fn portal_user_by_id(&self, id: i64) -> StoreResult<Option<PortalUser>>;
}

/// Создать хранилище по конфигурации
pub async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn AnalyticsStore>> {
    match config.database.backend {
        StoreBackend::Sqlite => {
            let path = crate::shared::config::get_database_path(config)?;
            tracing::info!("Using SQLite store at {}", path.display());
            let store = db::SqliteStore::open(&path).await?;
            crate::system::initialization::ensure_bootstrap_user(&store, &config.auth).await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Postgrest => {
            let store = postgrest::PostgrestStore::from_config(&config.postgrest)?;
            tracing::info!("Using PostgREST store at {}", store.base_url());
            Ok(Arc::new(store))
        }
    }
}
