//! In-memory store for unit tests, with failure injection.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use contracts::domain::a001_sales_record::aggregate::SalesRecord;
use contracts::domain::a002_rfv_entry::aggregate::RfvEntry;
use contracts::domain::a003_seller::aggregate::Seller;
use contracts::domain::a004_client_geoloc::aggregate::ClientGeoloc;

use super::{AnalyticsStore, RfvQuery, StoreError, StoreResult};
use crate::system::users::PortalUser;

#[derive(Default)]
pub struct MemoryStore {
    pub sales: Vec<SalesRecord>,
    pub rfv: Vec<RfvEntry>,
    pub geolocations: Vec<ClientGeoloc>,
    pub sellers: Vec<Seller>,
    pub users: Vec<PortalUser>,
    /// Every sales query of these sellers fails
    pub failing_sellers: HashSet<String>,
    /// Sales queries whose window starts on one of these days fail
    pub failing_windows: HashSet<NaiveDate>,
    /// RFV queries for these seller names fail
    pub failing_rfv_sellers: HashSet<String>,
    pub fail_rfv: bool,
    pub fail_geolocations: bool,
    pub fail_sellers: bool,
    /// Arguments of every `rfv_by_codes` call
    pub code_lookups: Mutex<Vec<Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sale(&mut self, seller_id: &str, invoice: &str, amount: &str, date: NaiveDate) {
        self.sales.push(SalesRecord {
            seller_id: seller_id.to_string(),
            invoice_id: Some(invoice.to_string()),
            amount: Some(amount.to_string()),
            issue_date: date,
        });
    }

    pub fn add_seller(&mut self, id: &str, name: &str, available: bool) {
        self.sellers.push(Seller {
            id: id.to_string(),
            name: name.to_string(),
            phone: None,
            photo: None,
            email: None,
            available,
        });
    }

    pub fn code_lookups(&self) -> Vec<Vec<String>> {
        self.code_lookups
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AnalyticsStore for MemoryStore {
    async fn sales_between(
        &self,
        seller_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<SalesRecord>> {
        if self.failing_sellers.contains(seller_id) || self.failing_windows.contains(&from) {
            return Err(StoreError::Query(format!(
                "sales query failed for {} from {}",
                seller_id, from
            )));
        }
        Ok(self
            .sales
            .iter()
            .filter(|s| s.seller_id == seller_id && s.issue_date >= from && s.issue_date <= to)
            .cloned()
            .collect())
    }

    async fn rfv_entries(&self, query: &RfvQuery) -> StoreResult<Vec<RfvEntry>> {
        let seller_fails = query
            .seller_name
            .as_ref()
            .is_some_and(|n| self.failing_rfv_sellers.contains(n));
        if self.fail_rfv || seller_fails {
            return Err(StoreError::Query("rfv query failed".into()));
        }
        let mut rows: Vec<RfvEntry> = self
            .rfv
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        rows.sort_by_key(|e| e.id);
        Ok(rows)
    }

    async fn rfv_by_id(&self, id: i64) -> StoreResult<Option<RfvEntry>> {
        if self.fail_rfv {
            return Err(StoreError::Query("rfv query failed".into()));
        }
        Ok(self.rfv.iter().find(|e| e.id == id).cloned())
    }

    async fn rfv_by_codes(&self, codes: &[String]) -> StoreResult<Vec<RfvEntry>> {
        if let Ok(mut calls) = self.code_lookups.lock() {
            calls.push(codes.to_vec());
        }
        if self.fail_rfv {
            return Err(StoreError::Query("rfv query failed".into()));
        }
        Ok(self
            .rfv
            .iter()
            .filter(|e| codes.contains(&e.code))
            .cloned()
            .collect())
    }

    async fn rfv_codes(&self) -> StoreResult<Vec<String>> {
        if self.fail_rfv {
            return Err(StoreError::Query("rfv query failed".into()));
        }
        Ok(self
            .rfv
            .iter()
            .map(|e| e.code.clone())
            .filter(|c| !c.is_empty())
            .collect())
    }

    async fn geolocations(&self) -> StoreResult<Vec<ClientGeoloc>> {
        if self.fail_geolocations {
            return Err(StoreError::Query("geolocation query failed".into()));
        }
        Ok(self.geolocations.clone())
    }

    async fn sellers(&self) -> StoreResult<Vec<Seller>> {
        if self.fail_sellers {
            return Err(StoreError::Query("seller query failed".into()));
        }
        let mut sellers = self.sellers.clone();
        sellers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sellers)
    }

    async fn seller_by_id(&self, id: &str) -> StoreResult<Option<Seller>> {
        if self.fail_sellers {
            return Err(StoreError::Query("seller query failed".into()));
        }
        Ok(self.sellers.iter().find(|s| s.id == id).cloned())
    }

    async fn portal_user_by_email(&self, email: &str) -> StoreResult<Option<PortalUser>> {
        Ok(self.users.iter().find(|u| u.email == email).cloned())
    }

    async fn portal_user_by_id(&self, id: i64) -> StoreResult<Option<PortalUser>> {
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }
}
