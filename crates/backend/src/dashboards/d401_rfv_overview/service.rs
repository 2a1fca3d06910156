use std::collections::{BTreeMap, HashMap};

use contracts::dashboards::d401_rfv_overview::{
    ClassificationCount, RecencyFrequencyCount, RfvFilterQuery, StatusCount, ValueCount,
};
use contracts::domain::a002_rfv_entry::aggregate::{RfvEntry, RfvSummary};
use thiserror::Error;

use crate::shared::data::{filter_value, AnalyticsStore, RfvQuery, StoreResult};

/// Максимум кодов клиентов в одном запросе по кодам
pub const MAX_CODES_PER_LOOKUP: usize = 100;

pub const NO_CLASSIFICATION: &str = "Sem classificação";
pub const NO_STATUS: &str = "Sem status";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Parâmetro valor inválido: {0}")]
pub struct InvalidValueFilter(pub String);

/// Which query parameters an aggregate endpoint honours
#[derive(Debug, Clone, Copy)]
pub struct FilterSet {
    pub classification: bool,
    pub value: bool,
    pub status: bool,
}

impl FilterSet {
    pub const FOR_CLASSIFICATION: FilterSet = FilterSet {
        classification: false,
        value: true,
        status: true,
    };
    pub const FOR_VALUE: FilterSet = FilterSet {
        classification: true,
        value: false,
        status: true,
    };
    pub const FOR_STATUS: FilterSet = FilterSet {
        classification: true,
        value: true,
        status: false,
    };
    pub const ALL: FilterSet = FilterSet {
        classification: true,
        value: true,
        status: true,
    };
}

/// Query string -> store filters
pub fn build_query(
    raw: &RfvFilterQuery,
    filters: FilterSet,
) -> Result<RfvQuery, InvalidValueFilter> {
    let value = if filters.value {
        match filter_value(raw.value.as_deref()) {
            Some(v) => Some(
                v.parse::<i32>()
                    .map_err(|_| InvalidValueFilter(v.clone()))?,
            ),
            None => None,
        }
    } else {
        None
    };

    Ok(RfvQuery {
        seller_name: None,
        status: if filters.status {
            filter_value(raw.status.as_deref())
        } else {
            None
        },
        classification: if filters.classification {
            filter_value(raw.classification.as_deref())
        } else {
            None
        },
        value,
    })
}

/// Группировка по классификации, порядок первого появления
pub fn count_by_classification(rows: &[RfvEntry]) -> Vec<ClassificationCount> {
    let mut out: Vec<ClassificationCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let key = row
            .classification
            .clone()
            .unwrap_or_else(|| NO_CLASSIFICATION.to_string());
        match index.get(&key) {
            Some(&i) => out[i].count += 1,
            None => {
                index.insert(key.clone(), out.len());
                out.push(ClassificationCount {
                    description: row.description.clone().unwrap_or_else(|| key.clone()),
                    classification: key,
                    count: 1,
                });
            }
        }
    }
    out
}

/// Группировка по оценке V, по возрастанию
pub fn count_by_value(rows: &[RfvEntry]) -> Vec<ValueCount> {
    let mut counts: BTreeMap<i32, u64> = BTreeMap::new();
    for row in rows {
        *counts.entry(row.value.unwrap_or(0)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(value, count)| ValueCount { value, count })
        .collect()
}

/// Группировка по статусу, по убыванию количества (равные в порядке появления)
pub fn count_by_status(rows: &[RfvEntry]) -> Vec<StatusCount> {
    let mut out: Vec<StatusCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let key = row.status.clone().unwrap_or_else(|| NO_STATUS.to_string());
        match index.get(&key) {
            Some(&i) => out[i].count += 1,
            None => {
                index.insert(key.clone(), out.len());
                out.push(StatusCount {
                    status: key,
                    count: 1,
                });
            }
        }
    }
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

/// Матрица R x F, порядок первого появления
pub fn count_by_recency_frequency(rows: &[RfvEntry]) -> Vec<RecencyFrequencyCount> {
    let mut out: Vec<RecencyFrequencyCount> = Vec::new();
    let mut index: HashMap<(i32, i32), usize> = HashMap::new();

    for row in rows {
        let key = (row.recency.unwrap_or(0), row.frequency.unwrap_or(0));
        match index.get(&key) {
            Some(&i) => out[i].count += 1,
            None => {
                index.insert(key, out.len());
                out.push(RecencyFrequencyCount {
                    recency: key.0,
                    frequency: key.1,
                    count: 1,
                });
            }
        }
    }
    out
}

pub async fn list_entries(store: &dyn AnalyticsStore) -> StoreResult<Vec<RfvEntry>> {
    store.rfv_entries(&RfvQuery::default()).await
}

pub async fn get_entry(store: &dyn AnalyticsStore, id: i64) -> StoreResult<Option<RfvEntry>> {
    store.rfv_by_id(id).await
}

/// Сводки RFV по кодам клиентов (только первые 100 кодов)
pub async fn summaries_by_codes(
    store: &dyn AnalyticsStore,
    codes: &[String],
) -> StoreResult<Vec<RfvSummary>> {
    if codes.is_empty() {
        return Ok(Vec::new());
    }
    if codes.len() > MAX_CODES_PER_LOOKUP {
        tracing::debug!(
            "Code lookup truncated from {} to {} codes",
            codes.len(),
            MAX_CODES_PER_LOOKUP
        );
    }
    let limited = &codes[..codes.len().min(MAX_CODES_PER_LOOKUP)];
    let rows = store.rfv_by_codes(limited).await?;
    Ok(rows.iter().map(RfvEntry::to_summary).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::memory::MemoryStore;

    fn entry(id: i64) -> RfvEntry {
        RfvEntry {
            id,
            code: format!("C{}", id),
            ..RfvEntry::default()
        }
    }

    fn with_class(id: i64, class: Option<&str>, desc: Option<&str>) -> RfvEntry {
        RfvEntry {
            classification: class.map(str::to_string),
            description: desc.map(str::to_string),
            ..entry(id)
        }
    }

    #[test]
    fn test_build_query_respects_filter_set() {
        let raw = RfvFilterQuery {
            classification: Some("Campeões".into()),
            value: Some("5".into()),
            status: Some("null".into()),
        };
        let q = build_query(&raw, FilterSet::FOR_CLASSIFICATION).unwrap();
        assert_eq!(q.classification, None);
        assert_eq!(q.value, Some(5));
        assert_eq!(q.status, None);

        let q = build_query(&raw, FilterSet::FOR_VALUE).unwrap();
        assert_eq!(q.classification.as_deref(), Some("Campeões"));
        assert_eq!(q.value, None);
    }

    #[test]
    fn test_non_integer_value_is_rejected() {
        let raw = RfvFilterQuery {
            value: Some("abc".into()),
            ..RfvFilterQuery::default()
        };
        assert_eq!(
            build_query(&raw, FilterSet::ALL),
            Err(InvalidValueFilter("abc".into()))
        );
        // ignored where the endpoint does not filter by value
        assert!(build_query(&raw, FilterSet::FOR_VALUE).is_ok());
    }

    #[test]
    fn test_classification_first_seen_description() {
        let rows = vec![
            with_class(1, Some("A"), Some("Alpha")),
            with_class(2, None, None),
            with_class(3, Some("A"), Some("Other")),
            with_class(4, Some("B"), None),
        ];
        let out = count_by_classification(&rows);
        assert_eq!(
            out,
            vec![
                ClassificationCount {
                    classification: "A".into(),
                    description: "Alpha".into(),
                    count: 2
                },
                ClassificationCount {
                    classification: NO_CLASSIFICATION.into(),
                    description: NO_CLASSIFICATION.into(),
                    count: 1
                },
                ClassificationCount {
                    classification: "B".into(),
                    description: "B".into(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_value_ascending_with_null_as_zero() {
        let rows = vec![
            RfvEntry {
                value: Some(5),
                ..entry(1)
            },
            RfvEntry {
                value: None,
                ..entry(2)
            },
            RfvEntry {
                value: Some(2),
                ..entry(3)
            },
            RfvEntry {
                value: Some(5),
                ..entry(4)
            },
        ];
        let out = count_by_value(&rows);
        assert_eq!(
            out,
            vec![
                ValueCount { value: 0, count: 1 },
                ValueCount { value: 2, count: 1 },
                ValueCount { value: 5, count: 2 },
            ]
        );
    }

    #[test]
    fn test_status_by_count_desc_stable() {
        let statuses = [Some("Ativo"), None, Some("Inativo"), Some("Inativo"), Some("Ativo"), Some("Novo")];
        let rows: Vec<_> = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| RfvEntry {
                status: s.map(str::to_string),
                ..entry(i as i64)
            })
            .collect();
        let names: Vec<_> = count_by_status(&rows).into_iter().map(|s| (s.status, s.count)).collect();
        assert_eq!(
            names,
            vec![
                ("Ativo".to_string(), 2),
                ("Inativo".to_string(), 2),
                (NO_STATUS.to_string(), 1),
                ("Novo".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_recency_frequency_pairs() {
        let rows = vec![
            RfvEntry {
                recency: Some(1),
                frequency: Some(3),
                ..entry(1)
            },
            RfvEntry {
                recency: None,
                frequency: None,
                ..entry(2)
            },
            RfvEntry {
                recency: Some(1),
                frequency: Some(3),
                ..entry(3)
            },
        ];
        let out = count_by_recency_frequency(&rows);
        assert_eq!(out.len(), 2);
        assert_eq!((out[0].recency, out[0].frequency, out[0].count), (1, 3, 2));
        assert_eq!((out[1].recency, out[1].frequency, out[1].count), (0, 0, 1));
    }

    #[tokio::test]
    async fn test_lookup_uses_first_hundred_codes() {
        let mut store = MemoryStore::new();
        store.rfv = (1..=150).map(entry).collect();
        let codes: Vec<String> = (1..=150).map(|i| format!("C{}", i)).collect();

        let out = summaries_by_codes(&store, &codes).await.unwrap();
        assert_eq!(out.len(), MAX_CODES_PER_LOOKUP);
        assert_eq!(store.code_lookups()[0].len(), MAX_CODES_PER_LOOKUP);

        let none = summaries_by_codes(&store, &[]).await.unwrap();
        assert!(none.is_empty());
        assert_eq!(store.code_lookups().len(), 1);
    }
}
