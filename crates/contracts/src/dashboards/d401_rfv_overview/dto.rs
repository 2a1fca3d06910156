use serde::{Deserialize, Serialize};

/// Необязательные фильтры равенства для агрегатов RFV.
///
/// Пустая строка и литерал `"null"` трактуются как отсутствие фильтра.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RfvFilterQuery {
    #[serde(alias = "classificacao")]
    pub classification: Option<String>,
    #[serde(alias = "valor")]
    pub value: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationCount {
    pub classification: String,
    pub description: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: i32,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecencyFrequencyCount {
    pub recency: i32,
    pub frequency: i32,
    pub count: u64,
}

/// Тело запроса `POST /api/rfv/by-codigos`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RfvByCodesRequest {
    #[serde(default, deserialize_with = "crate::shared::lenient::string_list")]
    pub codigos: Vec<String>,
}
