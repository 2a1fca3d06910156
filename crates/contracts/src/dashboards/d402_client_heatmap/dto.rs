use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeolocQuery {
    /// Only customers present in the RFV table
    #[serde(default, deserialize_with = "crate::shared::lenient::flag")]
    pub rfv: bool,
}

/// Центр карты по набору точек
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapCenter {
    pub lat: f64,
    pub lon: f64,
    pub point_count: usize,
}

/// Клик по карте: поиск клиентов в радиусе
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearbyClientsRequest {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, deserialize_with = "crate::shared::lenient::flag")]
    pub rfv: bool,
}
