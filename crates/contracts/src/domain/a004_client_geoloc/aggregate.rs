use serde::{Deserialize, Serialize};

/// Координаты клиента (только валидные точки)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientGeoloc {
    pub id: i64,
    pub client_id: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl ClientGeoloc {
    /// Parses raw stored coordinates, rejecting non-numeric or out-of-range values
    pub fn from_raw(id: i64, client_id: Option<String>, lat: &str, lon: &str) -> Option<Self> {
        let lat: f64 = lat.trim().parse().ok()?;
        let lon: f64 = lon.trim().parse().ok()?;
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        Some(Self {
            id,
            client_id,
            lat,
            lon,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_validates_ranges() {
        assert!(ClientGeoloc::from_raw(1, None, "-23.55", "-46.63").is_some());
        assert!(ClientGeoloc::from_raw(1, None, "91", "0").is_none());
        assert!(ClientGeoloc::from_raw(1, None, "0", "-180.5").is_none());
        assert!(ClientGeoloc::from_raw(1, None, "abc", "0").is_none());
        assert!(ClientGeoloc::from_raw(1, None, "NaN", "0").is_none());
    }
}
