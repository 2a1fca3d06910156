//! Геометрия для тепловой карты: расстояние по большому кругу и центр точек.

use contracts::domain::a004_client_geoloc::aggregate::ClientGeoloc;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Радиус поиска клиентов вокруг клика (500 м)
pub const NEARBY_RADIUS_KM: f64 = 0.5;

/// Центр Бразилии, если точек нет
pub const DEFAULT_CENTER: (f64, f64) = (-14.235, -51.9253);

/// Haversine distance in kilometres
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Linear scan: all points within `radius_km` of the origin (inclusive)
pub fn clients_within<'a>(
    points: &'a [ClientGeoloc],
    lat: f64,
    lon: f64,
    radius_km: f64,
) -> Vec<&'a ClientGeoloc> {
    points
        .iter()
        .filter(|p| haversine_km(lat, lon, p.lat, p.lon) <= radius_km)
        .collect()
}

/// Среднее арифметическое координат
pub fn map_center(points: &[ClientGeoloc]) -> (f64, f64) {
    if points.is_empty() {
        return DEFAULT_CENTER;
    }
    let n = points.len() as f64;
    let lat = points.iter().map(|p| p.lat).sum::<f64>() / n;
    let lon = points.iter().map(|p| p.lon).sum::<f64>() / n;
    (lat, lon)
}
