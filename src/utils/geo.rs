//! Utilidades geoespaciales
//!
//! Distancia great-circle (haversine) sobre coordenadas WGS84.
//! El core no usa ningún proveedor de mapas: toda la matemática de
//! distancias se hace aquí, sobre las muestras crudas.

/// Radio medio de la Tierra en metros (WGS84)
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Distancia haversine entre dos coordenadas, en metros
pub fn haversine_distance_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Distancia haversine en kilómetros
pub fn haversine_distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    haversine_distance_m(lat1, lng1, lat2, lng2) / 1000.0
}

/// Verificar que una coordenada está dentro del rango WGS84 válido
pub fn is_valid_coordinate(lat: f64, lng: f64) -> bool {
    lat.is_finite()
        && lng.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lng)
}

/// Tiempo estimado (en segundos) para recorrer `distance_m` metros a
/// `speed_kmh` km/h. Devuelve None si la velocidad no permite proyección.
pub fn travel_time_secs(distance_m: f64, speed_kmh: f64) -> Option<i64> {
    if speed_kmh < 1.0 || !speed_kmh.is_finite() {
        return None;
    }
    let speed_ms = speed_kmh / 3.6;
    Some((distance_m / speed_ms).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero_distance() {
        let d = haversine_distance_m(48.8566, 2.3522, 48.8566, 2.3522);
        assert!(d.abs() < 1e-6);
    }

    #[test]
    fn test_haversine_known_distance() {
        // París -> Lyon, aprox 392 km en línea recta
        let d_km = haversine_distance_km(48.8566, 2.3522, 45.7640, 4.8357);
        assert!((d_km - 392.0).abs() < 5.0, "distancia inesperada: {}", d_km);
    }

    #[test]
    fn test_haversine_short_distance() {
        // ~111 m por cada 0.001 grados de latitud
        let d = haversine_distance_m(48.8566, 2.3522, 48.8576, 2.3522);
        assert!((d - 111.0).abs() < 2.0, "distancia inesperada: {}", d);
    }

    #[test]
    fn test_is_valid_coordinate() {
        assert!(is_valid_coordinate(48.85, 2.35));
        assert!(is_valid_coordinate(-90.0, 180.0));
        assert!(!is_valid_coordinate(90.1, 0.0));
        assert!(!is_valid_coordinate(0.0, -180.5));
        assert!(!is_valid_coordinate(f64::NAN, 0.0));
    }

    #[test]
    fn test_travel_time() {
        // 1 km a 30 km/h = 120 s
        assert_eq!(travel_time_secs(1000.0, 30.0), Some(120));
        // Vehículo parado: sin proyección
        assert_eq!(travel_time_secs(1000.0, 0.5), None);
    }
}
