//! Parámetros de tracking
//!
//! Umbrales del pipeline de telemetría: geofence de llegada, ventana de
//! permanencia (dwell), frescura de flota y detección de conducción brusca.
//! Todos son sobreescribibles por variable de entorno; los defaults son los
//! valores operativos documentados.

use std::env;

/// Configuración de los umbrales de tracking
#[derive(Debug, Clone)]
pub struct TrackingConfig {
    /// Radio del geofence de llegada a parada, en metros
    pub arrival_radius_m: f64,
    /// Velocidad máxima para considerar al vehículo detenido, en km/h
    pub low_speed_kmh: f64,
    /// Permanencia mínima bajo el umbral de velocidad para confirmar llegada, en segundos
    pub dwell_window_secs: i64,
    /// Tiempo tras la hora programada de una parada para marcarla como perdida, en segundos
    pub missed_stop_timeout_secs: i64,
    /// Aceleración máxima plausible entre muestras consecutivas, en km/h por segundo
    pub max_acceleration_kmh_s: f64,
    /// Ventana de frescura de telemetría: sin muestras aceptadas en este lapso => OFFLINE, en segundos
    pub freshness_window_secs: i64,
    /// Retraso (minutos) a partir del cual un vehículo se considera DELAYED
    pub delay_threshold_min: i64,
    /// Velocidad considerada excesiva para el score de eficiencia, en km/h
    pub excessive_speed_kmh: f64,
    /// Desaceleración brusca entre muestras consecutivas, en km/h por segundo
    pub harsh_deceleration_kmh_s: f64,
    /// TTL del snapshot de flota en cache, en segundos (intervalo de polling del cliente)
    pub snapshot_ttl_secs: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            arrival_radius_m: env_f64("ARRIVAL_RADIUS_M", 150.0),
            low_speed_kmh: env_f64("LOW_SPEED_KMH", 5.0),
            dwell_window_secs: env_i64("DWELL_WINDOW_SECS", 20),
            missed_stop_timeout_secs: env_i64("MISSED_STOP_TIMEOUT_SECS", 600),
            max_acceleration_kmh_s: env_f64("MAX_ACCELERATION_KMH_S", 12.0),
            freshness_window_secs: env_i64("FRESHNESS_WINDOW_SECS", 180),
            delay_threshold_min: env_i64("DELAY_THRESHOLD_MIN", 5),
            excessive_speed_kmh: env_f64("EXCESSIVE_SPEED_KMH", 80.0),
            harsh_deceleration_kmh_s: env_f64("HARSH_DECELERATION_KMH_S", 9.0),
            snapshot_ttl_secs: env_i64("FLEET_SNAPSHOT_TTL_SECS", 5) as u64,
        }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_i64(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = TrackingConfig::default();
        assert_eq!(cfg.arrival_radius_m, 150.0);
        assert_eq!(cfg.low_speed_kmh, 5.0);
        assert_eq!(cfg.dwell_window_secs, 20);
        assert_eq!(cfg.delay_threshold_min, 5);
        assert_eq!(cfg.freshness_window_secs, 180);
        assert_eq!(cfg.snapshot_ttl_secs, 5);
    }
}
