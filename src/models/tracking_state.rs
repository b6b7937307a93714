//! Estado de tracking por vehículo
//!
//! Cursor que el ingestor mantiene por vehículo: última muestra aceptada,
//! última parada matcheada y el ancla de dwell. Se actualiza siempre bajo
//! el lock por vehículo, así que nunca hay dos escritores concurrentes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Seq sentinel cuando todavía no se matcheó ninguna parada del día
pub const NO_STOP_MATCHED: i32 = -1;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VehicleTrackingState {
    pub vehicle_id: Uuid,
    /// Día de servicio del cursor; al cambiar de día el matching se reinicia
    pub service_date: NaiveDate,
    /// Índice de la última parada matcheada (llegada o perdida); -1 = ninguna
    pub last_matched_seq: i32,
    /// Parada candidata en la que el vehículo está en ventana de dwell
    pub dwell_seq: Option<i32>,
    /// Primer timestamp calificante de la ventana de dwell
    pub dwell_started_at: Option<DateTime<Utc>>,
    pub last_timestamp: Option<DateTime<Utc>>,
    pub last_latitude: Option<f64>,
    pub last_longitude: Option<f64>,
    pub last_speed_kmh: Option<f64>,
    /// Velocidad media reciente (ventana exponencial de ~5 muestras),
    /// usada para proyectar la llegada a la próxima parada
    pub recent_avg_speed_kmh: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

impl VehicleTrackingState {
    /// Estado inicial para un vehículo que empieza un día de servicio
    pub fn fresh(vehicle_id: Uuid, service_date: NaiveDate) -> Self {
        Self {
            vehicle_id,
            service_date,
            last_matched_seq: NO_STOP_MATCHED,
            dwell_seq: None,
            dwell_started_at: None,
            last_timestamp: None,
            last_latitude: None,
            last_longitude: None,
            last_speed_kmh: None,
            recent_avg_speed_kmh: None,
            updated_at: Utc::now(),
        }
    }

    /// Media móvil exponencial con ventana efectiva de ~5 muestras
    pub fn blend_avg_speed(previous: Option<f64>, speed_kmh: f64) -> f64 {
        match previous {
            Some(avg) => (avg * 4.0 + speed_kmh) / 5.0,
            None => speed_kmh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_avg_speed() {
        assert_eq!(VehicleTrackingState::blend_avg_speed(None, 30.0), 30.0);
        let blended = VehicleTrackingState::blend_avg_speed(Some(30.0), 40.0);
        assert!((blended - 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_fresh_state() {
        let state = VehicleTrackingState::fresh(Uuid::new_v4(), NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
        assert_eq!(state.last_matched_seq, NO_STOP_MATCHED);
        assert!(state.dwell_seq.is_none());
        assert!(state.last_timestamp.is_none());
    }
}
