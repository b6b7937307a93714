//! Modelo de StopLog
//!
//! Registro inmutable de llegada (o pérdida) de un vehículo a una parada
//! en un día de servicio. Invariante: exactamente un StopLog por
//! (vehicle_id, stop_id, service_date); el retraso se calcula una sola vez
//! al crearlo y no se recalcula aunque después se edite el horario de la ruta.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StopLog {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub route_id: Uuid,
    pub stop_id: Uuid,
    pub service_date: NaiveDate,
    pub scheduled_arrival: DateTime<Utc>,
    /// NULL cuando la parada se marcó como perdida
    pub actual_arrival: Option<DateTime<Utc>>,
    pub delay_minutes: i64,
    /// Parada saltada: el vehículo nunca calificó dentro del geofence y el
    /// timeout venció; el matching avanzó igual para no frenar la ruta
    pub missed: bool,
    pub created_at: DateTime<Utc>,
}

impl StopLog {
    /// Una parada cuenta como puntual si se llegó y el retraso no supera
    /// el umbral dado
    pub fn is_on_time(&self, delay_threshold_min: i64) -> bool {
        !self.missed && self.delay_minutes <= delay_threshold_min
    }
}
