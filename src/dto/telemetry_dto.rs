use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::StopLog;

// Request de ingesta de una muestra de telemetría
#[derive(Debug, Deserialize)]
pub struct IngestTelemetryRequest {
    pub vehicle_id: String,
    pub lat: f64,
    pub lng: f64,
    /// Velocidad en km/h
    pub speed: f64,
    /// Rumbo en grados [0, 360)
    pub heading: f64,
    /// Timestamp RFC3339 de la muestra
    pub timestamp: String,
}

// Response de ingesta: aceptación o rechazo con código de motivo
#[derive(Debug, Serialize)]
pub struct IngestTelemetryResponse {
    /// "OK" | "STALE_TIMESTAMP" | "INVALID_COORDINATE" | "IMPLAUSIBLE_MOTION"
    pub status: String,
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_log: Option<StopLogResponse>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missed_stops: Vec<StopLogResponse>,
}

// Response de StopLog (también anidado en el reporte diario)
#[derive(Debug, Serialize)]
pub struct StopLogResponse {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub route_id: Uuid,
    pub stop_id: Uuid,
    pub service_date: NaiveDate,
    pub scheduled_arrival: DateTime<Utc>,
    pub actual_arrival: Option<DateTime<Utc>>,
    pub delay_minutes: i64,
    pub missed: bool,
}

impl From<StopLog> for StopLogResponse {
    fn from(log: StopLog) -> Self {
        Self {
            id: log.id,
            vehicle_id: log.vehicle_id,
            route_id: log.route_id,
            stop_id: log.stop_id,
            service_date: log.service_date,
            scheduled_arrival: log.scheduled_arrival,
            actual_arrival: log.actual_arrival,
            delay_minutes: log.delay_minutes,
            missed: log.missed,
        }
    }
}
