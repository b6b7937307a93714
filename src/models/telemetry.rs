//! Modelo de telemetría
//!
//! Muestras GPS crudas por vehículo. Son append-only: toda muestra se
//! persiste para auditoría/replay, acepte o no la validación de ingesta;
//! solo las aceptadas alimentan al matcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Muestra de telemetría entrante
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub vehicle_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub speed_kmh: f64,
    pub heading_deg: f64,
}

/// Motivo de rechazo de una muestra en la validación de ingesta.
/// Un rechazo no es un error HTTP: la muestra igual se guarda para
/// auditoría y el caller recibe el código de motivo.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    StaleTimestamp,
    InvalidCoordinate,
    ImplausibleMotion,
}

impl RejectionReason {
    /// Código de motivo para la API
    pub fn as_code(&self) -> &'static str {
        match self {
            RejectionReason::StaleTimestamp => "STALE_TIMESTAMP",
            RejectionReason::InvalidCoordinate => "INVALID_COORDINATE",
            RejectionReason::ImplausibleMotion => "IMPLAUSIBLE_MOTION",
        }
    }
}

/// Muestra persistida, con el veredicto de validación
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredTelemetrySample {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub speed_kmh: f64,
    pub heading_deg: f64,
    pub accepted: bool,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_reason_codes() {
        assert_eq!(RejectionReason::StaleTimestamp.as_code(), "STALE_TIMESTAMP");
        assert_eq!(RejectionReason::InvalidCoordinate.as_code(), "INVALID_COORDINATE");
        assert_eq!(RejectionReason::ImplausibleMotion.as_code(), "IMPLAUSIBLE_MOTION");
    }
}
