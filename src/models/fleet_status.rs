//! Estado de flota en vivo
//!
//! El snapshot es efímero: se recalcula en cada lectura (modelo pull) a
//! partir de la frescura de telemetría y del último StopLog del día, y solo
//! se cachea con TTL corto. No es una entidad del ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Estado en vivo de un vehículo
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum VehicleState {
    Active,
    Delayed,
    Offline,
}

/// Estado por vehículo dentro del snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleStatus {
    pub vehicle_id: Uuid,
    pub registration_number: String,
    pub state: VehicleState,
    pub last_latitude: Option<f64>,
    pub last_longitude: Option<f64>,
    pub last_seen_at: Option<DateTime<Utc>>,
    /// Retraso del último StopLog del día, si existe
    pub current_delay_minutes: Option<i64>,
}

/// Snapshot de flota por operador
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetStatusSnapshot {
    pub company_id: Uuid,
    pub active_count: i64,
    pub delayed_count: i64,
    pub offline_count: i64,
    pub total_count: i64,
    pub vehicles: Vec<VehicleStatus>,
    pub computed_at: DateTime<Utc>,
}
