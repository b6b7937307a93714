use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::fleet_status::{FleetStatusSnapshot, VehicleState, VehicleStatus};

// Query del snapshot de flota
#[derive(Debug, Deserialize)]
pub struct FleetStatusQuery {
    pub company_id: Uuid,
}

// Response del snapshot de flota para el cliente de mapa (polling)
#[derive(Debug, Serialize)]
pub struct FleetStatusResponse {
    pub company_id: Uuid,
    pub active: i64,
    pub delayed: i64,
    pub offline: i64,
    pub total: i64,
    pub vehicles: Vec<VehicleStatusResponse>,
    pub computed_at: DateTime<Utc>,
}

// Estado por vehículo con su última posición conocida
#[derive(Debug, Serialize)]
pub struct VehicleStatusResponse {
    pub vehicle_id: Uuid,
    pub registration_number: String,
    pub state: VehicleState,
    pub last_latitude: Option<f64>,
    pub last_longitude: Option<f64>,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub current_delay_minutes: Option<i64>,
}

impl From<VehicleStatus> for VehicleStatusResponse {
    fn from(status: VehicleStatus) -> Self {
        Self {
            vehicle_id: status.vehicle_id,
            registration_number: status.registration_number,
            state: status.state,
            last_latitude: status.last_latitude,
            last_longitude: status.last_longitude,
            last_seen_at: status.last_seen_at,
            current_delay_minutes: status.current_delay_minutes,
        }
    }
}

impl From<FleetStatusSnapshot> for FleetStatusResponse {
    fn from(snapshot: FleetStatusSnapshot) -> Self {
        Self {
            company_id: snapshot.company_id,
            active: snapshot.active_count,
            delayed: snapshot.delayed_count,
            offline: snapshot.offline_count,
            total: snapshot.total_count,
            vehicles: snapshot.vehicles.into_iter().map(Into::into).collect(),
            computed_at: snapshot.computed_at,
        }
    }
}

// Response del estado de un solo vehículo
#[derive(Debug, Serialize)]
pub struct VehicleStateResponse {
    pub vehicle_id: Uuid,
    pub state: VehicleState,
}
