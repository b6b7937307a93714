//! Modelo de Vehicle
//!
//! Los vehículos los administra el módulo de gestión de flota (colaborador
//! externo); el core solo los lee para saber qué ruta tiene asignada cada
//! uno y a qué operador pertenece.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado operacional del vehículo - mapea al ENUM vehicle_operational_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "vehicle_operational_status", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum VehicleOperationalStatus {
    Active,
    Maintenance,
    Inactive,
}

/// Vehículo de la flota (solo lectura para el core)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub company_id: Uuid,
    pub registration_number: String,
    pub capacity: i32,
    pub operational_status: VehicleOperationalStatus,
    /// Ruta actualmente asignada; sin ruta no hay matching de paradas
    pub assigned_route_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Vehicle {
    /// Un vehículo solo participa del tracking si está operativo
    pub fn is_trackable(&self) -> bool {
        self.operational_status == VehicleOperationalStatus::Active
    }
}
