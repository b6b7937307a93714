//! Modelo de MonthlyAggregate
//!
//! Resumen financiero/operacional mensual por vehículo: suma pura de los
//! DailyLogs del mes más las entradas del ledger de costos (combustible y
//! mantenimiento), que escribe un colaborador externo. Totalmente
//! re-derivable; salida de solo lectura del core.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MonthlyAggregate {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub year: i32,
    pub month: i32,
    /// Días con DailyLog no vacío
    pub total_days_active: i32,
    /// Suma exacta de los DailyLog.total_distance_km del mes (NUMERIC)
    pub total_distance_km: Decimal,
    pub total_fuel_cost: Decimal,
    pub total_maintenance_cost: Decimal,
    pub created_at: DateTime<Utc>,
}
