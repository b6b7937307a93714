//! Modelo de DailyLog
//!
//! Rollup diario por vehículo, derivado de StopLogs + telemetría aceptada.
//! Nunca se edita a mano: reconstruirlo para el mismo (vehículo, fecha)
//! reemplaza el registro anterior de forma determinista.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyLog {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub service_date: NaiveDate,
    /// Primera muestra aceptada del día
    pub start_time: DateTime<Utc>,
    /// Última muestra aceptada del día
    pub end_time: DateTime<Utc>,
    /// Distancia haversine acumulada entre muestras consecutivas, NUMERIC(10,2)
    pub total_distance_km: Decimal,
    /// Score compuesto 0-100: puntualidad + suavidad de conducción
    pub efficiency_score: Decimal,
    pub stops_total: i32,
    pub stops_on_time: i32,
    pub stops_missed: i32,
    pub created_at: DateTime<Utc>,
}
