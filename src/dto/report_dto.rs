use chrono::{DateTime, NaiveDate, Utc};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dto::telemetry_dto::StopLogResponse;
use crate::models::{DailyLog, MonthlyAggregate};

// Query del reporte diario
#[derive(Debug, Deserialize)]
pub struct DailyReportQuery {
    pub company_id: Uuid,
    /// Día de servicio, YYYY-MM-DD
    pub date: String,
    pub vehicle_id: Option<Uuid>,
}

// Request del trigger manual "sync logs": fuerza la reconstrucción del
// rollup diario para una fecha
#[derive(Debug, Deserialize)]
pub struct SyncDailyLogsRequest {
    pub company_id: Uuid,
    pub date: String,
    pub vehicle_id: Option<Uuid>,
}

// Response de DailyLog con el detalle de paradas anidado
#[derive(Debug, Serialize)]
pub struct DailyLogResponse {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub service_date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_distance_km: f64,
    pub efficiency_score: f64,
    pub stops_total: i32,
    pub stops_on_time: i32,
    pub stops_missed: i32,
    pub stop_logs: Vec<StopLogResponse>,
}

impl DailyLogResponse {
    pub fn from_log(log: DailyLog, stop_logs: Vec<StopLogResponse>) -> Self {
        Self {
            id: log.id,
            vehicle_id: log.vehicle_id,
            service_date: log.service_date,
            start_time: log.start_time,
            end_time: log.end_time,
            total_distance_km: log.total_distance_km.to_f64().unwrap_or(0.0),
            efficiency_score: log.efficiency_score.to_f64().unwrap_or(0.0),
            stops_total: log.stops_total,
            stops_on_time: log.stops_on_time,
            stops_missed: log.stops_missed,
            stop_logs,
        }
    }
}

// Query del reporte mensual
#[derive(Debug, Deserialize)]
pub struct MonthlyReportQuery {
    pub company_id: Uuid,
    pub month: u32,
    pub year: i32,
}

// Request del trigger de reconstrucción del agregado mensual
#[derive(Debug, Deserialize)]
pub struct SyncMonthlyRequest {
    pub company_id: Uuid,
    pub month: u32,
    pub year: i32,
    pub vehicle_id: Option<Uuid>,
}

// Response de agregado mensual por vehículo
#[derive(Debug, Serialize)]
pub struct MonthlyAggregateResponse {
    pub vehicle_id: Uuid,
    pub year: i32,
    pub month: i32,
    pub total_days_active: i32,
    pub total_distance_km: f64,
    pub total_fuel_cost: f64,
    pub total_maintenance_cost: f64,
}

impl From<MonthlyAggregate> for MonthlyAggregateResponse {
    fn from(aggregate: MonthlyAggregate) -> Self {
        Self {
            vehicle_id: aggregate.vehicle_id,
            year: aggregate.year,
            month: aggregate.month,
            total_days_active: aggregate.total_days_active,
            total_distance_km: aggregate.total_distance_km.to_f64().unwrap_or(0.0),
            total_fuel_cost: aggregate.total_fuel_cost.to_f64().unwrap_or(0.0),
            total_maintenance_cost: aggregate.total_maintenance_cost.to_f64().unwrap_or(0.0),
        }
    }
}
