use crate::models::StopLog;
use crate::utils::errors::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Datos de un StopLog a insertar
#[derive(Debug, Clone)]
pub struct NewStopLog {
    pub vehicle_id: Uuid,
    pub route_id: Uuid,
    pub stop_id: Uuid,
    pub service_date: NaiveDate,
    pub scheduled_arrival: DateTime<Utc>,
    pub actual_arrival: Option<DateTime<Utc>>,
    pub delay_minutes: i64,
    pub missed: bool,
}

pub struct StopLogRepository {
    pool: PgPool,
}

impl StopLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert atómico "si no existe" sobre la clave
    /// (vehicle_id, stop_id, service_date). Si otro writer ganó la carrera,
    /// devuelve el registro existente: una llegada duplicada es un no-op.
    pub async fn insert_if_absent(&self, new_log: NewStopLog) -> Result<StopLog, AppError> {
        let inserted = sqlx::query_as::<_, StopLog>(
            r#"
            INSERT INTO stop_logs
                (id, vehicle_id, route_id, stop_id, service_date,
                 scheduled_arrival, actual_arrival, delay_minutes, missed, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (vehicle_id, stop_id, service_date) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_log.vehicle_id)
        .bind(new_log.route_id)
        .bind(new_log.stop_id)
        .bind(new_log.service_date)
        .bind(new_log.scheduled_arrival)
        .bind(new_log.actual_arrival)
        .bind(new_log.delay_minutes)
        .bind(new_log.missed)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(log) => Ok(log),
            None => {
                // Ya existía: devolver el registro original intacto
                let existing = sqlx::query_as::<_, StopLog>(
                    r#"
                    SELECT * FROM stop_logs
                    WHERE vehicle_id = $1 AND stop_id = $2 AND service_date = $3
                    "#,
                )
                .bind(new_log.vehicle_id)
                .bind(new_log.stop_id)
                .bind(new_log.service_date)
                .fetch_one(&self.pool)
                .await?;
                Ok(existing)
            }
        }
    }

    /// StopLogs de un vehículo para un día de servicio, en orden de ruta
    pub async fn find_by_vehicle_and_date(
        &self,
        vehicle_id: Uuid,
        service_date: NaiveDate,
    ) -> Result<Vec<StopLog>, AppError> {
        let logs = sqlx::query_as::<_, StopLog>(
            r#"
            SELECT * FROM stop_logs
            WHERE vehicle_id = $1 AND service_date = $2
            ORDER BY scheduled_arrival ASC
            "#,
        )
        .bind(vehicle_id)
        .bind(service_date)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }

    /// Último StopLog del día para un vehículo (el evento más reciente)
    pub async fn find_latest_for_vehicle_date(
        &self,
        vehicle_id: Uuid,
        service_date: NaiveDate,
    ) -> Result<Option<StopLog>, AppError> {
        let log = sqlx::query_as::<_, StopLog>(
            r#"
            SELECT * FROM stop_logs
            WHERE vehicle_id = $1 AND service_date = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(vehicle_id)
        .bind(service_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(log)
    }
}
