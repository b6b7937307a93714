use crate::models::DailyLog;
use crate::utils::errors::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Datos de un DailyLog a materializar
#[derive(Debug, Clone)]
pub struct NewDailyLog {
    pub vehicle_id: Uuid,
    pub service_date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_distance_km: Decimal,
    pub efficiency_score: Decimal,
    pub stops_total: i32,
    pub stops_on_time: i32,
    pub stops_missed: i32,
}

pub struct DailyLogRepository {
    pool: PgPool,
}

impl DailyLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_vehicle_and_date(
        &self,
        vehicle_id: Uuid,
        service_date: NaiveDate,
    ) -> Result<Option<DailyLog>, AppError> {
        let log = sqlx::query_as::<_, DailyLog>(
            "SELECT * FROM daily_logs WHERE vehicle_id = $1 AND service_date = $2",
        )
        .bind(vehicle_id)
        .bind(service_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(log)
    }

    /// DailyLogs de toda la flota de un operador para un día de servicio
    pub async fn find_by_company_and_date(
        &self,
        company_id: Uuid,
        service_date: NaiveDate,
    ) -> Result<Vec<DailyLog>, AppError> {
        let logs = sqlx::query_as::<_, DailyLog>(
            r#"
            SELECT d.* FROM daily_logs d
            JOIN vehicles v ON v.id = d.vehicle_id
            WHERE v.company_id = $1 AND d.service_date = $2
            ORDER BY v.registration_number ASC
            "#,
        )
        .bind(company_id)
        .bind(service_date)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }

    /// Reemplazo determinista dentro de la transacción del job de rollup:
    /// borra el DailyLog previo y escribe el recalculado en un solo commit.
    pub async fn replace_in_tx(
        conn: &mut PgConnection,
        new_log: &NewDailyLog,
    ) -> Result<DailyLog, AppError> {
        sqlx::query("DELETE FROM daily_logs WHERE vehicle_id = $1 AND service_date = $2")
            .bind(new_log.vehicle_id)
            .bind(new_log.service_date)
            .execute(&mut *conn)
            .await?;

        let log = sqlx::query_as::<_, DailyLog>(
            r#"
            INSERT INTO daily_logs
                (id, vehicle_id, service_date, start_time, end_time,
                 total_distance_km, efficiency_score,
                 stops_total, stops_on_time, stops_missed, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_log.vehicle_id)
        .bind(new_log.service_date)
        .bind(new_log.start_time)
        .bind(new_log.end_time)
        .bind(new_log.total_distance_km)
        .bind(new_log.efficiency_score)
        .bind(new_log.stops_total)
        .bind(new_log.stops_on_time)
        .bind(new_log.stops_missed)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        Ok(log)
    }

    /// Borrado dentro de la transacción (día sin telemetría: no hay DailyLog)
    pub async fn delete_in_tx(
        conn: &mut PgConnection,
        vehicle_id: Uuid,
        service_date: NaiveDate,
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM daily_logs WHERE vehicle_id = $1 AND service_date = $2")
            .bind(vehicle_id)
            .bind(service_date)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Suma de distancias y conteo de días activos de un mes, leídos dentro
    /// de la transacción del rollup mensual. La suma es NUMERIC exacta:
    /// no hay deriva de redondeo respecto a los DailyLogs.
    pub async fn month_totals_in_tx(
        conn: &mut PgConnection,
        vehicle_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<(Decimal, i64), AppError> {
        let row: (Option<Decimal>, i64) = sqlx::query_as(
            r#"
            SELECT SUM(total_distance_km), COUNT(*)
            FROM daily_logs
            WHERE vehicle_id = $1 AND service_date >= $2 AND service_date < $3
            "#,
        )
        .bind(vehicle_id)
        .bind(from)
        .bind(to)
        .fetch_one(&mut *conn)
        .await?;

        Ok((row.0.unwrap_or_default(), row.1))
    }
}
