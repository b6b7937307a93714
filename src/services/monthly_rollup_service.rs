//! Rollup mensual
//!
//! Suma pura sobre los DailyLogs de un mes calendario más las entradas del
//! ledger de costos (combustible/mantenimiento, escritas por un colaborador
//! externo). Las distancias son NUMERIC: la suma mensual coincide exacta
//! con los DailyLogs, sin deriva de redondeo. Mismo esquema de atomicidad
//! que el rollup diario: transacción + advisory lock por (vehículo, mes).

use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::MonthlyAggregate;
use crate::repositories::cost_repository::CostRepository;
use crate::repositories::daily_log_repository::DailyLogRepository;
use crate::repositories::monthly_aggregate_repository::{
    MonthlyAggregateRepository, NewMonthlyAggregate,
};
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::AppError;

/// Ventana [primer día del mes, primer día del mes siguiente)
pub fn month_window(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let from = NaiveDate::from_ymd_opt(year, month, 1)?;
    let to = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((from, to))
}

pub struct MonthlyRollupService {
    pool: PgPool,
}

impl MonthlyRollupService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Construir (o reconstruir) el agregado mensual de un vehículo
    pub async fn build_monthly_aggregate(
        &self,
        vehicle_id: Uuid,
        month: u32,
        year: i32,
    ) -> Result<MonthlyAggregate, AppError> {
        let (from, to) = month_window(year, month)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid month {}/{}", month, year)))?;

        VehicleRepository::new(self.pool.clone())
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Vehicle '{}' not found", vehicle_id)))?;

        let mut tx = self.pool.begin().await?;

        // Un solo builder por (vehículo, mes); el lock se libera al commit
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("monthly_aggregate:{}:{}-{}", vehicle_id, year, month))
            .execute(&mut *tx)
            .await?;

        let (total_distance_km, days_active) =
            DailyLogRepository::month_totals_in_tx(&mut tx, vehicle_id, from, to).await?;
        let (total_fuel_cost, total_maintenance_cost) =
            CostRepository::sums_in_tx(&mut tx, vehicle_id, from, to).await?;

        let aggregate = MonthlyAggregateRepository::replace_in_tx(
            &mut tx,
            &NewMonthlyAggregate {
                vehicle_id,
                year,
                month: month as i32,
                total_days_active: days_active as i32,
                total_distance_km,
                total_fuel_cost,
                total_maintenance_cost,
            },
        )
        .await?;

        tx.commit().await?;

        info!(
            "📈 Agregado mensual reconstruido: vehículo {} {}/{} ({} días activos, {} km)",
            vehicle_id, month, year, aggregate.total_days_active, aggregate.total_distance_km
        );
        Ok(aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_month_window_regular() {
        let (from, to) = month_window(2026, 3).unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());
    }

    #[test]
    fn test_month_window_december_wraps_year() {
        let (from, to) = month_window(2026, 12).unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2026, 12, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2027, 1, 1).unwrap());
    }

    #[test]
    fn test_month_window_invalid() {
        assert!(month_window(2026, 0).is_none());
        assert!(month_window(2026, 13).is_none());
    }

    #[test]
    fn test_decimal_distance_sum_is_exact() {
        // Las distancias diarias viven como NUMERIC(10,2): la suma mensual
        // coincide exacta, sin deriva de punto flotante
        let dailies = [
            Decimal::from_str("42.37").unwrap(),
            Decimal::from_str("38.91").unwrap(),
            Decimal::from_str("40.05").unwrap(),
        ];
        let total: Decimal = dailies.iter().copied().sum();
        assert_eq!(total, Decimal::from_str("121.33").unwrap());
    }
}
