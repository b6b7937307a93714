//! Registrador de eventos de parada
//!
//! Convierte las decisiones del matcher en StopLogs inmutables. La unicidad
//! por (vehicle_id, stop_id, service_date) la garantiza un insert atómico
//! "si no existe" en el repositorio: una llegada duplicada (p.ej. un mensaje
//! de ingesta re-entregado) es un no-op que devuelve el registro existente.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::StopLog;
use crate::repositories::stop_log_repository::{NewStopLog, StopLogRepository};
use crate::utils::errors::AppError;

/// Retraso en minutos enteros: max(0, round(actual - scheduled)).
/// Se calcula una sola vez al crear el StopLog y nunca se recalcula,
/// aunque después se edite el horario programado de la ruta.
pub fn compute_delay_minutes(scheduled: DateTime<Utc>, actual: DateTime<Utc>) -> i64 {
    let delta_secs = (actual - scheduled).num_seconds();
    if delta_secs <= 0 {
        return 0;
    }
    ((delta_secs as f64) / 60.0).round() as i64
}

pub struct StopEventRecorder {
    repository: StopLogRepository,
}

impl StopEventRecorder {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: StopLogRepository::new(pool),
        }
    }

    /// Registrar una llegada confirmada. Idempotente: si ya existe un
    /// StopLog para (vehículo, parada, día) devuelve el existente.
    pub async fn record_arrival(
        &self,
        vehicle_id: Uuid,
        route_id: Uuid,
        stop_id: Uuid,
        service_date: NaiveDate,
        scheduled_arrival: DateTime<Utc>,
        actual_arrival: DateTime<Utc>,
    ) -> Result<StopLog, AppError> {
        let delay_minutes = compute_delay_minutes(scheduled_arrival, actual_arrival);

        let log = self
            .repository
            .insert_if_absent(NewStopLog {
                vehicle_id,
                route_id,
                stop_id,
                service_date,
                scheduled_arrival,
                actual_arrival: Some(actual_arrival),
                delay_minutes,
                missed: false,
            })
            .await?;

        info!(
            "🚏 Llegada registrada: vehículo {} parada {} ({}) retraso {} min",
            vehicle_id, stop_id, service_date, log.delay_minutes
        );
        Ok(log)
    }

    /// Registrar una parada perdida (timeout vencido sin llegada).
    /// Produce un StopLog con actual_arrival NULL y flag missed, para que
    /// el matching pueda seguir avanzando sin frenar la ruta.
    pub async fn record_missed(
        &self,
        vehicle_id: Uuid,
        route_id: Uuid,
        stop_id: Uuid,
        service_date: NaiveDate,
        scheduled_arrival: DateTime<Utc>,
    ) -> Result<StopLog, AppError> {
        let log = self
            .repository
            .insert_if_absent(NewStopLog {
                vehicle_id,
                route_id,
                stop_id,
                service_date,
                scheduled_arrival,
                actual_arrival: None,
                delay_minutes: 0,
                missed: true,
            })
            .await?;

        info!(
            "⏭️ Parada perdida: vehículo {} parada {} ({})",
            vehicle_id, stop_id, service_date
        );
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_delay_is_never_negative() {
        // Llegada adelantada: retraso 0, no negativo
        let delay = compute_delay_minutes(ts("2026-03-10T08:00:00Z"), ts("2026-03-10T07:50:00Z"));
        assert_eq!(delay, 0);
    }

    #[test]
    fn test_delay_exact_minutes() {
        let delay = compute_delay_minutes(ts("2026-03-10T08:00:00Z"), ts("2026-03-10T08:03:00Z"));
        assert_eq!(delay, 3);
    }

    #[test]
    fn test_delay_rounds_to_whole_minutes() {
        // 3 min 40 s redondea a 4
        let delay = compute_delay_minutes(ts("2026-03-10T08:00:00Z"), ts("2026-03-10T08:03:40Z"));
        assert_eq!(delay, 4);
        // 3 min 20 s redondea a 3
        let delay = compute_delay_minutes(ts("2026-03-10T08:00:00Z"), ts("2026-03-10T08:03:20Z"));
        assert_eq!(delay, 3);
    }

    #[test]
    fn test_delay_on_time() {
        let delay = compute_delay_minutes(ts("2026-03-10T08:00:00Z"), ts("2026-03-10T08:00:00Z"));
        assert_eq!(delay, 0);
    }
}
