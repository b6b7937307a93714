//! Rollup diario
//!
//! Construye el DailyLog de un (vehículo, día de servicio) a partir de los
//! StopLogs y la telemetría aceptada. Idempotente: reconstruir con los
//! mismos insumos produce exactamente el mismo resultado y reemplaza el
//! registro anterior. El job corre entero dentro de una transacción
//! guardada por un advisory lock de Postgres sobre (vehículo, fecha), así
//! que nunca queda un DailyLog a medio escribir y el retry es seguro.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::config::TrackingConfig;
use crate::models::telemetry::StoredTelemetrySample;
use crate::models::{DailyLog, StopLog};
use crate::repositories::company_repository::CompanyRepository;
use crate::repositories::daily_log_repository::{DailyLogRepository, NewDailyLog};
use crate::repositories::stop_log_repository::StopLogRepository;
use crate::repositories::telemetry_repository::TelemetryRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::AppError;
use crate::utils::geo::haversine_distance_km;

/// Distancia recorrida: haversine acumulada entre muestras aceptadas
/// consecutivas, no la línea recta de inicio a fin
pub fn total_distance_km(samples: &[StoredTelemetrySample]) -> f64 {
    samples
        .windows(2)
        .map(|pair| {
            haversine_distance_km(
                pair[0].latitude,
                pair[0].longitude,
                pair[1].latitude,
                pair[1].longitude,
            )
        })
        .sum()
}

/// Muestras con velocidad por encima del umbral de exceso
pub fn count_speeding_samples(samples: &[StoredTelemetrySample], excessive_speed_kmh: f64) -> usize {
    samples
        .iter()
        .filter(|s| s.speed_kmh > excessive_speed_kmh)
        .count()
}

/// Frenadas bruscas: caída de velocidad entre muestras consecutivas por
/// encima del umbral, normalizada por el intervalo de muestreo
pub fn count_harsh_decelerations(
    samples: &[StoredTelemetrySample],
    harsh_deceleration_kmh_s: f64,
) -> usize {
    samples
        .windows(2)
        .filter(|pair| {
            let dt_secs = (pair[1].timestamp - pair[0].timestamp).num_seconds();
            if dt_secs <= 0 {
                return false;
            }
            let decel = (pair[0].speed_kmh - pair[1].speed_kmh) / dt_secs as f64;
            decel > harsh_deceleration_kmh_s
        })
        .count()
}

/// Score compuesto 0-100: puntualidad de paradas (60%), ausencia de exceso
/// de velocidad (25%) y ausencia de frenadas bruscas (15%)
pub fn efficiency_score(
    stops_total: usize,
    stops_on_time: usize,
    speeding_samples: usize,
    sample_count: usize,
    harsh_events: usize,
    interval_count: usize,
) -> f64 {
    let on_time_ratio = if stops_total == 0 {
        1.0
    } else {
        stops_on_time as f64 / stops_total as f64
    };
    let speeding_ratio = if sample_count == 0 {
        0.0
    } else {
        speeding_samples as f64 / sample_count as f64
    };
    let harsh_ratio = if interval_count == 0 {
        0.0
    } else {
        harsh_events as f64 / interval_count as f64
    };

    let score = 60.0 * on_time_ratio + 25.0 * (1.0 - speeding_ratio) + 15.0 * (1.0 - harsh_ratio);
    score.clamp(0.0, 100.0)
}

pub struct DailyRollupService {
    pool: PgPool,
    config: TrackingConfig,
}

impl DailyRollupService {
    pub fn new(pool: PgPool, config: TrackingConfig) -> Self {
        Self { pool, config }
    }

    /// Construir (o reconstruir) el DailyLog de un vehículo para un día de
    /// servicio. Devuelve None si el día no tiene telemetría aceptada.
    pub async fn build_daily_log(
        &self,
        vehicle_id: Uuid,
        service_date: NaiveDate,
    ) -> Result<Option<DailyLog>, AppError> {
        let vehicle = VehicleRepository::new(self.pool.clone())
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Vehicle '{}' not found", vehicle_id)))?;

        let company = CompanyRepository::new(self.pool.clone())
            .find_by_id(vehicle.company_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("Company '{}' missing for vehicle", vehicle.company_id))
            })?;

        let mut tx = self.pool.begin().await?;

        // Un solo builder por (vehículo, fecha); el lock se libera al commit
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("daily_log:{}:{}", vehicle_id, service_date))
            .execute(&mut *tx)
            .await?;

        let (window_start, window_end) = company.service_window_utc(service_date);
        let samples = TelemetryRepository::new(self.pool.clone())
            .find_accepted_between(vehicle_id, window_start, window_end)
            .await?;
        let stop_logs = StopLogRepository::new(self.pool.clone())
            .find_by_vehicle_and_date(vehicle_id, service_date)
            .await?;

        if samples.is_empty() {
            // Día sin telemetría: no hay DailyLog (y se purga uno previo
            // si un backfill dejó datos obsoletos)
            DailyLogRepository::delete_in_tx(&mut tx, vehicle_id, service_date).await?;
            tx.commit().await?;
            return Ok(None);
        }

        let new_log = self.compute(vehicle_id, service_date, &samples, &stop_logs)?;
        let log = DailyLogRepository::replace_in_tx(&mut tx, &new_log).await?;
        tx.commit().await?;

        info!(
            "📊 DailyLog reconstruido: vehículo {} fecha {} ({} km, score {})",
            vehicle_id, service_date, log.total_distance_km, log.efficiency_score
        );
        Ok(Some(log))
    }

    /// Derivación pura del DailyLog a partir de los insumos del día
    fn compute(
        &self,
        vehicle_id: Uuid,
        service_date: NaiveDate,
        samples: &[StoredTelemetrySample],
        stop_logs: &[StopLog],
    ) -> Result<NewDailyLog, AppError> {
        let first = samples.first().ok_or_else(|| {
            AppError::Internal("compute called without samples".to_string())
        })?;
        let last = samples.last().ok_or_else(|| {
            AppError::Internal("compute called without samples".to_string())
        })?;

        let distance = total_distance_km(samples);
        let speeding = count_speeding_samples(samples, self.config.excessive_speed_kmh);
        let harsh = count_harsh_decelerations(samples, self.config.harsh_deceleration_kmh_s);

        let stops_total = stop_logs.len();
        let stops_on_time = stop_logs
            .iter()
            .filter(|log| log.is_on_time(self.config.delay_threshold_min))
            .count();
        let stops_missed = stop_logs.iter().filter(|log| log.missed).count();

        let score = efficiency_score(
            stops_total,
            stops_on_time,
            speeding,
            samples.len(),
            harsh,
            samples.len().saturating_sub(1),
        );

        let total_distance_km = Decimal::from_f64_retain(distance)
            .ok_or_else(|| AppError::Internal("Invalid distance value".to_string()))?
            .round_dp(2);
        let efficiency = Decimal::from_f64_retain(score)
            .ok_or_else(|| AppError::Internal("Invalid efficiency score".to_string()))?
            .round_dp(2);

        Ok(NewDailyLog {
            vehicle_id,
            service_date,
            start_time: first.timestamp,
            end_time: last.timestamp,
            total_distance_km,
            efficiency_score: efficiency,
            stops_total: stops_total as i32,
            stops_on_time: stops_on_time as i32,
            stops_missed: stops_missed as i32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn sample(ts: &str, lat: f64, lng: f64, speed: f64) -> StoredTelemetrySample {
        StoredTelemetrySample {
            id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            timestamp: ts.parse().unwrap(),
            latitude: lat,
            longitude: lng,
            speed_kmh: speed,
            heading_deg: 0.0,
            accepted: true,
            rejection_reason: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_total_distance_accumulates_legs() {
        // Tres muestras colineales: la distancia es la suma de los tramos,
        // no la línea recta (que aquí coincide) ni cero
        let samples = vec![
            sample("2026-03-10T08:00:00Z", 40.4000, -3.7000, 30.0),
            sample("2026-03-10T08:01:00Z", 40.4050, -3.7000, 30.0),
            sample("2026-03-10T08:02:00Z", 40.4100, -3.7000, 30.0),
        ];
        let d = total_distance_km(&samples);
        // ~1.11 km en total (0.01 grados de latitud)
        assert!((d - 1.11).abs() < 0.02, "distancia inesperada: {}", d);

        // Determinismo: mismos insumos, mismo resultado exacto
        assert_eq!(d, total_distance_km(&samples));
    }

    #[test]
    fn test_total_distance_empty_and_single() {
        assert_eq!(total_distance_km(&[]), 0.0);
        let one = vec![sample("2026-03-10T08:00:00Z", 40.4, -3.7, 10.0)];
        assert_eq!(total_distance_km(&one), 0.0);
    }

    #[test]
    fn test_count_speeding_samples() {
        let samples = vec![
            sample("2026-03-10T08:00:00Z", 40.4, -3.7, 70.0),
            sample("2026-03-10T08:00:10Z", 40.4, -3.7, 85.0),
            sample("2026-03-10T08:00:20Z", 40.4, -3.7, 95.0),
        ];
        assert_eq!(count_speeding_samples(&samples, 80.0), 2);
    }

    #[test]
    fn test_count_harsh_decelerations() {
        // 60 -> 10 km/h en 5 s = 10 km/h/s de frenada (> umbral 9)
        let samples = vec![
            sample("2026-03-10T08:00:00Z", 40.4, -3.7, 60.0),
            sample("2026-03-10T08:00:05Z", 40.4, -3.7, 10.0),
            sample("2026-03-10T08:00:15Z", 40.4, -3.7, 15.0),
        ];
        assert_eq!(count_harsh_decelerations(&samples, 9.0), 1);
        // Acelerar no cuenta como frenada
        assert_eq!(count_harsh_decelerations(&samples, 0.4), 1);
    }

    #[test]
    fn test_efficiency_score_perfect_day() {
        let score = efficiency_score(10, 10, 0, 500, 0, 499);
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_efficiency_score_weights() {
        // Todas las paradas tarde, conducción limpia: quedan los 40 puntos
        // de suavidad
        let score = efficiency_score(10, 0, 0, 500, 0, 499);
        assert!((score - 40.0).abs() < 1e-9);

        // Mitad de paradas a tiempo: 30 + 40
        let score = efficiency_score(10, 5, 0, 500, 0, 499);
        assert!((score - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_efficiency_score_no_stops_day() {
        // Día sin paradas programadas: la puntualidad no penaliza
        let score = efficiency_score(0, 0, 0, 100, 0, 99);
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_efficiency_score_clamped() {
        let score = efficiency_score(0, 0, 100, 100, 99, 99);
        assert!((0.0..=100.0).contains(&score));
    }
}
