//! Ingestor de telemetría
//!
//! Camino de escritura de alta frecuencia del core. Por cada muestra:
//! valida (orden estricto por vehículo, coordenadas, plausibilidad de
//! movimiento), persiste la muestra cruda siempre (auditoría/replay) y,
//! si fue aceptada, corre el matcher y el registrador de paradas de forma
//! síncrona dentro de la misma llamada. Todo bajo el lock del vehículo:
//! serial por vehículo, paralelo entre vehículos.

use chrono::Duration;
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::TrackingConfig;
use crate::models::telemetry::{RejectionReason, TelemetrySample};
use crate::models::tracking_state::VehicleTrackingState;
use crate::models::{Company, Route, StopLog, Vehicle};
use crate::repositories::company_repository::CompanyRepository;
use crate::repositories::route_repository::RouteRepository;
use crate::repositories::telemetry_repository::TelemetryRepository;
use crate::repositories::tracking_state_repository::TrackingStateRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::matcher_service::{MatchCursor, RoutePlan, StopMatcher, StopTarget};
use crate::services::stop_event_service::StopEventRecorder;
use crate::state::VehicleLocks;
use crate::utils::errors::AppError;
use crate::utils::geo::is_valid_coordinate;

/// Resultado de una llamada de ingesta. Un rechazo de validación no es un
/// error: la muestra quedó guardada para auditoría y el caller recibe el
/// código de motivo.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub accepted: bool,
    pub rejection: Option<RejectionReason>,
    /// StopLog de llegada generado por esta muestra, si lo hubo
    pub stop_log: Option<StopLog>,
    /// StopLogs de paradas perdidas que esta muestra destrabó
    pub missed_stops: Vec<StopLog>,
}

impl IngestOutcome {
    /// Código de estado para la API
    pub fn status_code(&self) -> &'static str {
        match self.rejection {
            Some(reason) => reason.as_code(),
            None => "OK",
        }
    }

    fn rejected(reason: RejectionReason) -> Self {
        Self {
            accepted: false,
            rejection: Some(reason),
            stop_log: None,
            missed_stops: Vec::new(),
        }
    }
}

/// Validación de ingesta, pura: coordenadas en rango WGS84, orden estricto
/// de timestamps por vehículo y salto de velocidad plausible respecto de la
/// última muestra aceptada.
pub fn validate_sample(
    sample: &TelemetrySample,
    state: &VehicleTrackingState,
    config: &TrackingConfig,
) -> Option<RejectionReason> {
    if !is_valid_coordinate(sample.latitude, sample.longitude) {
        return Some(RejectionReason::InvalidCoordinate);
    }

    if let Some(last_ts) = state.last_timestamp {
        if sample.timestamp <= last_ts {
            return Some(RejectionReason::StaleTimestamp);
        }

        if let Some(last_speed) = state.last_speed_kmh {
            let dt_secs = (sample.timestamp - last_ts).num_seconds();
            if dt_secs > 0 {
                let accel = (sample.speed_kmh - last_speed).abs() / dt_secs as f64;
                if accel > config.max_acceleration_kmh_s {
                    return Some(RejectionReason::ImplausibleMotion);
                }
            }
        }
    }

    if !sample.speed_kmh.is_finite() || sample.speed_kmh < 0.0 {
        return Some(RejectionReason::ImplausibleMotion);
    }

    None
}

pub struct IngestService {
    pool: PgPool,
    config: TrackingConfig,
    locks: VehicleLocks,
}

impl IngestService {
    pub fn new(pool: PgPool, config: TrackingConfig, locks: VehicleLocks) -> Self {
        Self {
            pool,
            config,
            locks,
        }
    }

    /// Ingerir una muestra de telemetría para un vehículo
    pub async fn ingest(&self, sample: TelemetrySample) -> Result<IngestOutcome, AppError> {
        // Serial por vehículo: dos muestras concurrentes del mismo vehículo
        // se procesan en orden; vehículos distintos no se bloquean entre sí
        let lock = self.locks.for_vehicle(sample.vehicle_id).await;
        let _guard = lock.lock().await;

        let vehicle_repo = VehicleRepository::new(self.pool.clone());
        let vehicle = vehicle_repo
            .find_by_id(sample.vehicle_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Vehicle '{}' not found", sample.vehicle_id))
            })?;

        let company = CompanyRepository::new(self.pool.clone())
            .find_by_id(vehicle.company_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("Company '{}' missing for vehicle", vehicle.company_id))
            })?;

        let service_date = company.service_date(sample.timestamp);

        let state_repo = TrackingStateRepository::new(self.pool.clone());
        let mut state = match state_repo.find_by_vehicle(sample.vehicle_id).await? {
            Some(state) => state,
            None => VehicleTrackingState::fresh(sample.vehicle_id, service_date),
        };

        // Cambio de día de servicio: el cursor de matching se reinicia,
        // el orden de timestamps se mantiene a través de los días
        if state.service_date != service_date {
            debug!(
                "📅 Vehículo {} cambia de día de servicio: {} -> {}",
                sample.vehicle_id, state.service_date, service_date
            );
            state.service_date = service_date;
            state.last_matched_seq = crate::models::tracking_state::NO_STOP_MATCHED;
            state.dwell_seq = None;
            state.dwell_started_at = None;
        }

        let telemetry_repo = TelemetryRepository::new(self.pool.clone());

        if let Some(reason) = validate_sample(&sample, &state, &self.config) {
            // La muestra rechazada se guarda igual, flaggeada, y no toca
            // ni el cursor ni al matcher
            telemetry_repo
                .insert(&sample, false, Some(reason.as_code()))
                .await?;
            warn!(
                "🚫 Muestra rechazada ({}) para vehículo {}",
                reason.as_code(),
                sample.vehicle_id
            );
            return Ok(IngestOutcome::rejected(reason));
        }

        telemetry_repo.insert(&sample, true, None).await?;

        // Matching contra la ruta asignada, si la hay
        let (stop_log, missed_stops, cursor) = match self
            .route_plan_for(&vehicle, &company, service_date)
            .await?
        {
            Some(plan) => self.run_matcher(&sample, &plan, &state, service_date).await?,
            None => (
                None,
                Vec::new(),
                MatchCursor {
                    last_matched_seq: state.last_matched_seq,
                    dwell_seq: state.dwell_seq,
                    dwell_started_at: state.dwell_started_at,
                },
            ),
        };

        // Actualizar cursor y última posición bajo el mismo lock
        state.last_matched_seq = cursor.last_matched_seq;
        state.dwell_seq = cursor.dwell_seq;
        state.dwell_started_at = cursor.dwell_started_at;
        state.recent_avg_speed_kmh = Some(VehicleTrackingState::blend_avg_speed(
            state.recent_avg_speed_kmh,
            sample.speed_kmh,
        ));
        state.last_timestamp = Some(sample.timestamp);
        state.last_latitude = Some(sample.latitude);
        state.last_longitude = Some(sample.longitude);
        state.last_speed_kmh = Some(sample.speed_kmh);
        state_repo.upsert(&state).await?;

        Ok(IngestOutcome {
            accepted: true,
            rejection: None,
            stop_log,
            missed_stops,
        })
    }

    /// Plan de ruta del día para el vehículo: paradas ordenadas con su
    /// horario resuelto a UTC según el offset del operador
    async fn route_plan_for(
        &self,
        vehicle: &Vehicle,
        company: &Company,
        service_date: chrono::NaiveDate,
    ) -> Result<Option<RoutePlan>, AppError> {
        let Some(route_id) = vehicle.assigned_route_id else {
            return Ok(None);
        };

        let route_repo = RouteRepository::new(self.pool.clone());
        let Some(route) = route_repo.find_by_id(route_id).await? else {
            warn!(
                "⚠️ Vehículo {} tiene asignada la ruta {} pero no existe",
                vehicle.id, route_id
            );
            return Ok(None);
        };

        let stops = route_repo.find_stops(route.id).await?;
        if stops.is_empty() {
            return Ok(None);
        }

        Ok(Some(Self::build_plan(
            &route,
            &stops,
            service_date,
            company.utc_offset_minutes,
        )))
    }

    /// Construir el plan de matching a partir de la ruta y sus paradas
    pub fn build_plan(
        route: &Route,
        stops: &[crate::models::RouteStop],
        service_date: chrono::NaiveDate,
        utc_offset_minutes: i32,
    ) -> RoutePlan {
        RoutePlan {
            route_id: route.id,
            stops: stops
                .iter()
                .map(|stop| StopTarget {
                    stop_id: stop.id,
                    seq: stop.seq,
                    latitude: stop.latitude,
                    longitude: stop.longitude,
                    scheduled_arrival: stop.scheduled_arrival_utc(
                        route.direction,
                        service_date,
                        utc_offset_minutes,
                    ),
                })
                .collect(),
        }
    }

    async fn run_matcher(
        &self,
        sample: &TelemetrySample,
        plan: &RoutePlan,
        state: &VehicleTrackingState,
        service_date: chrono::NaiveDate,
    ) -> Result<(Option<StopLog>, Vec<StopLog>, MatchCursor), AppError> {
        let matcher = StopMatcher::new(self.config.clone());
        let cursor = MatchCursor {
            last_matched_seq: state.last_matched_seq,
            dwell_seq: state.dwell_seq,
            dwell_started_at: state.dwell_started_at,
        };

        let evaluation = matcher.evaluate(sample, plan, &cursor);

        let recorder = StopEventRecorder::new(self.pool.clone());
        let mut missed_stops = Vec::with_capacity(evaluation.missed.len());
        for missed in &evaluation.missed {
            let log = recorder
                .record_missed(
                    sample.vehicle_id,
                    plan.route_id,
                    missed.stop_id,
                    service_date,
                    missed.scheduled_arrival,
                )
                .await?;
            missed_stops.push(log);
        }

        let stop_log = match &evaluation.arrived {
            Some(arrived) => {
                let log = recorder
                    .record_arrival(
                        sample.vehicle_id,
                        plan.route_id,
                        arrived.stop_id,
                        service_date,
                        arrived.scheduled_arrival,
                        arrived.actual_arrival,
                    )
                    .await?;
                info!(
                    "✅ Vehículo {} llegó a la parada seq {} con {} min de retraso",
                    sample.vehicle_id, arrived.seq, log.delay_minutes
                );
                Some(log)
            }
            None => None,
        };

        Ok((stop_log, missed_stops, evaluation.cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample(ts: &str, lat: f64, lng: f64, speed: f64) -> TelemetrySample {
        TelemetrySample {
            vehicle_id: Uuid::new_v4(),
            timestamp: ts.parse().unwrap(),
            latitude: lat,
            longitude: lng,
            speed_kmh: speed,
            heading_deg: 90.0,
        }
    }

    fn state_with_last(ts: &str, speed: f64) -> VehicleTrackingState {
        let mut state = VehicleTrackingState::fresh(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
        );
        state.last_timestamp = Some(ts.parse().unwrap());
        state.last_speed_kmh = Some(speed);
        state
    }

    #[test]
    fn test_rejects_invalid_coordinate() {
        let cfg = TrackingConfig::default();
        let state = VehicleTrackingState::fresh(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
        );
        let s = sample("2026-03-10T08:00:00Z", 95.0, 2.35, 10.0);
        assert_eq!(
            validate_sample(&s, &state, &cfg),
            Some(RejectionReason::InvalidCoordinate)
        );
    }

    #[test]
    fn test_rejects_stale_timestamp() {
        let cfg = TrackingConfig::default();
        let state = state_with_last("2026-03-10T08:05:00Z", 20.0);

        // Timestamp anterior a la última muestra aceptada
        let s = sample("2026-03-10T08:04:00Z", 40.4, -3.7, 20.0);
        assert_eq!(
            validate_sample(&s, &state, &cfg),
            Some(RejectionReason::StaleTimestamp)
        );

        // Timestamp duplicado también se rechaza (orden estricto)
        let s = sample("2026-03-10T08:05:00Z", 40.4, -3.7, 20.0);
        assert_eq!(
            validate_sample(&s, &state, &cfg),
            Some(RejectionReason::StaleTimestamp)
        );
    }

    #[test]
    fn test_rejects_implausible_motion() {
        let cfg = TrackingConfig::default();
        let state = state_with_last("2026-03-10T08:00:00Z", 10.0);

        // 10 -> 80 km/h en 2 s = 35 km/h/s, muy por encima del máximo
        let s = sample("2026-03-10T08:00:02Z", 40.4, -3.7, 80.0);
        assert_eq!(
            validate_sample(&s, &state, &cfg),
            Some(RejectionReason::ImplausibleMotion)
        );
    }

    #[test]
    fn test_accepts_plausible_sample() {
        let cfg = TrackingConfig::default();
        let state = state_with_last("2026-03-10T08:00:00Z", 10.0);

        // 10 -> 40 km/h en 10 s = 3 km/h/s, plausible
        let s = sample("2026-03-10T08:00:10Z", 40.4, -3.7, 40.0);
        assert_eq!(validate_sample(&s, &state, &cfg), None);
    }

    #[test]
    fn test_first_sample_always_checked_only_for_coords() {
        let cfg = TrackingConfig::default();
        let state = VehicleTrackingState::fresh(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
        );
        let s = sample("2026-03-10T08:00:00Z", 40.4, -3.7, 200.0);
        // Sin muestra previa no hay referencia de aceleración
        assert_eq!(validate_sample(&s, &state, &cfg), None);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            IngestOutcome::rejected(RejectionReason::StaleTimestamp).status_code(),
            "STALE_TIMESTAMP"
        );
        let ok = IngestOutcome {
            accepted: true,
            rejection: None,
            stop_log: None,
            missed_stops: Vec::new(),
        };
        assert_eq!(ok.status_code(), "OK");
    }
}
