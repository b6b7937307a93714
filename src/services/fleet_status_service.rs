//! Agregador de estado de flota
//!
//! Vista en vivo del estado de cada vehículo (ACTIVE / DELAYED / OFFLINE),
//! derivada de la frescura de telemetría y del último StopLog del día.
//! Modelo pull: se recalcula en cada lectura desde lookups puntuales, sin
//! mantener un segundo source of truth; el snapshot por operador se cachea
//! en Redis con TTL igual al intervalo de polling del cliente de mapa.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::cache::redis_client::RedisClient;
use crate::cache::CacheOperations;
use crate::config::TrackingConfig;
use crate::models::fleet_status::{FleetStatusSnapshot, VehicleState, VehicleStatus};
use crate::models::tracking_state::VehicleTrackingState;
use crate::models::{Company, Vehicle};
use crate::repositories::company_repository::CompanyRepository;
use crate::repositories::route_repository::RouteRepository;
use crate::repositories::stop_log_repository::StopLogRepository;
use crate::repositories::tracking_state_repository::TrackingStateRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::ingest_service::IngestService;
use crate::utils::errors::AppError;
use crate::utils::geo::{haversine_distance_m, travel_time_secs};

/// Proyección de llegada a la próxima parada, para detectar retraso
/// antes de que el vehículo llegue
#[derive(Debug, Clone, Copy)]
pub struct ArrivalProjection {
    pub projected_arrival: DateTime<Utc>,
    pub scheduled_arrival: DateTime<Utc>,
}

/// Clasificación pura del estado de un vehículo. Nunca falla: un vehículo
/// sin telemetría (recién dado de alta) es OFFLINE, no un error, porque el
/// dashboard tiene que renderizar la flota completa con datos parciales.
pub fn classify_vehicle(
    now: DateTime<Utc>,
    last_accepted_at: Option<DateTime<Utc>>,
    latest_delay_minutes: Option<i64>,
    projection: Option<ArrivalProjection>,
    config: &TrackingConfig,
) -> VehicleState {
    let fresh = match last_accepted_at {
        Some(last) => now - last <= Duration::seconds(config.freshness_window_secs),
        None => false,
    };
    if !fresh {
        return VehicleState::Offline;
    }

    if let Some(delay) = latest_delay_minutes {
        if delay > config.delay_threshold_min {
            return VehicleState::Delayed;
        }
    }

    if let Some(projection) = projection {
        let slack = Duration::minutes(config.delay_threshold_min);
        if projection.projected_arrival > projection.scheduled_arrival + slack {
            return VehicleState::Delayed;
        }
    }

    VehicleState::Active
}

pub struct FleetStatusService {
    pool: PgPool,
    config: TrackingConfig,
    redis: RedisClient,
}

impl FleetStatusService {
    pub fn new(pool: PgPool, config: TrackingConfig, redis: RedisClient) -> Self {
        Self {
            pool,
            config,
            redis,
        }
    }

    /// Snapshot de flota por operador, con cache read-through de TTL corto
    pub async fn snapshot(&self, company_id: Uuid) -> Result<FleetStatusSnapshot, AppError> {
        let cache_key = self.redis.fleet_snapshot_key(&company_id.to_string());
        if let Ok(Some(cached)) = self.redis.get::<FleetStatusSnapshot>(&cache_key).await {
            debug!("📥 Snapshot de flota desde cache para operador {}", company_id);
            return Ok(cached);
        }

        let snapshot = self.compute_snapshot(company_id).await?;

        // El cache es best-effort: si Redis falla, el snapshot igual sale
        if let Err(e) = self
            .redis
            .set(&cache_key, &snapshot, self.config.snapshot_ttl_secs)
            .await
        {
            debug!("⚠️ No se pudo cachear el snapshot de flota: {}", e);
        }

        Ok(snapshot)
    }

    /// Estado en vivo de un solo vehículo
    pub async fn vehicle_state(&self, vehicle_id: Uuid) -> Result<VehicleState, AppError> {
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

        let status = self.vehicle_status(&vehicle, &company, Utc::now()).await?;
        Ok(status.state)
    }

    async fn compute_snapshot(&self, company_id: Uuid) -> Result<FleetStatusSnapshot, AppError> {
        let company = CompanyRepository::new(self.pool.clone())
            .find_by_id(company_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Company '{}' not found", company_id)))?;

        let vehicles = VehicleRepository::new(self.pool.clone())
            .find_by_company(company_id)
            .await?;

        let now = Utc::now();
        let mut statuses = Vec::with_capacity(vehicles.len());
        for vehicle in &vehicles {
            statuses.push(self.vehicle_status(vehicle, &company, now).await?);
        }

        let active_count = statuses.iter().filter(|s| s.state == VehicleState::Active).count() as i64;
        let delayed_count = statuses.iter().filter(|s| s.state == VehicleState::Delayed).count() as i64;
        let offline_count = statuses.iter().filter(|s| s.state == VehicleState::Offline).count() as i64;

        Ok(FleetStatusSnapshot {
            company_id,
            active_count,
            delayed_count,
            offline_count,
            total_count: statuses.len() as i64,
            vehicles: statuses,
            computed_at: now,
        })
    }

    /// Estado de un vehículo a partir de lookups puntuales: cursor de
    /// tracking, último StopLog del día y proyección a la próxima parada
    async fn vehicle_status(
        &self,
        vehicle: &Vehicle,
        company: &Company,
        now: DateTime<Utc>,
    ) -> Result<VehicleStatus, AppError> {
        let state = TrackingStateRepository::new(self.pool.clone())
            .find_by_vehicle(vehicle.id)
            .await?;

        let service_date = company.service_date(now);
        let latest_log = StopLogRepository::new(self.pool.clone())
            .find_latest_for_vehicle_date(vehicle.id, service_date)
            .await?;
        let latest_delay = latest_log.as_ref().map(|log| log.delay_minutes);

        let projection = match &state {
            Some(state) => self.project_next_arrival(vehicle, company, state).await?,
            None => None,
        };

        let classified = classify_vehicle(
            now,
            state.as_ref().and_then(|s| s.last_timestamp),
            latest_delay,
            projection,
            &self.config,
        );

        Ok(VehicleStatus {
            vehicle_id: vehicle.id,
            registration_number: vehicle.registration_number.clone(),
            state: classified,
            last_latitude: state.as_ref().and_then(|s| s.last_latitude),
            last_longitude: state.as_ref().and_then(|s| s.last_longitude),
            last_seen_at: state.as_ref().and_then(|s| s.last_timestamp),
            current_delay_minutes: latest_delay,
        })
    }

    /// Proyección de llegada a la próxima parada: distancia actual dividida
    /// por la velocidad media reciente. Sin velocidad útil no se proyecta.
    async fn project_next_arrival(
        &self,
        vehicle: &Vehicle,
        company: &Company,
        state: &VehicleTrackingState,
    ) -> Result<Option<ArrivalProjection>, AppError> {
        let (Some(lat), Some(lng), Some(last_ts), Some(avg_speed)) = (
            state.last_latitude,
            state.last_longitude,
            state.last_timestamp,
            state.recent_avg_speed_kmh,
        ) else {
            return Ok(None);
        };

        let Some(route_id) = vehicle.assigned_route_id else {
            return Ok(None);
        };
        let route_repo = RouteRepository::new(self.pool.clone());
        let Some(route) = route_repo.find_by_id(route_id).await? else {
            return Ok(None);
        };
        let stops = route_repo.find_stops(route.id).await?;

        let plan = IngestService::build_plan(
            &route,
            &stops,
            state.service_date,
            company.utc_offset_minutes,
        );
        let Some(next) = plan.stops.get((state.last_matched_seq + 1) as usize) else {
            return Ok(None);
        };

        let distance_m = haversine_distance_m(lat, lng, next.latitude, next.longitude);
        let Some(secs) = travel_time_secs(distance_m, avg_speed) else {
            return Ok(None);
        };

        Ok(Some(ArrivalProjection {
            projected_arrival: last_ts + Duration::seconds(secs),
            scheduled_arrival: next.scheduled_arrival,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_offline_without_any_telemetry() {
        let cfg = TrackingConfig::default();
        let state = classify_vehicle(ts("2026-03-10T08:00:00Z"), None, None, None, &cfg);
        assert_eq!(state, VehicleState::Offline);
    }

    #[test]
    fn test_offline_after_freshness_window() {
        let cfg = TrackingConfig::default();
        // Sin telemetría hace 4 minutos (ventana: 3)
        let state = classify_vehicle(
            ts("2026-03-10T08:04:00Z"),
            Some(ts("2026-03-10T08:00:00Z")),
            None,
            None,
            &cfg,
        );
        assert_eq!(state, VehicleState::Offline);
    }

    #[test]
    fn test_delayed_by_stop_log_even_if_fresh() {
        let cfg = TrackingConfig::default();
        // Última muestra fresca pero el último StopLog del día lleva 12 min
        // de retraso (> umbral 5)
        let state = classify_vehicle(
            ts("2026-03-10T08:01:00Z"),
            Some(ts("2026-03-10T08:00:30Z")),
            Some(12),
            None,
            &cfg,
        );
        assert_eq!(state, VehicleState::Delayed);
    }

    #[test]
    fn test_delayed_by_projection() {
        let cfg = TrackingConfig::default();
        let projection = ArrivalProjection {
            projected_arrival: ts("2026-03-10T08:30:00Z"),
            scheduled_arrival: ts("2026-03-10T08:20:00Z"),
        };
        let state = classify_vehicle(
            ts("2026-03-10T08:01:00Z"),
            Some(ts("2026-03-10T08:00:30Z")),
            Some(2),
            Some(projection),
            &cfg,
        );
        assert_eq!(state, VehicleState::Delayed);
    }

    #[test]
    fn test_active_when_fresh_and_on_time() {
        let cfg = TrackingConfig::default();
        let projection = ArrivalProjection {
            projected_arrival: ts("2026-03-10T08:18:00Z"),
            scheduled_arrival: ts("2026-03-10T08:20:00Z"),
        };
        let state = classify_vehicle(
            ts("2026-03-10T08:01:00Z"),
            Some(ts("2026-03-10T08:00:30Z")),
            Some(3),
            Some(projection),
            &cfg,
        );
        assert_eq!(state, VehicleState::Active);
    }
}
