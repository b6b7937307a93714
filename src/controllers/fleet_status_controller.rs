use crate::cache::redis_client::RedisClient;
use crate::config::TrackingConfig;
use crate::dto::fleet_dto::{FleetStatusResponse, VehicleStateResponse};
use crate::services::fleet_status_service::FleetStatusService;
use crate::utils::errors::AppError;
use sqlx::PgPool;
use uuid::Uuid;

pub struct FleetStatusController {
    service: FleetStatusService,
}

impl FleetStatusController {
    pub fn new(pool: PgPool, config: TrackingConfig, redis: RedisClient) -> Self {
        Self {
            service: FleetStatusService::new(pool, config, redis),
        }
    }

    /// Snapshot de flota para el cliente de mapa en vivo
    pub async fn snapshot(&self, company_id: Uuid) -> Result<FleetStatusResponse, AppError> {
        let snapshot = self.service.snapshot(company_id).await?;
        Ok(snapshot.into())
    }

    /// Estado en vivo de un solo vehículo
    pub async fn vehicle_state(&self, vehicle_id: Uuid) -> Result<VehicleStateResponse, AppError> {
        let state = self.service.vehicle_state(vehicle_id).await?;
        Ok(VehicleStateResponse { vehicle_id, state })
    }
}
