use crate::config::TrackingConfig;
use crate::dto::telemetry_dto::{IngestTelemetryRequest, IngestTelemetryResponse};
use crate::models::telemetry::TelemetrySample;
use crate::services::ingest_service::IngestService;
use crate::state::VehicleLocks;
use crate::utils::errors::AppError;
use crate::utils::validation::{validate_datetime, validate_uuid};
use sqlx::PgPool;

pub struct TelemetryController {
    ingest_service: IngestService,
}

impl TelemetryController {
    pub fn new(pool: PgPool, config: TrackingConfig, locks: VehicleLocks) -> Self {
        Self {
            ingest_service: IngestService::new(pool, config, locks),
        }
    }

    /// Ingerir una muestra. Los rechazos de validación de dominio (timestamp
    /// viejo, coordenada inválida, movimiento implausible) NO son errores
    /// HTTP: vuelven como código de motivo, porque perder un ping de GPS no
    /// puede frenar el stream de tracking del vehículo.
    pub async fn ingest(
        &self,
        request: IngestTelemetryRequest,
    ) -> Result<IngestTelemetryResponse, AppError> {
        let vehicle_id = validate_uuid(&request.vehicle_id)
            .map_err(|_| AppError::BadRequest(format!("Invalid vehicle_id '{}'", request.vehicle_id)))?;
        let timestamp = validate_datetime(&request.timestamp)
            .map_err(|_| AppError::BadRequest(format!("Invalid timestamp '{}'", request.timestamp)))?;

        let sample = TelemetrySample {
            vehicle_id,
            timestamp,
            latitude: request.lat,
            longitude: request.lng,
            speed_kmh: request.speed,
            heading_deg: request.heading,
        };

        let outcome = self.ingest_service.ingest(sample).await?;

        Ok(IngestTelemetryResponse {
            status: outcome.status_code().to_string(),
            accepted: outcome.accepted,
            stop_log: outcome.stop_log.map(Into::into),
            missed_stops: outcome.missed_stops.into_iter().map(Into::into).collect(),
        })
    }
}
