use crate::models::telemetry::{StoredTelemetrySample, TelemetrySample};
use crate::utils::errors::AppError;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct TelemetryRepository {
    pool: PgPool,
}

impl TelemetryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persistir una muestra cruda con su veredicto de validación.
    /// Se guarda siempre, aceptada o no, para auditoría y replay.
    pub async fn insert(
        &self,
        sample: &TelemetrySample,
        accepted: bool,
        rejection_reason: Option<&str>,
    ) -> Result<StoredTelemetrySample, AppError> {
        let stored = sqlx::query_as::<_, StoredTelemetrySample>(
            r#"
            INSERT INTO telemetry_samples
                (id, vehicle_id, timestamp, latitude, longitude,
                 speed_kmh, heading_deg, accepted, rejection_reason, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(sample.vehicle_id)
        .bind(sample.timestamp)
        .bind(sample.latitude)
        .bind(sample.longitude)
        .bind(sample.speed_kmh)
        .bind(sample.heading_deg)
        .bind(accepted)
        .bind(rejection_reason)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    /// Muestras aceptadas de un vehículo dentro de una ventana UTC,
    /// ordenadas por timestamp ascendente
    pub async fn find_accepted_between(
        &self,
        vehicle_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StoredTelemetrySample>, AppError> {
        let samples = sqlx::query_as::<_, StoredTelemetrySample>(
            r#"
            SELECT * FROM telemetry_samples
            WHERE vehicle_id = $1 AND accepted = TRUE
              AND timestamp >= $2 AND timestamp < $3
            ORDER BY timestamp ASC
            "#,
        )
        .bind(vehicle_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(samples)
    }
}
