use crate::models::VehicleTrackingState;
use crate::utils::errors::AppError;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

pub struct TrackingStateRepository {
    pool: PgPool,
}

impl TrackingStateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_vehicle(
        &self,
        vehicle_id: Uuid,
    ) -> Result<Option<VehicleTrackingState>, AppError> {
        let state = sqlx::query_as::<_, VehicleTrackingState>(
            "SELECT * FROM vehicle_tracking_state WHERE vehicle_id = $1",
        )
        .bind(vehicle_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(state)
    }

    /// Upsert del cursor de tracking. Siempre se llama bajo el lock por
    /// vehículo del ingestor, así que no hay escritores concurrentes para
    /// la misma fila.
    pub async fn upsert(&self, state: &VehicleTrackingState) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO vehicle_tracking_state
                (vehicle_id, service_date, last_matched_seq, dwell_seq, dwell_started_at,
                 last_timestamp, last_latitude, last_longitude, last_speed_kmh,
                 recent_avg_speed_kmh, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (vehicle_id) DO UPDATE SET
                service_date = EXCLUDED.service_date,
                last_matched_seq = EXCLUDED.last_matched_seq,
                dwell_seq = EXCLUDED.dwell_seq,
                dwell_started_at = EXCLUDED.dwell_started_at,
                last_timestamp = EXCLUDED.last_timestamp,
                last_latitude = EXCLUDED.last_latitude,
                last_longitude = EXCLUDED.last_longitude,
                last_speed_kmh = EXCLUDED.last_speed_kmh,
                recent_avg_speed_kmh = EXCLUDED.recent_avg_speed_kmh,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(state.vehicle_id)
        .bind(state.service_date)
        .bind(state.last_matched_seq)
        .bind(state.dwell_seq)
        .bind(state.dwell_started_at)
        .bind(state.last_timestamp)
        .bind(state.last_latitude)
        .bind(state.last_longitude)
        .bind(state.last_speed_kmh)
        .bind(state.recent_avg_speed_kmh)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
