use axum::{extract::State, routing::post, Json, Router};

use crate::controllers::telemetry_controller::TelemetryController;
use crate::dto::telemetry_dto::{IngestTelemetryRequest, IngestTelemetryResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_telemetry_router() -> Router<AppState> {
    Router::new().route("/", post(ingest_sample))
}

async fn ingest_sample(
    State(state): State<AppState>,
    Json(request): Json<IngestTelemetryRequest>,
) -> Result<Json<IngestTelemetryResponse>, AppError> {
    let controller = TelemetryController::new(
        state.pool.clone(),
        state.tracking.clone(),
        state.vehicle_locks.clone(),
    );
    let response = controller.ingest(request).await?;
    Ok(Json(response))
}
