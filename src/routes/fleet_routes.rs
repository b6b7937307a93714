use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::fleet_status_controller::FleetStatusController;
use crate::dto::fleet_dto::{FleetStatusQuery, FleetStatusResponse, VehicleStateResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_fleet_router() -> Router<AppState> {
    Router::new()
        .route("/status", get(fleet_status))
        .route("/vehicle/:id/state", get(vehicle_state))
}

async fn fleet_status(
    State(state): State<AppState>,
    Query(query): Query<FleetStatusQuery>,
) -> Result<Json<FleetStatusResponse>, AppError> {
    let controller = FleetStatusController::new(
        state.pool.clone(),
        state.tracking.clone(),
        state.redis.clone(),
    );
    let response = controller.snapshot(query.company_id).await?;
    Ok(Json(response))
}

async fn vehicle_state(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VehicleStateResponse>, AppError> {
    let controller = FleetStatusController::new(
        state.pool.clone(),
        state.tracking.clone(),
        state.redis.clone(),
    );
    let response = controller.vehicle_state(id).await?;
    Ok(Json(response))
}
