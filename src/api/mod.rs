//! API endpoints
//!
//! Este módulo arma el router principal de la API.

use axum::Router;

use crate::routes;
use crate::state::AppState;

/// Crear el router principal de la API
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/api/telemetry", routes::telemetry_routes::create_telemetry_router())
        .nest("/api/fleet", routes::fleet_routes::create_fleet_router())
        .nest("/api/reports", routes::report_routes::create_report_router())
}
