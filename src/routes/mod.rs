//! Routers por recurso

pub mod fleet_routes;
pub mod report_routes;
pub mod telemetry_routes;
