//! Repositorios de acceso a datos
//!
//! Capa de acceso a PostgreSQL. Los repositorios de vehículos, rutas y
//! operadores son de solo lectura: esas entidades las administran módulos
//! externos y el core nunca las muta.

pub mod company_repository;
pub mod cost_repository;
pub mod daily_log_repository;
pub mod monthly_aggregate_repository;
pub mod route_repository;
pub mod stop_log_repository;
pub mod telemetry_repository;
pub mod tracking_state_repository;
pub mod vehicle_repository;
