//! Controllers
//!
//! Orquestan validación de requests, servicios de dominio y mapeo a DTOs.

pub mod fleet_status_controller;
pub mod report_controller;
pub mod telemetry_controller;
