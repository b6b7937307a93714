//! Servicios del dominio
//!
//! Pipeline de derivación del core, en orden:
//! ingest -> matcher -> stop events -> (estado de flota, rollups).

pub mod daily_rollup_service;
pub mod fleet_status_service;
pub mod ingest_service;
pub mod matcher_service;
pub mod monthly_rollup_service;
pub mod stop_event_service;
