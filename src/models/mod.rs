//! Modelos del dominio
//!
//! Este módulo contiene los modelos del core de tracking: flota, rutas,
//! telemetría y los agregados derivados (StopLog, DailyLog, MonthlyAggregate).

pub mod company;
pub mod daily_log;
pub mod fleet_status;
pub mod monthly;
pub mod route;
pub mod stop_log;
pub mod telemetry;
pub mod tracking_state;
pub mod vehicle;

pub use company::Company;
pub use daily_log::DailyLog;
pub use fleet_status::{FleetStatusSnapshot, VehicleState};
pub use monthly::MonthlyAggregate;
pub use route::{Route, RouteDirection, RouteStop};
pub use stop_log::StopLog;
pub use telemetry::{RejectionReason, TelemetrySample};
pub use tracking_state::VehicleTrackingState;
pub use vehicle::{Vehicle, VehicleOperationalStatus};
