//! Configuración del sistema
//!
//! Este módulo contiene la configuración de entorno y los parámetros
//! del pipeline de tracking.

pub mod environment;
pub mod tracking;

pub use environment::EnvironmentConfig;
pub use tracking::TrackingConfig;
