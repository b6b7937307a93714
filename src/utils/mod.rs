//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación
//! y matemática geoespacial.

pub mod errors;
pub mod geo;
pub mod validation;
