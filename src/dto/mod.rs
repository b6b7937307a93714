//! DTOs de la API
//!
//! Requests y responses de los endpoints, separados de los modelos de dominio.

pub mod fleet_dto;
pub mod report_dto;
pub mod telemetry_dto;

use serde::{Deserialize, Serialize};

/// Envoltorio genérico de respuesta de la API
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: Some(data),
        }
    }
}
