//! Modelo de Route y RouteStop
//!
//! Las rutas y sus paradas las edita el módulo de gestión de rutas
//! (colaborador externo); el core las consume como entrada de solo lectura.
//! Invariante: los índices de secuencia son únicos y densos dentro de una
//! ruta, y las coordenadas de una parada son inmutables una vez que hay
//! telemetría que las referencia.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Sentido de la ruta: define cuál de los dos horarios programados
/// de cada parada aplica como hora de llegada
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "route_direction", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum RouteDirection {
    Pickup,
    Drop,
}

/// Ruta asignable a vehículos (solo lectura para el core)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Route {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub direction: RouteDirection,
    pub created_at: DateTime<Utc>,
}

/// Parada de una ruta, con coordenada fija y horarios programados
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RouteStop {
    pub id: Uuid,
    pub route_id: Uuid,
    /// Índice de secuencia, único y denso dentro de la ruta (0, 1, 2, ...)
    pub seq: i32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub scheduled_pickup_time: NaiveTime,
    pub scheduled_drop_time: NaiveTime,
}

impl RouteStop {
    /// Hora programada de llegada para el sentido de la ruta
    pub fn scheduled_time(&self, direction: RouteDirection) -> NaiveTime {
        match direction {
            RouteDirection::Pickup => self.scheduled_pickup_time,
            RouteDirection::Drop => self.scheduled_drop_time,
        }
    }

    /// Hora programada de llegada en UTC, para un día de servicio del
    /// operador con el offset dado
    pub fn scheduled_arrival_utc(
        &self,
        direction: RouteDirection,
        service_date: NaiveDate,
        utc_offset_minutes: i32,
    ) -> DateTime<Utc> {
        let local = service_date.and_time(self.scheduled_time(direction));
        local.and_utc() - Duration::minutes(utc_offset_minutes as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(pickup: &str, drop: &str) -> RouteStop {
        RouteStop {
            id: Uuid::new_v4(),
            route_id: Uuid::new_v4(),
            seq: 0,
            name: "Plaza Mayor".to_string(),
            latitude: 40.4168,
            longitude: -3.7038,
            scheduled_pickup_time: pickup.parse().unwrap(),
            scheduled_drop_time: drop.parse().unwrap(),
        }
    }

    #[test]
    fn test_scheduled_time_by_direction() {
        let s = stop("08:00:00", "16:30:00");
        assert_eq!(s.scheduled_time(RouteDirection::Pickup), "08:00:00".parse::<NaiveTime>().unwrap());
        assert_eq!(s.scheduled_time(RouteDirection::Drop), "16:30:00".parse::<NaiveTime>().unwrap());
    }

    #[test]
    fn test_scheduled_arrival_utc_applies_offset() {
        let s = stop("08:00:00", "16:30:00");
        let date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        // Operador en UTC+2: las 08:00 locales son las 06:00 UTC
        let utc = s.scheduled_arrival_utc(RouteDirection::Pickup, date, 120);
        assert_eq!(utc, "2026-03-10T06:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }
}
