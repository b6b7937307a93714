//! Modelo de Company (operador)
//!
//! El operador (colegio/empresa de transporte) es dueño de la flota.
//! Para el core es un registro de solo lectura: lo administra el módulo
//! de gestión externo. El offset UTC define el "día de servicio" contra
//! el que se anclan StopLogs y DailyLogs.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Operador de flota (solo lectura para el core)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    /// Offset del timezone del operador respecto a UTC, en minutos
    pub utc_offset_minutes: i32,
    pub created_at: DateTime<Utc>,
}

impl Company {
    /// Día de servicio al que pertenece un timestamp UTC
    pub fn service_date(&self, timestamp: DateTime<Utc>) -> NaiveDate {
        (timestamp + Duration::minutes(self.utc_offset_minutes as i64)).date_naive()
    }

    /// Ventana UTC [inicio, fin) que cubre un día de servicio del operador
    pub fn service_window_utc(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let offset = Duration::minutes(self.utc_offset_minutes as i64);
        let start = date.and_hms_opt(0, 0, 0).expect("midnight is always valid").and_utc() - offset;
        (start, start + Duration::days(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(offset_minutes: i32) -> Company {
        Company {
            id: Uuid::new_v4(),
            name: "Colegio San Martín".to_string(),
            utc_offset_minutes: offset_minutes,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_service_date_shifts_with_offset() {
        // 23:30 UTC del 10 de marzo, operador en UTC+2 => día de servicio 11 de marzo
        let ts = "2026-03-10T23:30:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(
            company(120).service_date(ts),
            NaiveDate::from_ymd_opt(2026, 3, 11).unwrap()
        );
        // Mismo instante en UTC-5 => sigue siendo 10 de marzo
        assert_eq!(
            company(-300).service_date(ts),
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
        );
    }

    #[test]
    fn test_service_window_covers_full_day() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let (start, end) = company(120).service_window_utc(date);
        assert_eq!(end - start, Duration::days(1));
        // UTC+2: el día de servicio empieza a las 22:00 UTC del día anterior
        assert_eq!(start, "2026-03-09T22:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }
}
