//! Matcher geoespacial de paradas
//!
//! Dada una muestra de posición y la lista ordenada de paradas de la ruta,
//! decide si el vehículo llegó a la próxima parada esperada. El matching
//! solo avanza hacia adelante: un vehículo no puede "llegar" a una parada
//! que ya pasó, lo que corta StopLogs duplicados o fuera de orden por
//! ruido de GPS.
//!
//! La evaluación es pura: no toca la base de datos. El ingestor le pasa el
//! plan de ruta del día y el cursor persistido, y persiste el cursor nuevo.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::config::TrackingConfig;
use crate::models::telemetry::TelemetrySample;
use crate::models::tracking_state::NO_STOP_MATCHED;
use crate::utils::geo::haversine_distance_m;

/// Parada objetivo dentro del plan del día, con su horario ya resuelto a UTC
#[derive(Debug, Clone)]
pub struct StopTarget {
    pub stop_id: Uuid,
    pub seq: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub scheduled_arrival: DateTime<Utc>,
}

/// Plan de ruta para un día de servicio: paradas ordenadas por seq denso
#[derive(Debug, Clone)]
pub struct RoutePlan {
    pub route_id: Uuid,
    pub stops: Vec<StopTarget>,
}

/// Cursor de matching de un vehículo (persistido en vehicle_tracking_state)
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCursor {
    pub last_matched_seq: i32,
    pub dwell_seq: Option<i32>,
    pub dwell_started_at: Option<DateTime<Utc>>,
}

impl Default for MatchCursor {
    fn default() -> Self {
        Self {
            last_matched_seq: NO_STOP_MATCHED,
            dwell_seq: None,
            dwell_started_at: None,
        }
    }
}

/// Llegada confirmada a una parada
#[derive(Debug, Clone)]
pub struct ArrivedStop {
    pub stop_id: Uuid,
    pub seq: i32,
    pub scheduled_arrival: DateTime<Utc>,
    /// Inicio de la ventana de dwell: el momento real de llegada
    pub actual_arrival: DateTime<Utc>,
}

/// Parada dada por perdida tras vencer el timeout
#[derive(Debug, Clone)]
pub struct MissedStop {
    pub stop_id: Uuid,
    pub seq: i32,
    pub scheduled_arrival: DateTime<Utc>,
}

/// Resultado de evaluar una muestra contra el plan
#[derive(Debug, Clone)]
pub struct MatchEvaluation {
    pub arrived: Option<ArrivedStop>,
    /// Paradas saltadas antes de la candidata; puede encadenar varias
    pub missed: Vec<MissedStop>,
    pub cursor: MatchCursor,
}

/// Matcher de paradas con la configuración de geofence/dwell
pub struct StopMatcher {
    config: TrackingConfig,
}

impl StopMatcher {
    pub fn new(config: TrackingConfig) -> Self {
        Self { config }
    }

    /// Evaluar una muestra aceptada contra el plan de ruta del día.
    ///
    /// Condición de llegada: distancia haversine a la parada candidata
    /// dentro del radio Y velocidad bajo el umbral, sostenido durante la
    /// ventana de dwell (al menos dos muestras calificantes consecutivas).
    /// Si la candidata venció su timeout sin llegada, se marca perdida y
    /// el cursor avanza igual para no frenar el resto de la ruta.
    pub fn evaluate(
        &self,
        sample: &TelemetrySample,
        plan: &RoutePlan,
        cursor: &MatchCursor,
    ) -> MatchEvaluation {
        let mut cursor = cursor.clone();
        let mut missed = Vec::new();
        let mut arrived = None;
        let missed_timeout = Duration::seconds(self.config.missed_stop_timeout_secs);

        loop {
            let next_idx = (cursor.last_matched_seq + 1) as usize;
            let Some(candidate) = plan.stops.get(next_idx) else {
                // Ruta completa: no queda parada candidata
                break;
            };

            let dwelling_here = cursor.dwell_seq == Some(candidate.seq);

            // Timeout de parada perdida: solo si el vehículo no está ya
            // calificando dentro del geofence de la candidata
            if !dwelling_here && sample.timestamp > candidate.scheduled_arrival + missed_timeout {
                missed.push(MissedStop {
                    stop_id: candidate.stop_id,
                    seq: candidate.seq,
                    scheduled_arrival: candidate.scheduled_arrival,
                });
                cursor.last_matched_seq = candidate.seq;
                cursor.dwell_seq = None;
                cursor.dwell_started_at = None;
                continue;
            }

            let distance_m = haversine_distance_m(
                sample.latitude,
                sample.longitude,
                candidate.latitude,
                candidate.longitude,
            );
            let qualifying = distance_m <= self.config.arrival_radius_m
                && sample.speed_kmh <= self.config.low_speed_kmh;

            if qualifying {
                match (dwelling_here, cursor.dwell_started_at) {
                    (true, Some(dwell_started)) => {
                        let dwelled = sample.timestamp - dwell_started;
                        if dwelled >= Duration::seconds(self.config.dwell_window_secs) {
                            arrived = Some(ArrivedStop {
                                stop_id: candidate.stop_id,
                                seq: candidate.seq,
                                scheduled_arrival: candidate.scheduled_arrival,
                                actual_arrival: dwell_started,
                            });
                            cursor.last_matched_seq = candidate.seq;
                            cursor.dwell_seq = None;
                            cursor.dwell_started_at = None;
                        }
                    }
                    _ => {
                        // Primera muestra calificante: ancla de la ventana de dwell
                        cursor.dwell_seq = Some(candidate.seq);
                        cursor.dwell_started_at = Some(sample.timestamp);
                    }
                }
            } else if dwelling_here {
                // Salió del geofence o retomó velocidad: la ventana se corta
                cursor.dwell_seq = None;
                cursor.dwell_started_at = None;
            }

            break;
        }

        MatchEvaluation {
            arrived,
            missed,
            cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ts: &str, lat: f64, lng: f64, speed: f64) -> TelemetrySample {
        TelemetrySample {
            vehicle_id: Uuid::new_v4(),
            timestamp: ts.parse().unwrap(),
            latitude: lat,
            longitude: lng,
            speed_kmh: speed,
            heading_deg: 0.0,
        }
    }

    fn plan() -> RoutePlan {
        // Dos paradas separadas ~1.1 km sobre el mismo meridiano
        RoutePlan {
            route_id: Uuid::new_v4(),
            stops: vec![
                StopTarget {
                    stop_id: Uuid::new_v4(),
                    seq: 0,
                    latitude: 40.4000,
                    longitude: -3.7000,
                    scheduled_arrival: "2026-03-10T08:00:00Z".parse().unwrap(),
                },
                StopTarget {
                    stop_id: Uuid::new_v4(),
                    seq: 1,
                    latitude: 40.4100,
                    longitude: -3.7000,
                    scheduled_arrival: "2026-03-10T08:20:00Z".parse().unwrap(),
                },
            ],
        }
    }

    fn matcher() -> StopMatcher {
        StopMatcher::new(TrackingConfig::default())
    }

    #[test]
    fn test_arrival_requires_sustained_dwell() {
        let plan = plan();
        let m = matcher();

        // Primera muestra calificante: solo abre la ventana de dwell
        let s1 = sample("2026-03-10T08:03:00Z", 40.4000, -3.7000, 2.0);
        let eval = m.evaluate(&s1, &plan, &MatchCursor::default());
        assert!(eval.arrived.is_none());
        assert!(eval.missed.is_empty());
        assert_eq!(eval.cursor.dwell_seq, Some(0));

        // Segunda muestra calificante 20 s después: llegada confirmada,
        // con actual_arrival = inicio del dwell (08:03)
        let s2 = sample("2026-03-10T08:03:20Z", 40.4000, -3.7000, 2.0);
        let eval = m.evaluate(&s2, &plan, &eval.cursor);
        let arrived = eval.arrived.expect("debe confirmar llegada");
        assert_eq!(arrived.seq, 0);
        assert_eq!(arrived.actual_arrival, s1.timestamp);
        assert_eq!(eval.cursor.last_matched_seq, 0);
        assert!(eval.cursor.dwell_seq.is_none());
    }

    #[test]
    fn test_second_stop_arrival_advances_forward() {
        let plan = plan();
        let m = matcher();

        let mut cursor = MatchCursor {
            last_matched_seq: 0,
            dwell_seq: None,
            dwell_started_at: None,
        };

        let s1 = sample("2026-03-10T08:25:00Z", 40.4100, -3.7000, 3.0);
        cursor = m.evaluate(&s1, &plan, &cursor).cursor;
        let s2 = sample("2026-03-10T08:25:30Z", 40.4100, -3.7000, 1.0);
        let eval = m.evaluate(&s2, &plan, &cursor);

        let arrived = eval.arrived.expect("debe confirmar llegada a S2");
        assert_eq!(arrived.seq, 1);
        assert_eq!(arrived.actual_arrival, s1.timestamp);
    }

    #[test]
    fn test_no_rearrival_at_passed_stop() {
        let plan = plan();
        let m = matcher();
        let cursor = MatchCursor {
            last_matched_seq: 0,
            dwell_seq: None,
            dwell_started_at: None,
        };

        // El vehículo vuelve a quedar detenido dentro del geofence de la
        // parada 0, ya matcheada: la candidata es la 1, así que no pasa nada
        let s = sample("2026-03-10T08:10:00Z", 40.4000, -3.7000, 0.0);
        let eval = m.evaluate(&s, &plan, &cursor);
        assert!(eval.arrived.is_none());
        // Tampoco abre dwell: está a ~1.1 km de la candidata
        assert!(eval.cursor.dwell_seq.is_none());
    }

    #[test]
    fn test_dwell_broken_by_speed() {
        let plan = plan();
        let m = matcher();

        let s1 = sample("2026-03-10T08:03:00Z", 40.4000, -3.7000, 2.0);
        let cursor = m.evaluate(&s1, &plan, &MatchCursor::default()).cursor;

        // Pasa cerca pero retoma velocidad: la ventana se corta
        let s2 = sample("2026-03-10T08:03:10Z", 40.4000, -3.7000, 25.0);
        let eval = m.evaluate(&s2, &plan, &cursor);
        assert!(eval.arrived.is_none());
        assert!(eval.cursor.dwell_seq.is_none());

        // Y aunque vuelva a calificar, la ventana arranca de cero
        let s3 = sample("2026-03-10T08:03:15Z", 40.4000, -3.7000, 2.0);
        let eval = m.evaluate(&s3, &plan, &eval.cursor);
        assert!(eval.arrived.is_none());
        assert_eq!(eval.cursor.dwell_started_at, Some(s3.timestamp));
    }

    #[test]
    fn test_missed_stop_advances_cursor() {
        let plan = plan();
        let m = matcher();

        // 08:00 + timeout de 10 min vencido; el vehículo está lejos de la
        // parada 0 y en ventana de la 1
        let s = sample("2026-03-10T08:21:00Z", 40.4100, -3.7000, 3.0);
        let eval = m.evaluate(&s, &plan, &MatchCursor::default());

        assert_eq!(eval.missed.len(), 1);
        assert_eq!(eval.missed[0].seq, 0);
        assert!(eval.arrived.is_none());
        // Tras la perdida, la candidata es la parada 1 y ya abrió dwell
        assert_eq!(eval.cursor.last_matched_seq, 0);
        assert_eq!(eval.cursor.dwell_seq, Some(1));
    }

    #[test]
    fn test_missed_stops_cascade() {
        let plan = plan();
        let m = matcher();

        // Muestra muy tardía y lejos de ambas paradas: las dos vencieron
        let s = sample("2026-03-10T09:00:00Z", 40.5000, -3.7000, 40.0);
        let eval = m.evaluate(&s, &plan, &MatchCursor::default());

        assert_eq!(eval.missed.len(), 2);
        assert_eq!(eval.missed[0].seq, 0);
        assert_eq!(eval.missed[1].seq, 1);
        assert_eq!(eval.cursor.last_matched_seq, 1);
    }

    #[test]
    fn test_dwelling_vehicle_not_marked_missed() {
        let plan = plan();
        let m = matcher();

        // Abre dwell en la parada 0 justo antes del timeout
        let s1 = sample("2026-03-10T08:09:55Z", 40.4000, -3.7000, 1.0);
        let cursor = m.evaluate(&s1, &plan, &MatchCursor::default()).cursor;
        assert_eq!(cursor.dwell_seq, Some(0));

        // La siguiente muestra cae pasado el timeout, pero el vehículo
        // sigue calificando: es una llegada, no una perdida
        let s2 = sample("2026-03-10T08:10:20Z", 40.4000, -3.7000, 1.0);
        let eval = m.evaluate(&s2, &plan, &cursor);
        assert!(eval.missed.is_empty());
        let arrived = eval.arrived.expect("debe confirmar llegada");
        assert_eq!(arrived.actual_arrival, s1.timestamp);
    }

    #[test]
    fn test_route_complete_no_candidate() {
        let plan = plan();
        let m = matcher();
        let cursor = MatchCursor {
            last_matched_seq: 1,
            dwell_seq: None,
            dwell_started_at: None,
        };

        let s = sample("2026-03-10T09:00:00Z", 40.4100, -3.7000, 0.0);
        let eval = m.evaluate(&s, &plan, &cursor);
        assert!(eval.arrived.is_none());
        assert!(eval.missed.is_empty());
        assert_eq!(eval.cursor, cursor);
    }
}
