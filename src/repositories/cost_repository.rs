use crate::utils::errors::AppError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

/// Lectura del ledger de costos (combustible/mantenimiento). Las entradas
/// las escribe un colaborador externo keyed por (vehicle_id, fecha); el
/// core solo las suma para el agregado mensual.
pub struct CostRepository;

impl CostRepository {
    /// Sumas de costos de un vehículo en una ventana de fechas, leídas
    /// dentro de la transacción del rollup mensual
    pub async fn sums_in_tx(
        conn: &mut PgConnection,
        vehicle_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<(Decimal, Decimal), AppError> {
        let row: (Option<Decimal>, Option<Decimal>) = sqlx::query_as(
            r#"
            SELECT
                SUM(amount) FILTER (WHERE kind = 'fuel'),
                SUM(amount) FILTER (WHERE kind = 'maintenance')
            FROM cost_entries
            WHERE vehicle_id = $1 AND entry_date >= $2 AND entry_date < $3
            "#,
        )
        .bind(vehicle_id)
        .bind(from)
        .bind(to)
        .fetch_one(&mut *conn)
        .await?;

        Ok((row.0.unwrap_or_default(), row.1.unwrap_or_default()))
    }
}
