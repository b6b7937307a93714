use crate::models::MonthlyAggregate;
use crate::utils::errors::AppError;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Datos de un agregado mensual a materializar
#[derive(Debug, Clone)]
pub struct NewMonthlyAggregate {
    pub vehicle_id: Uuid,
    pub year: i32,
    pub month: i32,
    pub total_days_active: i32,
    pub total_distance_km: Decimal,
    pub total_fuel_cost: Decimal,
    pub total_maintenance_cost: Decimal,
}

pub struct MonthlyAggregateRepository {
    pool: PgPool,
}

impl MonthlyAggregateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_vehicle(
        &self,
        vehicle_id: Uuid,
        year: i32,
        month: i32,
    ) -> Result<Option<MonthlyAggregate>, AppError> {
        let aggregate = sqlx::query_as::<_, MonthlyAggregate>(
            "SELECT * FROM monthly_aggregates WHERE vehicle_id = $1 AND year = $2 AND month = $3",
        )
        .bind(vehicle_id)
        .bind(year)
        .bind(month)
        .fetch_optional(&self.pool)
        .await?;

        Ok(aggregate)
    }

    /// Agregados mensuales de toda la flota de un operador
    pub async fn find_by_company(
        &self,
        company_id: Uuid,
        year: i32,
        month: i32,
    ) -> Result<Vec<MonthlyAggregate>, AppError> {
        let aggregates = sqlx::query_as::<_, MonthlyAggregate>(
            r#"
            SELECT m.* FROM monthly_aggregates m
            JOIN vehicles v ON v.id = m.vehicle_id
            WHERE v.company_id = $1 AND m.year = $2 AND m.month = $3
            ORDER BY v.registration_number ASC
            "#,
        )
        .bind(company_id)
        .bind(year)
        .bind(month)
        .fetch_all(&self.pool)
        .await?;

        Ok(aggregates)
    }

    /// Reemplazo determinista dentro de la transacción del rollup mensual
    pub async fn replace_in_tx(
        conn: &mut PgConnection,
        new_aggregate: &NewMonthlyAggregate,
    ) -> Result<MonthlyAggregate, AppError> {
        sqlx::query(
            "DELETE FROM monthly_aggregates WHERE vehicle_id = $1 AND year = $2 AND month = $3",
        )
        .bind(new_aggregate.vehicle_id)
        .bind(new_aggregate.year)
        .bind(new_aggregate.month)
        .execute(&mut *conn)
        .await?;

        let aggregate = sqlx::query_as::<_, MonthlyAggregate>(
            r#"
            INSERT INTO monthly_aggregates
                (id, vehicle_id, year, month, total_days_active,
                 total_distance_km, total_fuel_cost, total_maintenance_cost, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_aggregate.vehicle_id)
        .bind(new_aggregate.year)
        .bind(new_aggregate.month)
        .bind(new_aggregate.total_days_active)
        .bind(new_aggregate.total_distance_km)
        .bind(new_aggregate.total_fuel_cost)
        .bind(new_aggregate.total_maintenance_cost)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        Ok(aggregate)
    }
}
