use crate::models::{Route, RouteStop};
use crate::utils::errors::AppError;
use sqlx::PgPool;
use uuid::Uuid;

/// Acceso de solo lectura a rutas y paradas: el CRUD de rutas vive en el
/// módulo de gestión externo, el core nunca las muta.
pub struct RouteRepository {
    pool: PgPool,
}

impl RouteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Route>, AppError> {
        let route = sqlx::query_as::<_, Route>("SELECT * FROM routes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(route)
    }

    /// Paradas de una ruta en orden de secuencia (denso: 0, 1, 2, ...)
    pub async fn find_stops(&self, route_id: Uuid) -> Result<Vec<RouteStop>, AppError> {
        let stops = sqlx::query_as::<_, RouteStop>(
            "SELECT * FROM route_stops WHERE route_id = $1 ORDER BY seq ASC",
        )
        .bind(route_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(stops)
    }
}
