use crate::models::Company;
use crate::utils::errors::AppError;
use sqlx::PgPool;
use uuid::Uuid;

/// Acceso de solo lectura a operadores (el módulo de admisiones/gestión
/// externo es el dueño de estos registros).
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(company)
    }
}
