use crate::config::TrackingConfig;
use crate::dto::report_dto::{
    DailyLogResponse, DailyReportQuery, MonthlyAggregateResponse, MonthlyReportQuery,
    SyncDailyLogsRequest, SyncMonthlyRequest,
};
use crate::models::Vehicle;
use crate::repositories::daily_log_repository::DailyLogRepository;
use crate::repositories::monthly_aggregate_repository::MonthlyAggregateRepository;
use crate::repositories::stop_log_repository::StopLogRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::daily_rollup_service::DailyRollupService;
use crate::services::monthly_rollup_service::MonthlyRollupService;
use crate::utils::errors::AppError;
use crate::utils::validation::{validate_date, validate_month, validate_year};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

pub struct ReportController {
    pool: PgPool,
    tracking: TrackingConfig,
}

impl ReportController {
    pub fn new(pool: PgPool, tracking: TrackingConfig) -> Self {
        Self { pool, tracking }
    }

    /// Reporte diario: DailyLogs del operador (o de un vehículo puntual)
    /// con el detalle de StopLogs anidado
    pub async fn daily_report(
        &self,
        query: DailyReportQuery,
    ) -> Result<Vec<DailyLogResponse>, AppError> {
        let date = parse_date(&query.date)?;
        let vehicles = self
            .scoped_vehicles(query.company_id, query.vehicle_id)
            .await?;

        let daily_repo = DailyLogRepository::new(self.pool.clone());
        let stop_repo = StopLogRepository::new(self.pool.clone());

        let mut report = Vec::new();
        for vehicle in &vehicles {
            if let Some(log) = daily_repo.find_by_vehicle_and_date(vehicle.id, date).await? {
                let stop_logs = stop_repo
                    .find_by_vehicle_and_date(vehicle.id, date)
                    .await?
                    .into_iter()
                    .map(Into::into)
                    .collect();
                report.push(DailyLogResponse::from_log(log, stop_logs));
            }
        }

        Ok(report)
    }

    /// Trigger manual "sync logs": reconstruye los DailyLogs de la fecha y
    /// devuelve el reporte resultante
    pub async fn sync_daily_logs(
        &self,
        request: SyncDailyLogsRequest,
    ) -> Result<Vec<DailyLogResponse>, AppError> {
        let date = parse_date(&request.date)?;
        let vehicles = self
            .scoped_vehicles(request.company_id, request.vehicle_id)
            .await?;

        let rollup = DailyRollupService::new(self.pool.clone(), self.tracking.clone());
        for vehicle in &vehicles {
            rollup.build_daily_log(vehicle.id, date).await?;
        }

        self.daily_report(DailyReportQuery {
            company_id: request.company_id,
            date: request.date,
            vehicle_id: request.vehicle_id,
        })
        .await
    }

    /// Reporte mensual: agregados materializados del operador
    pub async fn monthly_report(
        &self,
        query: MonthlyReportQuery,
    ) -> Result<Vec<MonthlyAggregateResponse>, AppError> {
        validate_period(query.month, query.year)?;

        let aggregates = MonthlyAggregateRepository::new(self.pool.clone())
            .find_by_company(query.company_id, query.year, query.month as i32)
            .await?;

        Ok(aggregates.into_iter().map(Into::into).collect())
    }

    /// Reconstrucción del agregado mensual para la flota (o un vehículo)
    pub async fn sync_monthly_aggregates(
        &self,
        request: SyncMonthlyRequest,
    ) -> Result<Vec<MonthlyAggregateResponse>, AppError> {
        validate_period(request.month, request.year)?;
        let vehicles = self
            .scoped_vehicles(request.company_id, request.vehicle_id)
            .await?;

        let rollup = MonthlyRollupService::new(self.pool.clone());
        let mut report = Vec::with_capacity(vehicles.len());
        for vehicle in &vehicles {
            let aggregate = rollup
                .build_monthly_aggregate(vehicle.id, request.month, request.year)
                .await?;
            report.push(aggregate.into());
        }

        Ok(report)
    }

    /// Vehículos alcanzados por la consulta: toda la flota del operador o
    /// uno puntual, verificando que le pertenezca
    async fn scoped_vehicles(
        &self,
        company_id: Uuid,
        vehicle_id: Option<Uuid>,
    ) -> Result<Vec<Vehicle>, AppError> {
        let repo = VehicleRepository::new(self.pool.clone());
        match vehicle_id {
            Some(id) => {
                let vehicle = repo
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Vehicle '{}' not found", id)))?;
                if vehicle.company_id != company_id {
                    return Err(AppError::NotFound(format!("Vehicle '{}' not found", id)));
                }
                Ok(vec![vehicle])
            }
            None => repo.find_by_company(company_id).await,
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    validate_date(value)
        .map_err(|_| AppError::BadRequest(format!("Invalid date '{}', expected YYYY-MM-DD", value)))
}

fn validate_period(month: u32, year: i32) -> Result<(), AppError> {
    validate_month(month).map_err(|_| AppError::BadRequest(format!("Invalid month {}", month)))?;
    validate_year(year).map_err(|_| AppError::BadRequest(format!("Invalid year {}", year)))?;
    Ok(())
}
