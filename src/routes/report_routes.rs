use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};

use crate::controllers::report_controller::ReportController;
use crate::dto::report_dto::{
    DailyLogResponse, DailyReportQuery, MonthlyAggregateResponse, MonthlyReportQuery,
    SyncDailyLogsRequest, SyncMonthlyRequest,
};
use crate::dto::ApiResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_report_router() -> Router<AppState> {
    Router::new()
        .route("/daily", get(daily_report))
        .route("/daily/sync", post(sync_daily_logs))
        .route("/monthly", get(monthly_report))
        .route("/monthly/sync", post(sync_monthly_aggregates))
}

async fn daily_report(
    State(state): State<AppState>,
    Query(query): Query<DailyReportQuery>,
) -> Result<Json<Vec<DailyLogResponse>>, AppError> {
    let controller = ReportController::new(state.pool.clone(), state.tracking.clone());
    let response = controller.daily_report(query).await?;
    Ok(Json(response))
}

async fn sync_daily_logs(
    State(state): State<AppState>,
    Json(request): Json<SyncDailyLogsRequest>,
) -> Result<Json<ApiResponse<Vec<DailyLogResponse>>>, AppError> {
    let controller = ReportController::new(state.pool.clone(), state.tracking.clone());
    let response = controller.sync_daily_logs(request).await?;
    Ok(Json(ApiResponse::success_with_message(
        response,
        "Logs diarios sincronizados exitosamente".to_string(),
    )))
}

async fn monthly_report(
    State(state): State<AppState>,
    Query(query): Query<MonthlyReportQuery>,
) -> Result<Json<Vec<MonthlyAggregateResponse>>, AppError> {
    let controller = ReportController::new(state.pool.clone(), state.tracking.clone());
    let response = controller.monthly_report(query).await?;
    Ok(Json(response))
}

async fn sync_monthly_aggregates(
    State(state): State<AppState>,
    Json(request): Json<SyncMonthlyRequest>,
) -> Result<Json<ApiResponse<Vec<MonthlyAggregateResponse>>>, AppError> {
    let controller = ReportController::new(state.pool.clone(), state.tracking.clone());
    let response = controller.sync_monthly_aggregates(request).await?;
    Ok(Json(ApiResponse::success_with_message(
        response,
        "Agregados mensuales reconstruidos exitosamente".to_string(),
    )))
}
