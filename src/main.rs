mod api;
mod cache;
mod config;
mod controllers;
mod database;
mod dto;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod state;
mod utils;

use axum::{routing::get, Router};
use tracing::info;

use crate::cache::cache_config::CacheConfig;
use crate::cache::redis_client::RedisClient;
use crate::config::environment::EnvironmentConfig;
use crate::config::tracking::TrackingConfig;
use crate::middleware::cors::{cors_middleware, cors_middleware_with_origins};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Cargar variables de entorno
    dotenvy::dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚌 Fleet Tracking - Transporte Escolar");
    info!("======================================");

    let config = EnvironmentConfig::default();
    let tracking = TrackingConfig::default();

    // Conexión a la base de datos
    let pool = database::connection::create_pool(None).await?;

    // Cliente de Redis para el cache de estado de flota
    let redis = RedisClient::new(CacheConfig::default()).await?;

    let state = AppState::new(pool, config.clone(), tracking, redis);

    // Seleccionar CORS según configuración
    let cors = if config.cors_origins.is_empty() {
        cors_middleware()
    } else {
        cors_middleware_with_origins(config.cors_origins.clone())
    };

    let app = Router::new()
        .route("/test", get(|| async { "Servidor funcionando correctamente" }))
        .merge(api::create_api_router())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🚀 Servidor iniciado en http://{}", addr);
    info!("📍 Endpoints disponibles:");
    info!("   POST /api/telemetry - Ingesta de telemetría");
    info!("   GET  /api/fleet/status - Estado de la flota");
    info!("   GET  /api/fleet/vehicle/:id/state - Estado de un vehículo");
    info!("   GET  /api/reports/daily - Logs diarios");
    info!("   POST /api/reports/daily/sync - Reconstruir logs diarios");
    info!("   GET  /api/reports/monthly - Agregados mensuales");
    info!("   POST /api/reports/monthly/sync - Reconstruir agregados mensuales");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("no se pudo instalar el handler de Ctrl+C");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("no se pudo instalar el handler de SIGTERM")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("🛑 Señal de apagado recibida, cerrando servidor...");
}
