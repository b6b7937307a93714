//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum, incluyendo el mapa de locks por vehículo
//! que serializa la ingesta de telemetría.

use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::cache::redis_client::RedisClient;
use crate::config::{EnvironmentConfig, TrackingConfig};

/// Mapa de mutexes keyed por vehículo: la ingesta es estrictamente serial
/// por vehículo pero totalmente paralela entre vehículos distintos. Un lock
/// global serializaría vehículos sin relación entre sí.
#[derive(Clone, Default)]
pub struct VehicleLocks {
    locks: Arc<RwLock<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl VehicleLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Obtener (o crear) el mutex del vehículo
    pub async fn for_vehicle(&self, vehicle_id: Uuid) -> Arc<Mutex<()>> {
        {
            let locks = self.locks.read().await;
            if let Some(lock) = locks.get(&vehicle_id) {
                return lock.clone();
            }
        }

        let mut locks = self.locks.write().await;
        locks
            .entry(vehicle_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub tracking: TrackingConfig,
    pub redis: RedisClient,
    pub vehicle_locks: VehicleLocks,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        config: EnvironmentConfig,
        tracking: TrackingConfig,
        redis: RedisClient,
    ) -> Self {
        Self {
            pool,
            config,
            tracking,
            redis,
            vehicle_locks: VehicleLocks::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_vehicle_locks_same_vehicle_same_mutex() {
        let locks = VehicleLocks::new();
        let id = Uuid::new_v4();

        let a = locks.for_vehicle(id).await;
        let b = locks.for_vehicle(id).await;
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_vehicle_locks_distinct_vehicles_independent() {
        let locks = VehicleLocks::new();
        let a = locks.for_vehicle(Uuid::new_v4()).await;
        let b = locks.for_vehicle(Uuid::new_v4()).await;
        assert!(!Arc::ptr_eq(&a, &b));

        // Un vehículo bloqueado no frena al otro
        let _guard_a = a.lock().await;
        let guard_b = b.try_lock();
        assert!(guard_b.is_ok());
    }
}
