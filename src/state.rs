use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::services::{AirQualityService, EmissionService, Page, SourceService, StatsService, UserService};

/// Shared handler state: the pool plus the configuration the app was built with
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: AppConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }

    /// Resolve `skip`/`limit` query parameters against the configured bounds
    pub fn page(&self, skip: Option<i64>, limit: Option<i64>) -> Result<Page, ApiError> {
        Ok(Page::new(skip, limit, &self.config.api)?)
    }

    pub fn emissions(&self) -> EmissionService {
        EmissionService::new(self.pool.clone())
    }

    pub fn air_quality(&self) -> AirQualityService {
        AirQualityService::new(self.pool.clone())
    }

    pub fn sources(&self) -> SourceService {
        SourceService::new(self.pool.clone())
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.pool.clone(), self.config.security.bcrypt_cost)
    }

    pub fn stats(&self) -> StatsService {
        StatsService::new(self.pool.clone())
    }
}
