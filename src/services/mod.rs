pub mod air_quality_service;
pub mod emission_service;
pub mod source_service;
pub mod stats_service;
pub mod user_service;

pub use air_quality_service::{AirQualityQuery, AirQualityService};
pub use emission_service::{EmissionQuery, EmissionService};
pub use source_service::SourceService;
pub use stats_service::{AveragesQuery, PollutantAverages, StatsService, TrendPeriod, TrendPoint, TrendQuery};
pub use user_service::UserService;

use serde::Deserialize;
use thiserror::Error;

use crate::auth::AuthError;
use crate::config::ApiConfig;
use crate::database::DatabaseError;
use crate::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Database(DatabaseError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Conflict(msg) => ServiceError::Conflict(msg),
            DatabaseError::NotFound(msg) => ServiceError::NotFound(msg),
            DatabaseError::InvalidReference(msg) => ServiceError::Validation(ValidationErrors::single("source_id", msg)),
            other => ServiceError::Database(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Offset/limit window for listings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Page {
    /// Apply defaults and bounds: `skip >= 0`, `1 <= limit <= max_limit`
    pub fn new(skip: Option<i64>, limit: Option<i64>, api: &ApiConfig) -> Result<Self, ValidationErrors> {
        let skip = skip.unwrap_or(0);
        let limit = limit.unwrap_or(api.default_limit);
        if skip < 0 {
            return Err(ValidationErrors::single("skip", "must be greater than or equal to 0"));
        }
        if limit < 1 || limit > api.max_limit {
            return Err(ValidationErrors::single(
                "limit",
                format!("must be between 1 and {}", api.max_limit),
            ));
        }
        Ok(Self { skip, limit })
    }
}

/// Pagination and sort parameters shared by the source and user listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub order_by: Option<String>,
}
