use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use super::{ServiceError, ServiceResult};
use crate::database::models::{AirQuality, Emission};
use crate::database::query_builder::bind_param_query_as;
use crate::database::{DatabaseError, Table};
use crate::filter::filter_where::FilterWhere;
use crate::filter::FilterData;
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AveragesQuery {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Country
    pub zone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrendQuery {
    pub period: Option<String>,
    pub zone: Option<String>,
    pub sector: Option<String>,
}

/// Mean pollutant levels; zero when nothing matched
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PollutantAverages {
    pub pm25: f64,
    pub pm10: f64,
    pub no2: f64,
    pub so2: f64,
    pub co: f64,
    pub o3: f64,
    pub measurements: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct TrendPoint {
    pub period: String,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendPeriod {
    #[default]
    Monthly,
    Yearly,
}

impl TrendPeriod {
    fn strftime(&self) -> &'static str {
        match self {
            TrendPeriod::Monthly => "%Y-%m",
            TrendPeriod::Yearly => "%Y",
        }
    }
}

impl FromStr for TrendPeriod {
    type Err = ValidationErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(TrendPeriod::Monthly),
            "yearly" => Ok(TrendPeriod::Yearly),
            _ => Err(ValidationErrors::single("period", "must be one of: monthly, yearly")),
        }
    }
}

/// Render the predicate list as a WHERE clause, or nothing when empty
fn where_clause(filter: &FilterData, columns: &[&str]) -> Result<(String, Vec<serde_json::Value>), DatabaseError> {
    let (predicate, params) =
        FilterWhere::generate(&filter.where_clause, columns).map_err(|e| DatabaseError::QueryError(e.to_string()))?;
    if predicate.is_empty() {
        Ok((String::new(), params))
    } else {
        Ok((format!(" WHERE {}", predicate), params))
    }
}

/// Read-only aggregates over the measurement tables
pub struct StatsService {
    pool: SqlitePool,
}

impl StatsService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn air_averages(&self, query: &AveragesQuery) -> ServiceResult<PollutantAverages> {
        let filter = FilterData::new()
            .where_eq("country", query.zone.clone())
            .where_gte("date", query.date_from.map(|d| d.to_string()))
            .where_lte("date", query.date_to.map(|d| d.to_string()));
        let (clause, params) = where_clause(&filter, AirQuality::COLUMNS)?;

        let sql = format!(
            "SELECT COALESCE(AVG(\"pm25\"), 0.0) AS pm25, COALESCE(AVG(\"pm10\"), 0.0) AS pm10, \
             COALESCE(AVG(\"no2\"), 0.0) AS no2, COALESCE(AVG(\"so2\"), 0.0) AS so2, \
             COALESCE(AVG(\"co\"), 0.0) AS co, COALESCE(AVG(\"o3\"), 0.0) AS o3, \
             COUNT(*) AS measurements FROM \"{}\"{}",
            AirQuality::TABLE,
            clause
        );
        tracing::debug!("air_averages: {}", sql);

        let mut q = sqlx::query_as::<_, PollutantAverages>(&sql);
        for p in params.iter() {
            q = bind_param_query_as(q, p);
        }
        let averages = q.fetch_one(&self.pool).await.map_err(DatabaseError::from)?;
        Ok(averages)
    }

    pub async fn co2_trend(&self, query: &TrendQuery) -> ServiceResult<Vec<TrendPoint>> {
        let period = match query.period.as_deref() {
            Some(p) => p.parse::<TrendPeriod>()?,
            None => TrendPeriod::default(),
        };

        let filter = FilterData::new()
            .where_eq("country", query.zone.clone())
            .where_eq("sector", query.sector.clone());
        let (clause, params) = where_clause(&filter, Emission::COLUMNS)?;

        let sql = format!(
            "SELECT strftime('{}', \"date\") AS period, COALESCE(SUM(\"value\"), 0.0) AS total \
             FROM \"{}\"{} GROUP BY period ORDER BY period ASC",
            period.strftime(),
            Emission::TABLE,
            clause
        );
        tracing::debug!("co2_trend: {}", sql);

        let mut q = sqlx::query_as::<_, TrendPoint>(&sql);
        for p in params.iter() {
            q = bind_param_query_as(q, p);
        }
        q.fetch_all(&self.pool)
            .await
            .map_err(|e| ServiceError::from(DatabaseError::from(e)))
    }
}
