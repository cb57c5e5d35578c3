use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

use super::{Page, ServiceError, ServiceResult};
use crate::database::models::{AirQuality, AirQualityCreate, AirQualityUpdate};
use crate::database::{DatabaseError, Repository, UniqueKeys};
use crate::filter::FilterData;

const NOT_FOUND: &str = "Air quality measurement not found";
const DUPLICATE: &str = "A measurement for this city, country and date already exists";
const UNIQUE: UniqueKeys = &[("city", DUPLICATE)];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AirQualityQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub order_by: Option<String>,
    /// Case-insensitive substring of the city name
    pub city: Option<String>,
    pub country: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl AirQualityQuery {
    fn filter(&self, page: Page) -> FilterData {
        FilterData::new()
            .where_contains("city", self.city.clone())
            .where_eq("country", self.country.clone())
            .where_gte("date", self.date_from.map(|d| d.to_string()))
            .where_lte("date", self.date_to.map(|d| d.to_string()))
            .order_by(self.order_by.clone())
            .paginate(page.skip, page.limit)
    }
}

fn key_filter(city: &str, country: &str, date: NaiveDate) -> FilterData {
    FilterData::new()
        .where_eq("city", Some(city))
        .where_eq("country", Some(country))
        .where_eq("date", Some(date.to_string()))
}

pub struct AirQualityService {
    repo: Repository<AirQuality>,
}

impl AirQualityService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { repo: Repository::new(pool) }
    }

    pub async fn list(&self, query: &AirQualityQuery, page: Page) -> ServiceResult<Vec<AirQuality>> {
        Ok(self.repo.select_any(query.filter(page)).await?)
    }

    /// Number of stored rows
    pub async fn total(&self) -> ServiceResult<i64> {
        Ok(self.repo.count(FilterData::new()).await?)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<AirQuality> {
        Ok(self.repo.select_404(id, NOT_FOUND).await?)
    }

    pub async fn is_duplicate(
        &self,
        city: &str,
        country: &str,
        date: NaiveDate,
        except_id: Option<i64>,
    ) -> ServiceResult<bool> {
        Ok(self.repo.exists(key_filter(city, country, date), except_id).await?)
    }

    pub async fn create(&self, payload: AirQualityCreate) -> ServiceResult<AirQuality> {
        let mut tx = self.begin().await?;
        let record = self.create_on(&mut tx, payload).await?;
        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(record)
    }

    pub async fn begin(&self) -> ServiceResult<Transaction<'static, Sqlite>> {
        Ok(self.repo.begin().await?)
    }

    pub async fn create_on(&self, conn: &mut SqliteConnection, payload: AirQualityCreate) -> ServiceResult<AirQuality> {
        payload.validate()?;

        let key = key_filter(&payload.city, &payload.country, payload.date);
        if self.repo.exists_on(conn, key, None).await? {
            return Err(ServiceError::Conflict(DUPLICATE.to_string()));
        }

        let record = self.repo.insert_on(conn, payload.into_fields(), UNIQUE).await?;
        tracing::debug!("Created air quality measurement {}", record.id);
        Ok(record)
    }

    pub async fn update(&self, id: i64, payload: AirQualityUpdate) -> ServiceResult<AirQuality> {
        let current = self.repo.select_404(id, NOT_FOUND).await?;
        payload.validate()?;

        let city = payload.city.as_deref().unwrap_or(&current.city);
        let country = payload.country.as_deref().unwrap_or(&current.country);
        let date = payload.date.unwrap_or(current.date);
        if self.is_duplicate(city, country, date, Some(id)).await? {
            return Err(ServiceError::Conflict(DUPLICATE.to_string()));
        }

        self.repo
            .update(id, payload.into_fields(), UNIQUE)
            .await?
            .ok_or_else(|| ServiceError::NotFound(NOT_FOUND.to_string()))
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.repo.delete(id).await? {
            return Err(ServiceError::NotFound(NOT_FOUND.to_string()));
        }
        tracing::debug!("Deleted air quality measurement {}", id);
        Ok(())
    }
}
