use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

use super::{Page, ServiceError, ServiceResult};
use crate::database::models::{Emission, EmissionCreate, EmissionUpdate};
use crate::database::{DatabaseError, Repository, UniqueKeys};
use crate::filter::FilterData;

const NOT_FOUND: &str = "Emission not found";
const DUPLICATE: &str = "An emission for this country, date and sector already exists";
const UNIQUE: UniqueKeys = &[("country", DUPLICATE)];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmissionQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub order_by: Option<String>,
    pub country: Option<String>,
    pub sector: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl EmissionQuery {
    fn filter(&self, page: Page) -> FilterData {
        FilterData::new()
            .where_eq("country", self.country.clone())
            .where_eq("sector", self.sector.clone())
            .where_gte("date", self.date_from.map(|d| d.to_string()))
            .where_lte("date", self.date_to.map(|d| d.to_string()))
            .order_by(self.order_by.clone())
            .paginate(page.skip, page.limit)
    }
}

fn key_filter(country: &str, date: NaiveDate, sector: &str) -> FilterData {
    FilterData::new()
        .where_eq("country", Some(country))
        .where_eq("date", Some(date.to_string()))
        .where_eq("sector", Some(sector))
}

pub struct EmissionService {
    repo: Repository<Emission>,
}

impl EmissionService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { repo: Repository::new(pool) }
    }

    pub async fn list(&self, query: &EmissionQuery, page: Page) -> ServiceResult<Vec<Emission>> {
        Ok(self.repo.select_any(query.filter(page)).await?)
    }

    /// Number of stored rows
    pub async fn total(&self) -> ServiceResult<i64> {
        Ok(self.repo.count(FilterData::new()).await?)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Emission> {
        Ok(self.repo.select_404(id, NOT_FOUND).await?)
    }

    /// Whether another record already holds this (country, date, sector) key
    pub async fn is_duplicate(
        &self,
        country: &str,
        date: NaiveDate,
        sector: &str,
        except_id: Option<i64>,
    ) -> ServiceResult<bool> {
        Ok(self.repo.exists(key_filter(country, date, sector), except_id).await?)
    }

    pub async fn create(&self, payload: EmissionCreate) -> ServiceResult<Emission> {
        let mut tx = self.begin().await?;
        let emission = self.create_on(&mut tx, payload).await?;
        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(emission)
    }

    /// Transaction for bulk loads through [`EmissionService::create_on`]
    pub async fn begin(&self) -> ServiceResult<Transaction<'static, Sqlite>> {
        Ok(self.repo.begin().await?)
    }

    /// `create` on a caller-held connection, usually an open transaction
    pub async fn create_on(&self, conn: &mut SqliteConnection, payload: EmissionCreate) -> ServiceResult<Emission> {
        payload.validate()?;

        let key = key_filter(&payload.country, payload.date, &payload.sector);
        if self.repo.exists_on(conn, key, None).await? {
            return Err(ServiceError::Conflict(DUPLICATE.to_string()));
        }

        let emission = self.repo.insert_on(conn, payload.into_fields(), UNIQUE).await?;
        tracing::debug!("Created emission {}", emission.id);
        Ok(emission)
    }

    pub async fn update(&self, id: i64, payload: EmissionUpdate) -> ServiceResult<Emission> {
        let current = self.repo.select_404(id, NOT_FOUND).await?;
        payload.validate()?;

        // The uniqueness key is checked on the merged record
        let country = payload.country.as_deref().unwrap_or(&current.country);
        let date = payload.date.unwrap_or(current.date);
        let sector = payload.sector.as_deref().unwrap_or(&current.sector);
        if self.is_duplicate(country, date, sector, Some(id)).await? {
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
        tracing::debug!("Deleted emission {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::DatabaseManager;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn emission(country: &str, day: &str, sector: &str, value: f64) -> EmissionCreate {
        EmissionCreate {
            country: country.to_string(),
            date: date(day),
            sector: sector.to_string(),
            value,
            timestamp: 1672531200,
            source_id: None,
        }
    }

    fn page() -> Page {
        Page::new(None, None, &AppConfig::development().api).unwrap()
    }

    async fn seeded() -> EmissionService {
        let svc = EmissionService::new(DatabaseManager::memory().await.unwrap());
        svc.create(emission("France", "2023-01-01", "Power", 10.0)).await.unwrap();
        svc.create(emission("France", "2023-01-02", "Industry", 20.0)).await.unwrap();
        svc.create(emission("Germany", "2023-01-03", "Power", 30.0)).await.unwrap();
        svc.create(emission("France", "2023-02-01", "Power", 40.0)).await.unwrap();
        svc
    }

    #[tokio::test]
    async fn duplicate_key_is_a_conflict() {
        let svc = seeded().await;
        let err = svc.create(emission("France", "2023-01-01", "Power", 99.0)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(msg) if msg == DUPLICATE));

        // Same country and date in another sector is fine
        svc.create(emission("France", "2023-01-01", "Transport", 1.0)).await.unwrap();
    }

    #[tokio::test]
    async fn filters_combine() {
        let svc = seeded().await;

        let query = EmissionQuery {
            country: Some("France".to_string()),
            sector: Some("Power".to_string()),
            ..Default::default()
        };
        assert_eq!(svc.list(&query, page()).await.unwrap().len(), 2);

        let query = EmissionQuery {
            date_from: Some(date("2023-01-02")),
            date_to: Some(date("2023-01-31")),
            order_by: Some("-value".to_string()),
            ..Default::default()
        };
        let values: Vec<f64> = svc.list(&query, page()).await.unwrap().iter().map(|e| e.value).collect();
        assert_eq!(values, vec![30.0, 20.0]);
    }

    #[tokio::test]
    async fn update_checks_merged_key() {
        let svc = seeded().await;
        let rows = svc.list(&EmissionQuery::default(), page()).await.unwrap();
        let second = rows.iter().find(|e| e.sector == "Industry").unwrap();

        let patch = EmissionUpdate { sector: Some("Power".to_string()), date: Some(date("2023-01-01")), ..Default::default() };
        assert!(matches!(svc.update(second.id, patch).await, Err(ServiceError::Conflict(_))));

        // Rewriting a record onto its own key is not a conflict
        let patch = EmissionUpdate { value: Some(21.5), ..Default::default() };
        let updated = svc.update(second.id, patch).await.unwrap();
        assert_eq!(updated.value, 21.5);
        assert_eq!(updated.sector, "Industry");
    }

    #[tokio::test]
    async fn unknown_source_is_a_validation_error() {
        let svc = seeded().await;
        let mut payload = emission("Spain", "2023-01-01", "Power", 5.0);
        payload.source_id = Some(999);
        match svc.create(payload).await {
            Err(ServiceError::Validation(errors)) => assert!(errors.0.contains_key("source_id")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let svc = seeded().await;
        let id = svc.list(&EmissionQuery::default(), page()).await.unwrap()[0].id;
        svc.delete(id).await.unwrap();
        assert!(matches!(svc.get(id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.delete(id).await, Err(ServiceError::NotFound(_))));
    }
}
