use sqlx::SqlitePool;

use super::{ListQuery, Page, ServiceError, ServiceResult};
use crate::database::models::{Source, SourceCreate, SourceUpdate};
use crate::database::{Repository, UniqueKeys};
use crate::filter::FilterData;

const NOT_FOUND: &str = "Source not found";
const DUPLICATE: &str = "A source with this name already exists";
const UNIQUE: UniqueKeys = &[("name", DUPLICATE)];

pub struct SourceService {
    repo: Repository<Source>,
}

impl SourceService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { repo: Repository::new(pool) }
    }

    pub async fn list(&self, query: &ListQuery, page: Page) -> ServiceResult<Vec<Source>> {
        let filter = FilterData::new()
            .order_by(query.order_by.clone())
            .paginate(page.skip, page.limit);
        Ok(self.repo.select_any(filter).await?)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Source> {
        Ok(self.repo.select_404(id, NOT_FOUND).await?)
    }

    pub async fn find_by_name(&self, name: &str) -> ServiceResult<Option<Source>> {
        Ok(self.repo.select_one(FilterData::new().where_eq("name", Some(name))).await?)
    }

    pub async fn create(&self, payload: SourceCreate) -> ServiceResult<Source> {
        payload.validate()?;

        if self.find_by_name(&payload.name).await?.is_some() {
            return Err(ServiceError::Conflict(DUPLICATE.to_string()));
        }

        let source = self.repo.insert(payload.into_fields(), UNIQUE).await?;
        tracing::info!("Created source {} ({})", source.id, source.name);
        Ok(source)
    }

    /// Patch update; the name uniqueness rule only applies at creation
    pub async fn update(&self, id: i64, payload: SourceUpdate) -> ServiceResult<Source> {
        self.repo.select_404(id, NOT_FOUND).await?;
        payload.validate()?;

        self.repo
            .update(id, payload.into_fields(), UNIQUE)
            .await?
            .ok_or_else(|| ServiceError::NotFound(NOT_FOUND.to_string()))
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.repo.delete(id).await? {
            return Err(ServiceError::NotFound(NOT_FOUND.to_string()));
        }
        tracing::info!("Deleted source {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::DatabaseManager;

    fn create(name: &str) -> SourceCreate {
        SourceCreate {
            name: name.to_string(),
            origin: "Carbon Monitor".to_string(),
            description: Some("Daily CO2 emissions by sector and country".to_string()),
        }
    }

    async fn service() -> SourceService {
        SourceService::new(DatabaseManager::memory().await.unwrap())
    }

    #[tokio::test]
    async fn create_rejects_duplicate_name() {
        let svc = service().await;
        let source = svc.create(create("CO2 Emissions Dataset")).await.unwrap();
        assert!(source.id > 0);

        let err = svc.create(create("CO2 Emissions Dataset")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(msg) if msg == DUPLICATE));
    }

    #[tokio::test]
    async fn update_touches_only_supplied_fields() {
        let svc = service().await;
        let source = svc.create(create("Air Dataset")).await.unwrap();

        let patch = SourceUpdate { origin: Some("WHO".to_string()), ..Default::default() };
        let updated = svc.update(source.id, patch).await.unwrap();
        assert_eq!(updated.origin, "WHO");
        assert_eq!(updated.name, "Air Dataset");
        assert_eq!(updated.description, source.description);

        let cleared = svc
            .update(source.id, SourceUpdate { description: Some(None), ..Default::default() })
            .await
            .unwrap();
        assert!(cleared.description.is_none());
        assert_eq!(cleared.origin, "WHO");
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let svc = service().await;
        assert!(matches!(svc.get(42).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.update(42, SourceUpdate::default()).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.delete(42).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_paginates_and_sorts() {
        let svc = service().await;
        for name in ["Alpha", "Bravo", "Charlie", "Delta"] {
            svc.create(create(name)).await.unwrap();
        }
        let api = AppConfig::development().api;

        let query = ListQuery { order_by: Some("-name".to_string()), ..Default::default() };
        let page = Page::new(Some(1), Some(2), &api).unwrap();
        let names: Vec<String> = svc.list(&query, page).await.unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Charlie", "Bravo"]);
    }
}
