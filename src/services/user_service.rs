use chrono::Utc;
use sqlx::SqlitePool;

use super::{ListQuery, Page, ServiceError, ServiceResult};
use crate::auth::{self, AuthError};
use crate::database::models::{User, UserCreate, UserUpdate};
use crate::database::{Repository, UniqueKeys};
use crate::filter::FilterData;
use crate::validation::normalize_email;

const NOT_FOUND: &str = "User not found";
const DUPLICATE_EMAIL: &str = "A user with this email already exists";
const DUPLICATE_USERNAME: &str = "A user with this username already exists";
const UNIQUE: UniqueKeys = &[("email", DUPLICATE_EMAIL), ("username", DUPLICATE_USERNAME)];

/// Account management and credential checks
pub struct UserService {
    repo: Repository<User>,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(pool: SqlitePool, bcrypt_cost: u32) -> Self {
        Self {
            repo: Repository::new(pool),
            bcrypt_cost,
        }
    }

    pub async fn list(&self, query: &ListQuery, page: Page) -> ServiceResult<Vec<User>> {
        let filter = FilterData::new()
            .order_by(query.order_by.clone())
            .paginate(page.skip, page.limit);
        Ok(self.repo.select_any(filter).await?)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<User> {
        Ok(self.repo.select_404(id, NOT_FOUND).await?)
    }

    pub async fn get_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        let email = normalize_email(email);
        Ok(self.repo.select_one(FilterData::new().where_eq("email", Some(email))).await?)
    }

    /// Email is checked before username so a clash on both reports the email
    async fn check_unique(&self, email: Option<&str>, username: Option<&str>, except_id: Option<i64>) -> ServiceResult<()> {
        if let Some(email) = email {
            if self.repo.exists(FilterData::new().where_eq("email", Some(email)), except_id).await? {
                return Err(ServiceError::Conflict(DUPLICATE_EMAIL.to_string()));
            }
        }
        if let Some(username) = username {
            if self.repo.exists(FilterData::new().where_eq("username", Some(username)), except_id).await? {
                return Err(ServiceError::Conflict(DUPLICATE_USERNAME.to_string()));
            }
        }
        Ok(())
    }

    /// bcrypt is CPU bound, keep it off the async workers
    async fn hash(&self, password: String) -> ServiceResult<String> {
        let cost = self.bcrypt_cost;
        let hashed = tokio::task::spawn_blocking(move || auth::hash_password(&password, cost))
            .await
            .map_err(|e| AuthError::Hash(e.to_string()))??;
        Ok(hashed)
    }

    pub async fn create(&self, payload: UserCreate) -> ServiceResult<User> {
        let payload = payload.normalized();
        payload.validate()?;
        self.check_unique(Some(&payload.email), Some(&payload.username), None).await?;

        let password_hash = self.hash(payload.password.clone()).await?;
        let user = self
            .repo
            .insert(payload.into_fields(password_hash, Utc::now()), UNIQUE)
            .await?;

        tracing::info!("Registered user {} ({}) with role {}", user.id, user.email, user.role);
        Ok(user)
    }

    pub async fn update(&self, id: i64, payload: UserUpdate) -> ServiceResult<User> {
        self.repo.select_404(id, NOT_FOUND).await?;
        let payload = payload.normalized();
        payload.validate()?;
        self.check_unique(payload.email.as_deref(), payload.username.as_deref(), Some(id)).await?;

        let password_hash = match payload.password.clone() {
            Some(password) => Some(self.hash(password).await?),
            None => None,
        };

        self.repo
            .update(id, payload.into_fields(password_hash), UNIQUE)
            .await?
            .ok_or_else(|| ServiceError::NotFound(NOT_FOUND.to_string()))
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.repo.delete(id).await? {
            return Err(ServiceError::NotFound(NOT_FOUND.to_string()));
        }
        tracing::info!("Deleted user {}", id);
        Ok(())
    }

    /// Returns the user only when the email exists and the password matches
    pub async fn authenticate(&self, email: &str, password: &str) -> ServiceResult<Option<User>> {
        let Some(user) = self.get_by_email(email).await? else {
            return Ok(None);
        };

        let password = password.to_string();
        let hash = user.password.clone();
        let matches = tokio::task::spawn_blocking(move || auth::verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::Hash(e.to_string()))?;

        Ok(matches.then_some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{DatabaseError, DatabaseManager};

    fn new_user(username: &str, email: &str) -> UserCreate {
        UserCreate {
            username: username.to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            role: "user".to_string(),
        }
    }

    async fn service() -> UserService {
        UserService::new(DatabaseManager::memory().await.unwrap(), 4)
    }

    #[tokio::test]
    async fn create_hashes_password() {
        let svc = service().await;
        let user = svc.create(new_user("alice", "alice@ecotrack.com")).await.unwrap();
        assert_ne!(user.password, "secret123");
        assert!(user.password.starts_with("$2"));
        assert_eq!(user.role, "user");
    }

    #[tokio::test]
    async fn email_conflict_is_reported_before_username() {
        let svc = service().await;
        svc.create(new_user("alice", "alice@ecotrack.com")).await.unwrap();

        let err = svc.create(new_user("alice", "alice@ecotrack.com")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(msg) if msg == DUPLICATE_EMAIL));

        let err = svc.create(new_user("alice", "other@ecotrack.com")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(msg) if msg == DUPLICATE_USERNAME));
    }

    #[tokio::test]
    async fn update_excludes_self_from_uniqueness() {
        let svc = service().await;
        let alice = svc.create(new_user("alice", "alice@ecotrack.com")).await.unwrap();
        svc.create(new_user("bob", "bob@ecotrack.com")).await.unwrap();

        let same = UserUpdate { email: Some("alice@ecotrack.com".to_string()), ..Default::default() };
        svc.update(alice.id, same).await.unwrap();

        let taken = UserUpdate { username: Some("bob".to_string()), ..Default::default() };
        assert!(matches!(svc.update(alice.id, taken).await, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn updated_password_is_hashed_and_usable() {
        let svc = service().await;
        let alice = svc.create(new_user("alice", "alice@ecotrack.com")).await.unwrap();

        let patch = UserUpdate { password: Some("n3w-pass".to_string()), ..Default::default() };
        let updated = svc.update(alice.id, patch).await.unwrap();
        assert_ne!(updated.password, "n3w-pass");
        assert_eq!(updated.username, "alice");

        assert!(svc.authenticate("alice@ecotrack.com", "n3w-pass").await.unwrap().is_some());
        assert!(svc.authenticate("alice@ecotrack.com", "secret123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn email_domain_case_does_not_make_a_new_address() {
        let svc = service().await;
        let alice = svc.create(new_user("alice", "alice@EcoTrack.COM")).await.unwrap();
        assert_eq!(alice.email, "alice@ecotrack.com");

        let err = svc.create(new_user("alice2", "alice@ECOTRACK.com")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(msg) if msg == DUPLICATE_EMAIL));

        assert!(svc.authenticate("alice@Ecotrack.Com", "secret123").await.unwrap().is_some());
        assert!(svc.get_by_email("alice@ECOTRACK.COM").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn racing_insert_reports_the_violated_column() {
        let svc = service().await;
        svc.create(new_user("alice", "alice@ecotrack.com")).await.unwrap();

        // Straight to storage, as a writer that passed the pre-check before alice existed
        let fields = new_user("alice", "second@ecotrack.com").into_fields("hash".to_string(), Utc::now());
        let err = svc.repo.insert(fields, UNIQUE).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(msg) if msg == DUPLICATE_USERNAME));

        let fields = new_user("carol", "alice@ecotrack.com").into_fields("hash".to_string(), Utc::now());
        let err = svc.repo.insert(fields, UNIQUE).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(msg) if msg == DUPLICATE_EMAIL));
    }

    #[tokio::test]
    async fn authenticate_unknown_email() {
        let svc = service().await;
        assert!(svc.authenticate("ghost@ecotrack.com", "x").await.unwrap().is_none());
    }
}
