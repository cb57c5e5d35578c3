use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::auth::Role;
use crate::database::repository::{FieldValues, Table};
use crate::validation::{normalize_email, ValidationErrors, Validator};

/// Accepted values of `users.role`
pub const ROLES: &[&str] = &[Role::User.as_str(), Role::Admin.as_str()];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// bcrypt hash
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl Table for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &["id", "username", "email", "role", "created_at"];

    fn id(&self) -> i64 {
        self.id
    }
}

/// Public view of a user, without the password hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

fn default_role() -> String {
    Role::User.as_str().to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
}

impl UserCreate {
    /// Lowercase the email domain so lookups and uniqueness ignore its case
    pub fn normalized(mut self) -> Self {
        self.email = normalize_email(&self.email);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .length("username", &self.username, 3, Some(50))
            .email("email", &self.email)
            .length("password", &self.password, 1, None)
            .one_of("role", &self.role, ROLES)
            .finish()
    }

    /// Column values for insertion; the plain password is replaced by `password_hash`
    pub fn into_fields(self, password_hash: String, created_at: DateTime<Utc>) -> FieldValues {
        vec![
            ("username", Value::from(self.username)),
            ("email", Value::from(self.email)),
            ("password", Value::from(password_hash)),
            ("role", Value::from(self.role)),
            ("created_at", Value::from(created_at.to_rfc3339())),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

impl UserUpdate {
    pub fn normalized(mut self) -> Self {
        self.email = self.email.map(|email| normalize_email(&email));
        self
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let Some(username) = &self.username {
            v.length("username", username, 3, Some(50));
        }
        if let Some(email) = &self.email {
            v.email("email", email);
        }
        if let Some(password) = &self.password {
            v.length("password", password, 1, None);
        }
        if let Some(role) = &self.role {
            v.one_of("role", role, ROLES);
        }
        v.finish()
    }

    /// Column values for the patch; a new password must already be hashed
    pub fn into_fields(self, password_hash: Option<String>) -> FieldValues {
        let mut fields = FieldValues::new();
        if let Some(username) = self.username {
            fields.push(("username", Value::from(username)));
        }
        if let Some(email) = self.email {
            fields.push(("email", Value::from(email)));
        }
        if let Some(hash) = password_hash {
            fields.push(("password", Value::from(hash)));
        }
        if let Some(role) = self.role {
            fields.push(("role", Value::from(role)));
        }
        fields
    }
}
