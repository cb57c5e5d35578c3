use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// bcrypt only consumes this many bytes of input
pub const BCRYPT_MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User email
    pub sub: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(email: impl Into<String>, role: impl Into<String>, expiry_minutes: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: email.into(),
            role: role.into(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(expiry_minutes)).timestamp(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin.as_str()
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Verify signature and expiry, returning the embedded claims
pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

fn truncated(password: &str) -> &[u8] {
    let bytes = password.as_bytes();
    &bytes[..bytes.len().min(BCRYPT_MAX_PASSWORD_BYTES)]
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(truncated(password), cost).map_err(|e| AuthError::Hash(e.to_string()))
}

/// A malformed stored hash counts as a mismatch rather than an error
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(truncated(password), hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!("Password verification failed: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";
    const COST: u32 = 4;

    #[test]
    fn jwt_round_trip() {
        let claims = Claims::new("admin@ecotrack.com", "admin", 60);
        let token = generate_jwt(&claims, SECRET).unwrap();
        let decoded = validate_jwt(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, "admin@ecotrack.com");
        assert!(decoded.is_admin());
    }

    #[test]
    fn jwt_rejects_wrong_secret_and_expiry() {
        let token = generate_jwt(&Claims::new("u@ecotrack.com", "user", 60), SECRET).unwrap();
        assert!(matches!(validate_jwt(&token, "other"), Err(AuthError::InvalidToken(_))));

        let expired = generate_jwt(&Claims::new("u@ecotrack.com", "user", -120), SECRET).unwrap();
        assert!(matches!(validate_jwt(&expired, SECRET), Err(AuthError::InvalidToken(_))));

        assert!(validate_jwt("not.a.jwt", SECRET).is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        let claims = Claims::new("u@ecotrack.com", "user", 60);
        assert!(matches!(generate_jwt(&claims, ""), Err(AuthError::InvalidSecret)));
        assert!(matches!(validate_jwt("x", ""), Err(AuthError::InvalidSecret)));
    }

    #[test]
    fn password_hash_and_verify() {
        let hash = hash_password("admin123", COST).unwrap();
        assert_ne!(hash, "admin123");
        assert!(verify_password("admin123", &hash));
        assert!(!verify_password("admin124", &hash));
        assert!(!verify_password("admin123", "not-a-hash"));
    }

    #[test]
    fn passwords_are_truncated_to_72_bytes() {
        let base = "a".repeat(BCRYPT_MAX_PASSWORD_BYTES);
        let hash = hash_password(&format!("{}tail", base), COST).unwrap();
        assert!(verify_password(&base, &hash));
        assert!(verify_password(&format!("{}other", base), &hash));
        assert!(!verify_password(&base[..71], &hash));
    }
}
