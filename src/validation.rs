//! Declarative field checks applied to request payloads before persistence.
//!
//! Each payload collects its failures into a [`Validator`] so the client gets
//! every offending field in one response rather than the first one only.

use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Error)]
#[error("Invalid input: {}", summary(.0))]
pub struct ValidationErrors(pub BTreeMap<String, String>);

fn summary(errors: &BTreeMap<String, String>) -> String {
    errors.keys().cloned().collect::<Vec<_>>().join(", ")
}

impl ValidationErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.to_string(), message.into());
        Self(errors)
    }
}

#[derive(Debug, Default)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Character count within `min..=max`
    pub fn length(&mut self, field: &str, value: &str, min: usize, max: Option<usize>) -> &mut Self {
        let len = value.chars().count();
        if len < min {
            self.fail(field, format!("must be at least {} characters", min));
        } else if let Some(max) = max {
            if len > max {
                self.fail(field, format!("must be at most {} characters", max));
            }
        }
        self
    }

    pub fn range(&mut self, field: &str, value: f64, min: f64, max: f64) -> &mut Self {
        if !value.is_finite() || value < min || value > max {
            self.fail(field, format!("must be between {} and {}", min, max));
        }
        self
    }

    pub fn non_negative(&mut self, field: &str, value: f64) -> &mut Self {
        if !value.is_finite() || value < 0.0 {
            self.fail(field, "must be greater than or equal to 0");
        }
        self
    }

    pub fn one_of(&mut self, field: &str, value: &str, allowed: &[&str]) -> &mut Self {
        if !allowed.contains(&value) {
            self.fail(field, format!("must be one of: {}", allowed.join(", ")));
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if let Err(msg) = validate_email_format(value) {
            self.fail(field, msg);
        }
        self
    }

    pub fn fail(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        // Keep the first failure per field
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
        self
    }

    pub fn finish(&mut self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(std::mem::take(&mut self.errors)))
        }
    }
}

/// Canonical form of an address: the domain is case-insensitive and stored
/// lowercased, the local part is kept as given.
pub fn normalize_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Syntactic email check: one `@`, a non-empty local part, and a dotted
/// domain whose labels are non-empty.
pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.chars().any(char::is_whitespace) {
        return Err("Invalid email format".to_string());
    }

    let (local, domain) = email.split_once('@').ok_or_else(|| "Invalid email format".to_string())?;
    if local.is_empty() || domain.contains('@') {
        return Err("Invalid email format".to_string());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty() || l.starts_with('-') || l.ends_with('-')) {
        return Err("Invalid email domain".to_string());
    }

    Ok(())
}
