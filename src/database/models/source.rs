use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::nullable;
use crate::database::repository::{FieldValues, Table};
use crate::validation::{ValidationErrors, Validator};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Source {
    pub id: i64,
    pub name: String,
    pub origin: String,
    pub description: Option<String>,
}

impl Table for Source {
    const TABLE: &'static str = "sources";
    const COLUMNS: &'static [&'static str] = &["id", "name", "origin", "description"];

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceCreate {
    pub name: String,
    pub origin: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl SourceCreate {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.length("name", &self.name, 2, Some(100))
            .length("origin", &self.origin, 2, Some(200));
        if let Some(description) = &self.description {
            v.length("description", description, 0, Some(500));
        }
        v.finish()
    }

    pub fn into_fields(self) -> FieldValues {
        vec![
            ("name", Value::from(self.name)),
            ("origin", Value::from(self.origin)),
            ("description", self.description.map(Value::from).unwrap_or(Value::Null)),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceUpdate {
    pub name: Option<String>,
    pub origin: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl SourceUpdate {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let Some(name) = &self.name {
            v.length("name", name, 2, Some(100));
        }
        if let Some(origin) = &self.origin {
            v.length("origin", origin, 2, Some(200));
        }
        if let Some(Some(description)) = &self.description {
            v.length("description", description, 0, Some(500));
        }
        v.finish()
    }

    pub fn into_fields(self) -> FieldValues {
        let mut fields = FieldValues::new();
        if let Some(name) = self.name {
            fields.push(("name", Value::from(name)));
        }
        if let Some(origin) = self.origin {
            fields.push(("origin", Value::from(origin)));
        }
        if let Some(description) = self.description {
            fields.push(("description", description.map(Value::from).unwrap_or(Value::Null)));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let absent: SourceUpdate = serde_json::from_str(r#"{"name": "Carbon Monitor"}"#).unwrap();
        assert!(absent.description.is_none());
        assert_eq!(absent.into_fields().len(), 1);

        let cleared: SourceUpdate = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));
        let fields = cleared.into_fields();
        assert_eq!(fields, vec![("description", Value::Null)]);
    }

    #[test]
    fn create_enforces_lengths() {
        let source = SourceCreate {
            name: "X".to_string(),
            origin: "Carbon Monitor".to_string(),
            description: Some("d".repeat(501)),
        };
        let err = source.validate().unwrap_err();
        assert!(err.0.contains_key("name"));
        assert!(err.0.contains_key("description"));
        assert!(!err.0.contains_key("origin"));
    }
}
