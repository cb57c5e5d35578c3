use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::nullable;
use crate::database::repository::{FieldValues, Table};
use crate::validation::{ValidationErrors, Validator};

pub const SECTORS: &[&str] = &["Power", "Industry", "Transport", "Residential", "Commercial", "Agriculture"];

/// One country/date/sector CO2 value
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Emission {
    pub id: i64,
    pub country: String,
    pub date: NaiveDate,
    pub sector: String,
    pub value: f64,
    pub timestamp: i64,
    pub source_id: Option<i64>,
}

impl Table for Emission {
    const TABLE: &'static str = "co2_emissions_by_sector";
    const COLUMNS: &'static [&'static str] = &["id", "country", "date", "sector", "value", "timestamp", "source_id"];

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmissionCreate {
    pub country: String,
    pub date: NaiveDate,
    pub sector: String,
    pub value: f64,
    pub timestamp: i64,
    #[serde(default)]
    pub source_id: Option<i64>,
}

impl EmissionCreate {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.length("country", &self.country, 2, Some(100))
            .one_of("sector", &self.sector, SECTORS)
            .non_negative("value", self.value);
        if self.timestamp < 0 {
            v.fail("timestamp", "must be greater than or equal to 0");
        }
        v.finish()
    }

    pub fn into_fields(self) -> FieldValues {
        vec![
            ("country", Value::from(self.country)),
            ("date", Value::from(self.date.to_string())),
            ("sector", Value::from(self.sector)),
            ("value", Value::from(self.value)),
            ("timestamp", Value::from(self.timestamp)),
            ("source_id", self.source_id.map(Value::from).unwrap_or(Value::Null)),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmissionUpdate {
    pub country: Option<String>,
    pub date: Option<NaiveDate>,
    pub sector: Option<String>,
    pub value: Option<f64>,
    pub timestamp: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub source_id: Option<Option<i64>>,
}

impl EmissionUpdate {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let Some(country) = &self.country {
            v.length("country", country, 2, Some(100));
        }
        if let Some(sector) = &self.sector {
            v.one_of("sector", sector, SECTORS);
        }
        if let Some(value) = self.value {
            v.non_negative("value", value);
        }
        if matches!(self.timestamp, Some(t) if t < 0) {
            v.fail("timestamp", "must be greater than or equal to 0");
        }
        v.finish()
    }

    pub fn into_fields(self) -> FieldValues {
        let mut fields = FieldValues::new();
        if let Some(country) = self.country {
            fields.push(("country", Value::from(country)));
        }
        if let Some(date) = self.date {
            fields.push(("date", Value::from(date.to_string())));
        }
        if let Some(sector) = self.sector {
            fields.push(("sector", Value::from(sector)));
        }
        if let Some(value) = self.value {
            fields.push(("value", Value::from(value)));
        }
        if let Some(timestamp) = self.timestamp {
            fields.push(("timestamp", Value::from(timestamp)));
        }
        if let Some(source_id) = self.source_id {
            fields.push(("source_id", source_id.map(Value::from).unwrap_or(Value::Null)));
        }
        fields
    }
}
