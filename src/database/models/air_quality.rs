use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::nullable;
use crate::database::repository::{FieldValues, Table};
use crate::validation::{ValidationErrors, Validator};

/// Inclusive bounds for every numeric reading
pub const READING_BOUNDS: &[(&str, f64, f64)] = &[
    ("pm25", 0.0, 500.0),
    ("pm10", 0.0, 600.0),
    ("no2", 0.0, 200.0),
    ("so2", 0.0, 200.0),
    ("co", 0.0, 50.0),
    ("o3", 0.0, 300.0),
    ("temperature", -50.0, 60.0),
    ("humidity", 0.0, 100.0),
    ("wind_speed", 0.0, 100.0),
];

/// One city/country/date pollutant and weather reading
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AirQuality {
    pub id: i64,
    pub city: String,
    pub country: String,
    pub date: NaiveDate,
    pub pm25: f64,
    pub pm10: f64,
    pub no2: f64,
    pub so2: f64,
    pub co: f64,
    pub o3: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub source_id: Option<i64>,
}

impl Table for AirQuality {
    const TABLE: &'static str = "global_air_quality";
    const COLUMNS: &'static [&'static str] = &[
        "id", "city", "country", "date", "pm25", "pm10", "no2", "so2", "co", "o3",
        "temperature", "humidity", "wind_speed", "source_id",
    ];

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AirQualityCreate {
    pub city: String,
    pub country: String,
    pub date: NaiveDate,
    pub pm25: f64,
    pub pm10: f64,
    pub no2: f64,
    pub so2: f64,
    pub co: f64,
    pub o3: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    #[serde(default)]
    pub source_id: Option<i64>,
}

impl AirQualityCreate {
    fn readings(&self) -> [f64; 9] {
        [
            self.pm25, self.pm10, self.no2, self.so2, self.co, self.o3,
            self.temperature, self.humidity, self.wind_speed,
        ]
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.length("city", &self.city, 2, Some(100))
            .length("country", &self.country, 2, Some(100));
        for ((field, min, max), value) in READING_BOUNDS.iter().zip(self.readings()) {
            v.range(field, value, *min, *max);
        }
        v.finish()
    }

    pub fn into_fields(self) -> FieldValues {
        let mut fields: FieldValues = vec![
            ("city", Value::from(self.city.clone())),
            ("country", Value::from(self.country.clone())),
            ("date", Value::from(self.date.to_string())),
        ];
        for ((field, _, _), value) in READING_BOUNDS.iter().zip(self.readings()) {
            fields.push((*field, Value::from(value)));
        }
        fields.push(("source_id", self.source_id.map(Value::from).unwrap_or(Value::Null)));
        fields
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AirQualityUpdate {
    pub city: Option<String>,
    pub country: Option<String>,
    pub date: Option<NaiveDate>,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub no2: Option<f64>,
    pub so2: Option<f64>,
    pub co: Option<f64>,
    pub o3: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    pub source_id: Option<Option<i64>>,
}

impl AirQualityUpdate {
    fn readings(&self) -> [Option<f64>; 9] {
        [
            self.pm25, self.pm10, self.no2, self.so2, self.co, self.o3,
            self.temperature, self.humidity, self.wind_speed,
        ]
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let Some(city) = &self.city {
            v.length("city", city, 2, Some(100));
        }
        if let Some(country) = &self.country {
            v.length("country", country, 2, Some(100));
        }
        for ((field, min, max), value) in READING_BOUNDS.iter().zip(self.readings()) {
            if let Some(value) = value {
                v.range(field, value, *min, *max);
            }
        }
        v.finish()
    }

    pub fn into_fields(self) -> FieldValues {
        let mut fields = FieldValues::new();
        if let Some(city) = &self.city {
            fields.push(("city", Value::from(city.clone())));
        }
        if let Some(country) = &self.country {
            fields.push(("country", Value::from(country.clone())));
        }
        if let Some(date) = self.date {
            fields.push(("date", Value::from(date.to_string())));
        }
        for ((field, _, _), value) in READING_BOUNDS.iter().zip(self.readings()) {
            if let Some(value) = value {
                fields.push((*field, Value::from(value)));
            }
        }
        if let Some(source_id) = self.source_id {
            fields.push(("source_id", source_id.map(Value::from).unwrap_or(Value::Null)));
        }
        fields
    }
}
