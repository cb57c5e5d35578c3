use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::init::{AIR_QUALITY_SOURCE, CO2_SOURCE};
use crate::cli::utils::{output_details, output_success};
use crate::cli::{CliContext, OutputFormat};
use crate::database::models::{AirQualityCreate, EmissionCreate};
use crate::services::{AirQualityService, EmissionService, ServiceError, ServiceResult, SourceService};

#[derive(Subcommand)]
pub enum LoadCommands {
    #[command(about = "Load CO2 emissions (country,date,sector,value,timestamp; date as DD/MM/YYYY)")]
    Emissions {
        #[arg(help = "Path to the CSV file")]
        path: PathBuf,
    },

    #[command(name = "air-quality", about = "Load air quality measurements (date as YYYY-MM-DD)")]
    AirQuality {
        #[arg(help = "Path to the CSV file")]
        path: PathBuf,
    },
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct LoadSummary {
    pub inserted: usize,
    pub duplicates: usize,
    pub invalid: usize,
}

/// Rows written per transaction
pub const BATCH_SIZE: usize = 1_000;

impl LoadSummary {
    /// Count one row outcome and report whether it was written. Only
    /// unexpected failures abort the load.
    fn record<T>(&mut self, line: usize, result: ServiceResult<T>) -> anyhow::Result<bool> {
        match result {
            Ok(_) => {
                self.inserted += 1;
                return Ok(true);
            }
            Err(ServiceError::Conflict(_)) => self.duplicates += 1,
            Err(ServiceError::Validation(errors)) => {
                tracing::warn!("Skipping row {}: {}", line, errors);
                self.invalid += 1;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(false)
    }

    fn reject(&mut self, line: usize, reason: impl std::fmt::Display) {
        tracing::warn!("Skipping row {}: {}", line, reason);
        self.invalid += 1;
    }
}

#[derive(Debug, Deserialize)]
struct EmissionRow {
    country: String,
    date: String,
    sector: String,
    value: f64,
    timestamp: f64,
}

#[derive(Debug, Deserialize)]
struct AirQualityRow {
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "PM2.5")]
    pm25: f64,
    #[serde(rename = "PM10")]
    pm10: f64,
    #[serde(rename = "NO2")]
    no2: f64,
    #[serde(rename = "SO2")]
    so2: f64,
    #[serde(rename = "CO")]
    co: f64,
    #[serde(rename = "O3")]
    o3: f64,
    #[serde(rename = "Temperature")]
    temperature: f64,
    #[serde(rename = "Humidity")]
    humidity: f64,
    #[serde(rename = "Wind Speed")]
    wind_speed: f64,
}

/// Insert every emission row from `reader`, committing every `batch_size`
/// written rows. An unexpected error rolls back the open batch; earlier
/// batches stay. Rows are numbered from 2 in log messages so they line up
/// with the file including its header.
pub async fn load_emissions<R: Read>(
    service: &EmissionService,
    reader: R,
    source_id: Option<i64>,
    batch_size: usize,
) -> anyhow::Result<LoadSummary> {
    let mut summary = LoadSummary::default();
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut tx = service.begin().await?;
    let mut pending = 0;

    for (index, row) in csv_reader.deserialize::<EmissionRow>().enumerate() {
        let line = index + 2;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                summary.reject(line, e);
                continue;
            }
        };
        let date = match NaiveDate::parse_from_str(row.date.trim(), "%d/%m/%Y") {
            Ok(date) => date,
            Err(e) => {
                summary.reject(line, format!("bad date '{}': {}", row.date, e));
                continue;
            }
        };

        let payload = EmissionCreate {
            country: row.country,
            date,
            sector: row.sector,
            value: row.value,
            timestamp: row.timestamp as i64,
            source_id,
        };
        if summary.record(line, service.create_on(&mut tx, payload).await)? {
            pending += 1;
        }

        if pending == batch_size {
            tx.commit().await?;
            tracing::info!("{} emissions committed...", summary.inserted);
            tx = service.begin().await?;
            pending = 0;
        }
    }

    tx.commit().await?;
    Ok(summary)
}

pub async fn load_air_quality<R: Read>(
    service: &AirQualityService,
    reader: R,
    source_id: Option<i64>,
    batch_size: usize,
) -> anyhow::Result<LoadSummary> {
    let mut summary = LoadSummary::default();
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut tx = service.begin().await?;
    let mut pending = 0;

    for (index, row) in csv_reader.deserialize::<AirQualityRow>().enumerate() {
        let line = index + 2;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                summary.reject(line, e);
                continue;
            }
        };
        let date = match NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d") {
            Ok(date) => date,
            Err(e) => {
                summary.reject(line, format!("bad date '{}': {}", row.date, e));
                continue;
            }
        };

        let payload = AirQualityCreate {
            city: row.city,
            country: row.country,
            date,
            pm25: row.pm25,
            pm10: row.pm10,
            no2: row.no2,
            so2: row.so2,
            co: row.co,
            o3: row.o3,
            temperature: row.temperature,
            humidity: row.humidity,
            wind_speed: row.wind_speed,
            source_id,
        };
        if summary.record(line, service.create_on(&mut tx, payload).await)? {
            pending += 1;
        }

        if pending == batch_size {
            tx.commit().await?;
            tracing::info!("{} air quality measurements committed...", summary.inserted);
            tx = service.begin().await?;
            pending = 0;
        }
    }

    tx.commit().await?;
    Ok(summary)
}

async fn source_id(ctx: &CliContext, name: &str) -> anyhow::Result<Option<i64>> {
    let source = SourceService::new(ctx.pool.clone()).find_by_name(name).await?;
    if source.is_none() {
        tracing::warn!("Source '{}' not found; run `ecotrack init` to link rows to it", name);
    }
    Ok(source.map(|s| s.id))
}

pub async fn handle(cmd: LoadCommands, ctx: &CliContext, output_format: OutputFormat) -> anyhow::Result<()> {
    let (label, path, summary, total) = match cmd {
        LoadCommands::Emissions { path } => {
            let file = File::open(&path).with_context(|| format!("cannot open {}", path.display()))?;
            let source_id = source_id(ctx, CO2_SOURCE).await?;
            let service = EmissionService::new(ctx.pool.clone());
            let summary = load_emissions(&service, file, source_id, BATCH_SIZE).await?;
            ("emissions", path, summary, service.total().await?)
        }
        LoadCommands::AirQuality { path } => {
            let file = File::open(&path).with_context(|| format!("cannot open {}", path.display()))?;
            let source_id = source_id(ctx, AIR_QUALITY_SOURCE).await?;
            let service = AirQualityService::new(ctx.pool.clone());
            let summary = load_air_quality(&service, file, source_id, BATCH_SIZE).await?;
            ("air quality measurements", path, summary, service.total().await?)
        }
    };

    output_success(
        &output_format,
        &format!("Loaded {} {} from {}", summary.inserted, label, path.display()),
        Some(json!({ "summary": summary, "total": total })),
    )?;
    output_details(
        &output_format,
        &[
            ("Duplicates skipped", summary.duplicates.to_string()),
            ("Invalid rows skipped", summary.invalid.to_string()),
            ("Rows in table", total.to_string()),
        ],
    );
    Ok(())
}
