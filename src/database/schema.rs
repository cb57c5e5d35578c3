use sqlx::SqlitePool;

use super::manager::DatabaseError;

const SOURCES: &str = r#"
    CREATE TABLE IF NOT EXISTS sources (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL,
        origin      TEXT NOT NULL,
        description TEXT
    )
"#;

const EMISSIONS: &str = r#"
    CREATE TABLE IF NOT EXISTS co2_emissions_by_sector (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        country   TEXT NOT NULL,
        date      DATE NOT NULL,
        sector    TEXT NOT NULL,
        value     REAL NOT NULL,
        timestamp INTEGER NOT NULL,
        source_id INTEGER REFERENCES sources(id) ON DELETE SET NULL,
        UNIQUE (country, date, sector)
    )
"#;

const AIR_QUALITY: &str = r#"
    CREATE TABLE IF NOT EXISTS global_air_quality (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        city        TEXT NOT NULL,
        country     TEXT NOT NULL,
        date        DATE NOT NULL,
        pm25        REAL NOT NULL,
        pm10        REAL NOT NULL,
        no2         REAL NOT NULL,
        so2         REAL NOT NULL,
        co          REAL NOT NULL,
        o3          REAL NOT NULL,
        temperature REAL NOT NULL,
        humidity    REAL NOT NULL,
        wind_speed  REAL NOT NULL,
        source_id   INTEGER REFERENCES sources(id) ON DELETE SET NULL,
        UNIQUE (city, country, date)
    )
"#;

const USERS: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        username   TEXT NOT NULL UNIQUE,
        email      TEXT NOT NULL UNIQUE,
        password   TEXT NOT NULL,
        role       TEXT NOT NULL DEFAULT 'user',
        created_at DATETIME NOT NULL
    )
"#;

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS ix_emissions_country ON co2_emissions_by_sector (country)",
    "CREATE INDEX IF NOT EXISTS ix_air_quality_city ON global_air_quality (city)",
    "CREATE INDEX IF NOT EXISTS ix_air_quality_country ON global_air_quality (country)",
];

/// Create every table and index that does not exist yet
pub async fn create_all(pool: &SqlitePool) -> Result<(), DatabaseError> {
    for ddl in [SOURCES, EMISSIONS, AIR_QUALITY, USERS].into_iter().chain(INDEXES.iter().copied()) {
        sqlx::query(ddl).execute(pool).await?;
    }
    Ok(())
}
