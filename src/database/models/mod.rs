pub mod air_quality;
pub mod emission;
pub mod source;
pub mod user;

pub use air_quality::{AirQuality, AirQualityCreate, AirQualityUpdate};
pub use emission::{Emission, EmissionCreate, EmissionUpdate, SECTORS};
pub use source::{Source, SourceCreate, SourceUpdate};
pub use user::{User, UserCreate, UserResponse, UserUpdate, ROLES};

use serde::{Deserialize, Deserializer};

/// Distinguish an explicit `null` from an absent key in patch payloads.
/// Use with `#[serde(default, deserialize_with = "nullable")]`.
pub(crate) fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
