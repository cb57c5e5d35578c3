// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Read access to the datasets, statistics, registration and token acquisition.

pub mod air_quality;
pub mod auth;
pub mod emissions;
pub mod sources;
pub mod stats;
pub mod system;
