// handlers/elevated/mod.rs - Elevated handlers (admin JWT required)
//
// Dataset writes and account administration. The router wraps every handler
// here in `jwt_auth_middleware` followed by `require_admin_middleware`.

pub mod air_quality;
pub mod emissions;
pub mod sources;
pub mod users;
