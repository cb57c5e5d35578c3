pub mod auth;
pub mod extract;
pub mod response;

pub use auth::{jwt_auth_middleware, require_admin_middleware, AuthUser};
pub use extract::{ApiForm, ApiJson, ApiPath, ApiQuery};
pub use response::{ApiResponse, ApiResult};
