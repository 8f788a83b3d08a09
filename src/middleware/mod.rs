pub mod auth;
pub mod guard;
pub mod json;
pub mod response;

pub use auth::{authenticate, identify, jwt_auth_middleware};
pub use guard::route_guard_middleware;
pub use json::JsonBody;
pub use response::{ApiResponse, ApiResult};
