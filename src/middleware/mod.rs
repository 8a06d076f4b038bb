pub mod auth;
pub mod response;

pub use auth::{require_admin, require_session, session_token, AuthUser};
pub use response::{ApiResponse, ApiResult};
