pub mod auth;
pub mod error_details;

pub use auth::{require_auth, CurrentUser};
pub use error_details::expose_error_details;
