// HTTP routes
pub mod admin;
pub mod auth;
pub mod health;

pub use admin::*;
pub use auth::*;
pub use health::*;

use serde::Serialize;

/// Body for endpoints that only report success
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
