//! HTTP handlers
//!
//! Success bodies carry `"success": true` alongside the payload; failures
//! are rendered by [`crate::error::AppError`].

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod farmer;
pub mod field;
pub mod health;
pub mod soil_analysis;

pub use admin::*;
pub use auth::*;
pub use dashboard::*;
pub use farmer::*;
pub use field::*;
pub use health::*;
pub use soil_analysis::*;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
