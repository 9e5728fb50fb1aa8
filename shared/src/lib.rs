//! Shared types and scoring logic for the SOILY platform
//!
//! This crate contains the domain models, soil scoring rules, crop matching
//! and history aggregation shared between the backend, the report renderer
//! and the browser (via WASM).

pub mod aggregation;
pub mod crops;
pub mod models;
pub mod scoring;
pub mod types;
pub mod validation;

pub use aggregation::*;
pub use crops::*;
pub use models::*;
pub use scoring::*;
pub use types::*;
pub use validation::*;
