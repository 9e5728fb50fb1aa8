//! Business logic services for the SOILY platform

pub mod admin;
pub mod auth;
pub mod farmer;
pub mod soil_analysis;

pub use admin::AdminService;
pub use auth::AuthService;
pub use farmer::FarmerService;
pub use soil_analysis::SoilAnalysisService;
