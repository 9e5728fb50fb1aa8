//! Request middleware

pub mod auth;

pub use auth::{admin_auth, farmer_auth, AdminUser, AuthUser};
