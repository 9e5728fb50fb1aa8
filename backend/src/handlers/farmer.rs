//! Farmer account handlers

use axum::{extract::State, Extension, Json};
use serde::Serialize;

use super::MessageResponse;
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::{Farmer, NotificationPreferences};
use crate::services::farmer::{
    ChangePasswordInput, FarmDetailsInput, FarmerDetails, LanguageInput, UpdateProfileInput,
};
use crate::services::FarmerService;
use crate::AppState;

#[derive(Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub farmer: FarmerDetails,
}

#[derive(Serialize)]
pub struct FarmerUpdatedResponse {
    pub success: bool,
    pub message: String,
    pub farmer: Farmer,
}

#[derive(Serialize)]
pub struct NotificationsResponse {
    pub success: bool,
    pub message: String,
    pub notifications: NotificationPreferences,
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>, AppError> {
    let service = FarmerService::new(state.db.clone());
    let farmer = service.profile(user.farmer_id).await?;
    Ok(Json(ProfileResponse {
        success: true,
        farmer,
    }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<UpdateProfileInput>,
) -> Result<Json<FarmerUpdatedResponse>, AppError> {
    let service = FarmerService::new(state.db.clone());
    let farmer = service.update_profile(user.farmer_id, body).await?;
    Ok(Json(FarmerUpdatedResponse {
        success: true,
        message: "Profile updated successfully".to_string(),
        farmer,
    }))
}

pub async fn update_farm_details(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<FarmDetailsInput>,
) -> Result<Json<FarmerUpdatedResponse>, AppError> {
    let service = FarmerService::new(state.db.clone());
    let farmer = service.update_farm_details(user.farmer_id, body).await?;
    Ok(Json(FarmerUpdatedResponse {
        success: true,
        message: "Farm details updated successfully".to_string(),
        farmer,
    }))
}

pub async fn update_language(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<LanguageInput>,
) -> Result<Json<MessageResponse>, AppError> {
    let service = FarmerService::new(state.db.clone());
    service.update_language(user.farmer_id, body.language).await?;
    Ok(Json(MessageResponse::ok("Language preference updated")))
}

pub async fn update_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<NotificationPreferences>,
) -> Result<Json<NotificationsResponse>, AppError> {
    let service = FarmerService::new(state.db.clone());
    let notifications = service.update_notifications(user.farmer_id, body).await?;
    Ok(Json(NotificationsResponse {
        success: true,
        message: "Notification preferences updated".to_string(),
        notifications,
    }))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ChangePasswordInput>,
) -> Result<Json<MessageResponse>, AppError> {
    let service = FarmerService::new(state.db.clone());
    service.change_password(user.farmer_id, body).await?;
    Ok(Json(MessageResponse::ok("Password updated successfully")))
}

pub async fn delete_account(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MessageResponse>, AppError> {
    let service = FarmerService::new(state.db.clone());
    service.delete_account(user.farmer_id).await?;
    Ok(Json(MessageResponse::ok("Account deleted successfully")))
}
