//! Dashboard handlers

use axum::{extract::State, Extension, Json};
use chrono::Utc;
use serde::Serialize;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::services::{FarmerService, SoilAnalysisService};
use crate::AppState;
use shared::aggregation::{dashboard_summary, recent_activity, ActivityItem, DashboardSummary};
use shared::scoring::{generate_advisories, Advisory};

#[derive(Serialize)]
pub struct DashboardStatsResponse {
    pub success: bool,
    pub stats: DashboardSummary,
}

#[derive(Serialize)]
pub struct ActivityResponse {
    pub success: bool,
    pub activities: Vec<ActivityItem>,
}

#[derive(Serialize)]
pub struct AdvisoryResponse {
    pub success: bool,
    pub recommendations: Vec<Advisory>,
}

pub async fn dashboard_stats(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DashboardStatsResponse>, AppError> {
    let farmer = FarmerService::new(state.db.clone()).get(user.farmer_id).await?;
    let analyses = SoilAnalysisService::new(state.db.clone())
        .list_all(user.farmer_id)
        .await?;

    Ok(Json(DashboardStatsResponse {
        success: true,
        stats: dashboard_summary(farmer.farm_size, &analyses),
    }))
}

pub async fn recent_activities(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ActivityResponse>, AppError> {
    let farmer = FarmerService::new(state.db.clone()).get(user.farmer_id).await?;
    let analyses = SoilAnalysisService::new(state.db.clone())
        .list_all(user.farmer_id)
        .await?;

    Ok(Json(ActivityResponse {
        success: true,
        activities: recent_activity(&analyses, farmer.created_at, Utc::now()),
    }))
}

pub async fn dashboard_recommendations(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<AdvisoryResponse>, AppError> {
    let analyses = SoilAnalysisService::new(state.db.clone())
        .list_active(user.farmer_id)
        .await?;

    Ok(Json(AdvisoryResponse {
        success: true,
        recommendations: generate_advisories(analyses.first()),
    }))
}
