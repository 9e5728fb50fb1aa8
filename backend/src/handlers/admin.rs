//! Admin console handlers

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MessageResponse;
use crate::error::{AppError, AppResult};
use crate::middleware::AdminUser;
use crate::models::Farmer;
use crate::services::admin::{
    export_to_csv, AdminStatistics, AdminUpdateFarmerInput, AnalysisCsvRow, AnalysisWithFarmer,
    BulkAnalysisInput, BulkFarmerInput, FarmerWithCount, SystemReport,
};
use crate::services::AdminService;
use crate::AppState;

#[derive(Serialize)]
pub struct FarmersResponse {
    pub success: bool,
    pub farmers: Vec<FarmerWithCount>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerDetailResponse {
    pub success: bool,
    pub farmer: Farmer,
    pub analysis_count: i64,
}

#[derive(Serialize)]
pub struct AdminFarmerUpdatedResponse {
    pub success: bool,
    pub message: String,
    pub farmer: Farmer,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleStatusResponse {
    pub success: bool,
    pub message: String,
    pub is_active: bool,
}

#[derive(Serialize)]
pub struct AnalysesResponse {
    pub success: bool,
    pub analyses: Vec<AnalysisWithFarmer>,
}

#[derive(Serialize)]
pub struct AnalysisDetailResponse {
    pub success: bool,
    pub analysis: AnalysisWithFarmer,
}

#[derive(Serialize)]
pub struct AdminStatisticsResponse {
    pub success: bool,
    pub stats: AdminStatistics,
}

#[derive(Serialize)]
pub struct SystemReportResponse {
    pub success: bool,
    pub report: SystemReport,
}

#[derive(Deserialize)]
pub struct ReportQuery {
    pub format: Option<String>,
}

pub async fn admin_list_farmers(
    State(state): State<AppState>,
    Extension(_admin): Extension<AdminUser>,
) -> Result<Json<FarmersResponse>, AppError> {
    let service = AdminService::new(state.db.clone());
    let farmers = service.list_farmers().await?;
    Ok(Json(FarmersResponse {
        success: true,
        farmers,
    }))
}

pub async fn admin_get_farmer(
    State(state): State<AppState>,
    Extension(_admin): Extension<AdminUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<FarmerDetailResponse>, AppError> {
    let service = AdminService::new(state.db.clone());
    let FarmerWithCount {
        farmer,
        analysis_count,
    } = service.get_farmer(id).await?;
    Ok(Json(FarmerDetailResponse {
        success: true,
        farmer,
        analysis_count,
    }))
}

pub async fn admin_update_farmer(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<AdminUpdateFarmerInput>,
) -> Result<Json<AdminFarmerUpdatedResponse>, AppError> {
    let service = AdminService::new(state.db.clone());
    let farmer = service.update_farmer(id, body).await?;
    tracing::debug!("Farmer {} updated by {}", id, admin.username);
    Ok(Json(AdminFarmerUpdatedResponse {
        success: true,
        message: "Farmer updated successfully".to_string(),
        farmer,
    }))
}

pub async fn admin_delete_farmer(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let service = AdminService::new(state.db.clone());
    service.delete_farmer(id).await?;
    tracing::debug!("Farmer {} deleted by {}", id, admin.username);
    Ok(Json(MessageResponse::ok(
        "Farmer and all associated data deleted successfully",
    )))
}

pub async fn admin_toggle_farmer_status(
    State(state): State<AppState>,
    Extension(_admin): Extension<AdminUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ToggleStatusResponse>, AppError> {
    let service = AdminService::new(state.db.clone());
    let is_active = service.toggle_status(id).await?;
    let verb = if is_active { "activated" } else { "deactivated" };
    Ok(Json(ToggleStatusResponse {
        success: true,
        message: format!("Farmer {} successfully", verb),
        is_active,
    }))
}

pub async fn admin_bulk_delete_farmers(
    State(state): State<AppState>,
    Extension(_admin): Extension<AdminUser>,
    Json(body): Json<BulkFarmerInput>,
) -> Result<Json<MessageResponse>, AppError> {
    let service = AdminService::new(state.db.clone());
    let deleted = service.bulk_delete_farmers(body).await?;
    Ok(Json(MessageResponse::ok(format!(
        "{} farmers and their data deleted successfully",
        deleted
    ))))
}

pub async fn admin_list_analyses(
    State(state): State<AppState>,
    Extension(_admin): Extension<AdminUser>,
) -> Result<Json<AnalysesResponse>, AppError> {
    let service = AdminService::new(state.db.clone());
    let analyses = service.list_analyses().await?;
    Ok(Json(AnalysesResponse {
        success: true,
        analyses,
    }))
}

pub async fn admin_get_analysis(
    State(state): State<AppState>,
    Extension(_admin): Extension<AdminUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnalysisDetailResponse>, AppError> {
    let service = AdminService::new(state.db.clone());
    let analysis = service.get_analysis(id).await?;
    Ok(Json(AnalysisDetailResponse {
        success: true,
        analysis,
    }))
}

pub async fn admin_delete_analysis(
    State(state): State<AppState>,
    Extension(_admin): Extension<AdminUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let service = AdminService::new(state.db.clone());
    service.delete_analysis(id).await?;
    Ok(Json(MessageResponse::ok("Analysis deleted successfully")))
}

pub async fn admin_bulk_delete_analyses(
    State(state): State<AppState>,
    Extension(_admin): Extension<AdminUser>,
    Json(body): Json<BulkAnalysisInput>,
) -> Result<Json<MessageResponse>, AppError> {
    let service = AdminService::new(state.db.clone());
    let deleted = service.bulk_delete_analyses(body).await?;
    Ok(Json(MessageResponse::ok(format!(
        "{} analyses deleted successfully",
        deleted
    ))))
}

pub async fn admin_statistics(
    State(state): State<AppState>,
    Extension(_admin): Extension<AdminUser>,
) -> Result<Json<AdminStatisticsResponse>, AppError> {
    let service = AdminService::new(state.db.clone());
    let stats = service.statistics().await?;
    Ok(Json(AdminStatisticsResponse {
        success: true,
        stats,
    }))
}

/// System report as JSON, or one CSV line per analysis with `?format=csv`
pub async fn admin_system_report(
    State(state): State<AppState>,
    Extension(_admin): Extension<AdminUser>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = AdminService::new(state.db.clone());
    let report = service.system_report().await?;

    match query.format.as_deref() {
        Some("csv") => {
            let rows: Vec<AnalysisCsvRow> = report.analyses.iter().map(AnalysisCsvRow::from).collect();
            let csv = export_to_csv(&rows)?;
            let disposition = format!(
                "attachment; filename=\"soily-system-report-{}.csv\"",
                report.generated_at.format("%Y-%m-%d")
            );
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                csv,
            )
                .into_response())
        }
        None | Some("json") => Ok(Json(SystemReportResponse {
            success: true,
            report,
        })
        .into_response()),
        Some(other) => Err(AppError::validation(
            "format",
            format!("Unsupported report format '{}'", other),
        )),
    }
}
