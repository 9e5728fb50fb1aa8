//! Soil analysis and report handlers

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use report::{FarmerHeading, RenderContext, RenderResult, RenderedReport};
use serde::Serialize;
use uuid::Uuid;

use super::MessageResponse;
use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::SoilAnalysis;
use crate::services::soil_analysis::{
    preview, NotesInput, PreviewInput, PreviewResult, SaveAnalysisInput,
};
use crate::services::{FarmerService, SoilAnalysisService};
use crate::AppState;
use shared::aggregation::{farmer_statistics, seasonal_trends, FarmerStatistics, SeasonalTrend};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAnalysisResponse {
    pub success: bool,
    pub message: String,
    pub analysis_id: Uuid,
    pub analysis: SoilAnalysis,
}

#[derive(Serialize)]
pub struct ReportsResponse {
    pub success: bool,
    pub reports: Vec<SoilAnalysis>,
    pub stats: FarmerStatistics,
}

#[derive(Serialize)]
pub struct ReportResponse {
    pub success: bool,
    pub report: SoilAnalysis,
}

#[derive(Serialize)]
pub struct ReportUpdatedResponse {
    pub success: bool,
    pub message: String,
    pub report: SoilAnalysis,
}

#[derive(Serialize)]
pub struct StatisticsResponse {
    pub success: bool,
    pub stats: FarmerStatistics,
}

#[derive(Serialize)]
pub struct TrendsResponse {
    pub success: bool,
    pub trends: Vec<SeasonalTrend>,
}

#[derive(Serialize)]
pub struct PreviewResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: PreviewResult,
}

pub async fn save_analysis(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<SaveAnalysisInput>,
) -> Result<Json<SaveAnalysisResponse>, AppError> {
    let service = SoilAnalysisService::new(state.db.clone());
    let analysis = service.save(user.farmer_id, body).await?;
    Ok(Json(SaveAnalysisResponse {
        success: true,
        message: "Soil analysis saved successfully".to_string(),
        analysis_id: analysis.id,
        analysis,
    }))
}

pub async fn preview_analysis(
    Json(body): Json<PreviewInput>,
) -> Result<Json<PreviewResponse>, AppError> {
    let result = preview(body)?;
    Ok(Json(PreviewResponse {
        success: true,
        result,
    }))
}

pub async fn list_reports(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ReportsResponse>, AppError> {
    let service = SoilAnalysisService::new(state.db.clone());
    let reports = service.list_active(user.farmer_id).await?;
    let stats = farmer_statistics(&reports);
    Ok(Json(ReportsResponse {
        success: true,
        reports,
        stats,
    }))
}

pub async fn get_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReportResponse>, AppError> {
    let service = SoilAnalysisService::new(state.db.clone());
    let report = service.view(user.farmer_id, id).await?;
    Ok(Json(ReportResponse {
        success: true,
        report,
    }))
}

pub async fn delete_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let service = SoilAnalysisService::new(state.db.clone());
    service.delete(user.farmer_id, id).await?;
    Ok(Json(MessageResponse::ok("Report deleted successfully")))
}

pub async fn update_report_notes(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<NotesInput>,
) -> Result<Json<ReportUpdatedResponse>, AppError> {
    let service = SoilAnalysisService::new(state.db.clone());
    let report = service.update_notes(user.farmer_id, id, body.notes).await?;
    Ok(Json(ReportUpdatedResponse {
        success: true,
        message: "Notes updated successfully".to_string(),
        report,
    }))
}

pub async fn archive_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let service = SoilAnalysisService::new(state.db.clone());
    service.archive(user.farmer_id, id).await?;
    Ok(Json(MessageResponse::ok("Report archived successfully")))
}

/// Run a CPU-bound render off the async workers
async fn render_blocking<F>(render: F) -> AppResult<RenderedReport>
where
    F: FnOnce() -> RenderResult<RenderedReport> + Send + 'static,
{
    tokio::task::spawn_blocking(render)
        .await
        .map_err(|e| AppError::Internal(format!("Report task failed: {}", e)))?
        .map_err(AppError::from)
}

fn pdf_response(report: RenderedReport) -> Response {
    let length = report.bytes.len().to_string();
    (
        [
            (header::CONTENT_TYPE, report.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", report.filename),
            ),
            (header::CONTENT_LENGTH, length),
        ],
        report.bytes,
    )
        .into_response()
}

pub async fn download_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let analyses = SoilAnalysisService::new(state.db.clone());
    let analysis = analyses.get(user.farmer_id, id).await?;
    let farmer = FarmerService::new(state.db.clone()).get(user.farmer_id).await?;

    let ctx = RenderContext::new(Utc::now()).with_logo(state.logo.clone());
    let heading = FarmerHeading::from(&farmer);
    let rendered = render_blocking(move || report::render_single(&ctx, &heading, &analysis)).await?;

    analyses.record_download(user.farmer_id, id).await?;
    tracing::info!("Farmer {} downloaded report {}", user.farmer_id, id);

    Ok(pdf_response(rendered))
}

pub async fn export_all_reports(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Response> {
    let analyses = SoilAnalysisService::new(state.db.clone())
        .list_active(user.farmer_id)
        .await?;
    if analyses.is_empty() {
        return Err(AppError::NotFound("No reports found to export".to_string()));
    }
    let farmer = FarmerService::new(state.db.clone()).get(user.farmer_id).await?;

    let ctx = RenderContext::new(Utc::now()).with_logo(state.logo.clone());
    let heading = FarmerHeading::from(&farmer);
    let count = analyses.len();
    let rendered = render_blocking(move || report::render_multi(&ctx, &heading, &analyses)).await?;

    tracing::info!("Farmer {} exported {} reports", user.farmer_id, count);
    Ok(pdf_response(rendered))
}

pub async fn get_statistics(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StatisticsResponse>, AppError> {
    let analyses = SoilAnalysisService::new(state.db.clone())
        .list_all(user.farmer_id)
        .await?;
    Ok(Json(StatisticsResponse {
        success: true,
        stats: farmer_statistics(&analyses),
    }))
}

pub async fn get_seasonal_trends(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<TrendsResponse>, AppError> {
    let analyses = SoilAnalysisService::new(state.db.clone())
        .list_all(user.farmer_id)
        .await?;
    Ok(Json(TrendsResponse {
        success: true,
        trends: seasonal_trends(&analyses),
    }))
}
