//! Satellite field imagery handler

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::external::earth_engine::png_data_url;
use crate::middleware::AuthUser;
use crate::AppState;

/// Fewest vertices of a drawable field polygon
const MIN_FIELD_VERTICES: usize = 3;

#[derive(Deserialize)]
pub struct AnalyzeFieldInput {
    #[serde(default)]
    pub coordinates: Option<Vec<[f64; 2]>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeFieldResponse {
    pub success: bool,
    pub image_url: String,
}

pub async fn analyze_field(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<AnalyzeFieldInput>,
) -> Result<Json<AnalyzeFieldResponse>, AppError> {
    let coordinates = body
        .coordinates
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("No coordinates provided".to_string()))?;
    if coordinates.len() < MIN_FIELD_VERTICES {
        return Err(AppError::validation(
            "coordinates",
            "A field needs at least 3 points",
        ));
    }

    let client = state.earth_engine.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("Satellite imagery is not configured".to_string())
    })?;

    let png = client.true_color_png(&coordinates).await?;
    tracing::info!(
        "Fetched field image for farmer {} ({} vertices)",
        user.farmer_id,
        coordinates.len()
    );

    Ok(Json(AnalyzeFieldResponse {
        success: true,
        image_url: png_data_url(&png),
    }))
}
