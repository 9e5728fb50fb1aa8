//! Soil analysis service: scoring submitted samples, persistence, and report state

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    into_analyses, AnalysisRow, BoundaryGeometry, ClimateData, CropRecommendation, DataSource,
    Season, SoilAnalysis, SoilColor, SoilProperties, SoilSample, ANALYSIS_COLUMNS,
};
use shared::crops::{normalize_recommendation, recommend_crops};
use shared::scoring::{score_sample, SoilScore};
use shared::types::GeoPoint;
use shared::validation::{validate_crop_recommendation, validate_notes, validate_soil_sample};

/// Boundary as drawn on the map. Measurements are optional and derived
/// from the ring when missing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryInput {
    pub coordinates: Vec<[f64; 2]>,
    pub area: Option<f64>,
    pub perimeter: Option<f64>,
    pub center_point: Option<GeoPoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAnalysisInput {
    pub boundary: BoundaryInput,
    pub soil_properties: SoilProperties,
    pub climate_data: ClimateData,
    pub soil_color: Option<SoilColor>,
    /// Client-computed ranking; computed server-side when absent
    pub crop_recommendation: Option<CropRecommendation>,
    pub notes: Option<String>,
    pub data_source: Option<DataSource>,
    pub analysis_date: Option<DateTime<Utc>>,
    pub season: Option<Season>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewInput {
    pub soil_properties: SoilProperties,
    pub climate_data: ClimateData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResult {
    #[serde(flatten)]
    pub score: SoilScore,
    pub crop_recommendation: CropRecommendation,
}

#[derive(Debug, Deserialize)]
pub struct NotesInput {
    #[serde(default)]
    pub notes: Option<String>,
}

/// Turn a submission into a scored analysis record.
///
/// Soil health and fertility are always recomputed from the measurements;
/// client-supplied values for them are never trusted.
pub fn build_analysis(
    farmer_id: Uuid,
    input: SaveAnalysisInput,
    now: DateTime<Utc>,
) -> AppResult<SoilAnalysis> {
    let sample = SoilSample {
        soil_properties: input.soil_properties,
        climate_data: input.climate_data,
    };
    validate_soil_sample(&sample)?;

    if let Some(notes) = &input.notes {
        validate_notes(notes).map_err(|m| AppError::validation("notes", m))?;
    }

    let boundary = BoundaryGeometry::with_measurements(
        input.boundary.coordinates,
        input.boundary.area,
        input.boundary.perimeter,
        input.boundary.center_point,
    )?;

    let crop_recommendation = match input.crop_recommendation {
        Some(rec) => {
            validate_crop_recommendation(&rec)?;
            normalize_recommendation(rec)?
        }
        None => recommend_crops(&sample),
    };

    let score = score_sample(&sample);
    let analysis_date = input.analysis_date.unwrap_or(now);

    Ok(SoilAnalysis {
        id: Uuid::new_v4(),
        farmer_id,
        boundary,
        sample,
        soil_color: input.soil_color,
        crop_recommendation,
        soil_health: score.soil_health,
        fertility_rating: score.fertility_rating,
        season: input
            .season
            .unwrap_or_else(|| Season::from_month(analysis_date.month())),
        analysis_date,
        data_source: input.data_source.unwrap_or_default(),
        notes: input.notes,
        is_archived: false,
        report_viewed: false,
        report_downloaded: false,
        download_count: 0,
        created_at: now,
        updated_at: now,
    })
}

/// Score a sample without storing anything
pub fn preview(input: PreviewInput) -> AppResult<PreviewResult> {
    let sample = SoilSample {
        soil_properties: input.soil_properties,
        climate_data: input.climate_data,
    };
    validate_soil_sample(&sample)?;
    Ok(PreviewResult {
        score: score_sample(&sample),
        crop_recommendation: recommend_crops(&sample),
    })
}

/// Soil analysis service
#[derive(Clone)]
pub struct SoilAnalysisService {
    db: PgPool,
}

impl SoilAnalysisService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn save(&self, farmer_id: Uuid, input: SaveAnalysisInput) -> AppResult<SoilAnalysis> {
        let analysis = build_analysis(farmer_id, input, Utc::now())?;

        sqlx::query(
            r#"
            INSERT INTO soil_analyses (
                id, farmer_id, boundary, soil_properties, climate_data, soil_color,
                crop_recommendation, soil_health, fertility_rating, analysis_date, season,
                data_source, notes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14)
            "#,
        )
        .bind(analysis.id)
        .bind(analysis.farmer_id)
        .bind(Json(&analysis.boundary))
        .bind(Json(&analysis.sample.soil_properties))
        .bind(Json(&analysis.sample.climate_data))
        .bind(analysis.soil_color.as_ref().map(Json))
        .bind(Json(&analysis.crop_recommendation))
        .bind(analysis.soil_health.as_str())
        .bind(analysis.fertility_rating)
        .bind(analysis.analysis_date)
        .bind(analysis.season.as_str())
        .bind(analysis.data_source.as_str())
        .bind(&analysis.notes)
        .bind(analysis.created_at)
        .execute(&self.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::not_found("Farmer")
            }
            _ => AppError::DatabaseError(e),
        })?;

        tracing::info!(
            "Saved analysis {} for farmer {} ({:?}, fertility {:.1})",
            analysis.id,
            farmer_id,
            analysis.soil_health,
            analysis.fertility_rating
        );
        Ok(analysis)
    }

    /// Every analysis of the farmer, archived included, newest first
    pub async fn list_all(&self, farmer_id: Uuid) -> AppResult<Vec<SoilAnalysis>> {
        let query = format!(
            "SELECT {} FROM soil_analyses WHERE farmer_id = $1 ORDER BY analysis_date DESC, created_at DESC",
            ANALYSIS_COLUMNS
        );
        let rows = sqlx::query_as::<_, AnalysisRow>(&query)
            .bind(farmer_id)
            .fetch_all(&self.db)
            .await?;
        into_analyses(rows)
    }

    /// Non-archived analyses, newest first
    pub async fn list_active(&self, farmer_id: Uuid) -> AppResult<Vec<SoilAnalysis>> {
        let query = format!(
            "SELECT {} FROM soil_analyses WHERE farmer_id = $1 AND NOT is_archived ORDER BY analysis_date DESC, created_at DESC",
            ANALYSIS_COLUMNS
        );
        let rows = sqlx::query_as::<_, AnalysisRow>(&query)
            .bind(farmer_id)
            .fetch_all(&self.db)
            .await?;
        into_analyses(rows)
    }

    pub async fn get(&self, farmer_id: Uuid, id: Uuid) -> AppResult<SoilAnalysis> {
        let query = format!(
            "SELECT {} FROM soil_analyses WHERE id = $1 AND farmer_id = $2",
            ANALYSIS_COLUMNS
        );
        let row = sqlx::query_as::<_, AnalysisRow>(&query)
            .bind(id)
            .bind(farmer_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Report"))?;
        SoilAnalysis::try_from(row)
    }

    /// Fetch a report and flag it as viewed
    pub async fn view(&self, farmer_id: Uuid, id: Uuid) -> AppResult<SoilAnalysis> {
        self.update_returning(
            farmer_id,
            id,
            "report_viewed = TRUE",
            None,
        )
        .await
    }

    pub async fn update_notes(
        &self,
        farmer_id: Uuid,
        id: Uuid,
        notes: Option<String>,
    ) -> AppResult<SoilAnalysis> {
        if let Some(notes) = &notes {
            validate_notes(notes).map_err(|m| AppError::validation("notes", m))?;
        }
        self.update_returning(farmer_id, id, "notes = $3, updated_at = NOW()", Some(notes))
            .await
    }

    pub async fn archive(&self, farmer_id: Uuid, id: Uuid) -> AppResult<SoilAnalysis> {
        self.update_returning(farmer_id, id, "is_archived = TRUE, updated_at = NOW()", None)
            .await
    }

    /// Count a completed download. Only called once the PDF has been rendered.
    pub async fn record_download(&self, farmer_id: Uuid, id: Uuid) -> AppResult<SoilAnalysis> {
        self.update_returning(
            farmer_id,
            id,
            "report_downloaded = TRUE, download_count = download_count + 1",
            None,
        )
        .await
    }

    async fn update_returning(
        &self,
        farmer_id: Uuid,
        id: Uuid,
        assignments: &str,
        text: Option<Option<String>>,
    ) -> AppResult<SoilAnalysis> {
        let query = format!(
            "UPDATE soil_analyses SET {} WHERE id = $1 AND farmer_id = $2 RETURNING {}",
            assignments, ANALYSIS_COLUMNS
        );
        let mut q = sqlx::query_as::<_, AnalysisRow>(&query).bind(id).bind(farmer_id);
        if let Some(value) = text {
            q = q.bind(value);
        }
        let row = q
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Report"))?;
        SoilAnalysis::try_from(row)
    }

    pub async fn delete(&self, farmer_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM soil_analyses WHERE id = $1 AND farmer_id = $2")
            .bind(id)
            .bind(farmer_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Report"));
        }
        tracing::info!("Farmer {} deleted analysis {}", farmer_id, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlternativeCrop, PrimaryCrop, SoilHealth, SoilTexture};
    use chrono::TimeZone;

    fn input() -> SaveAnalysisInput {
        SaveAnalysisInput {
            boundary: BoundaryInput {
                coordinates: vec![
                    [73.85, 18.52],
                    [73.86, 18.52],
                    [73.86, 18.53],
                    [73.85, 18.53],
                ],
                area: None,
                perimeter: None,
                center_point: None,
            },
            soil_properties: SoilProperties {
                ph: 6.5,
                nitrogen: 0.2,
                phosphorus: 25.0,
                potassium: 100.0,
                organic_carbon: 25.0,
                clay: 30.0,
                sand: Some(40.0),
                bulk_density: None,
                cec: None,
                soil_type: SoilTexture::Loam,
            },
            climate_data: ClimateData {
                rainfall: 900.0,
                temperature: 27.0,
            },
            soil_color: None,
            crop_recommendation: None,
            notes: None,
            data_source: None,
            analysis_date: Some(Utc.with_ymd_and_hms(2024, 8, 10, 9, 0, 0).unwrap()),
            season: None,
        }
    }

    #[test]
    fn test_build_analysis_scores_server_side() {
        let analysis = build_analysis(Uuid::new_v4(), input(), Utc::now()).unwrap();
        assert_eq!(analysis.soil_health, SoilHealth::Excellent);
        assert!((analysis.fertility_rating - 5.0).abs() < 1e-9);
        assert_eq!(analysis.season, Season::Kharif);
        assert_eq!(analysis.data_source, DataSource::SoilGrids);
        assert_eq!(analysis.download_count, 0);
        assert!(analysis.boundary.area > 0.0);
    }

    #[test]
    fn test_build_analysis_keeps_client_measurements() {
        let mut inp = input();
        inp.boundary.area = Some(12.5);
        inp.boundary.perimeter = Some(-1.0);
        let analysis = build_analysis(Uuid::new_v4(), inp, Utc::now()).unwrap();
        assert_eq!(analysis.boundary.area, 12.5);
        assert!(analysis.boundary.perimeter > 0.0);
    }

    #[test]
    fn test_build_analysis_rejects_bad_ph() {
        let mut inp = input();
        inp.soil_properties.ph = 15.0;
        let err = build_analysis(Uuid::new_v4(), inp, Utc::now()).unwrap_err();
        match err {
            AppError::Validation { field, .. } => assert_eq!(field, "soilProperties.pH"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_build_analysis_rejects_degenerate_boundary() {
        let mut inp = input();
        inp.boundary.coordinates.truncate(2);
        assert!(matches!(
            build_analysis(Uuid::new_v4(), inp, Utc::now()),
            Err(AppError::Validation { .. })
        ));
    }

    #[test]
    fn test_build_analysis_normalizes_client_recommendation() {
        let mut inp = input();
        inp.crop_recommendation = Some(CropRecommendation {
            primary_crop: PrimaryCrop {
                name: " Rice ".into(),
                match_score: 140.0,
                fertilizer: "Urea".into(),
            },
            alternative_crops: vec![
                AlternativeCrop {
                    name: "Maize".into(),
                    match_score: 60.0,
                },
                AlternativeCrop {
                    name: "Wheat".into(),
                    match_score: 80.0,
                },
            ],
        });
        let analysis = build_analysis(Uuid::new_v4(), inp, Utc::now()).unwrap();
        let rec = analysis.crop_recommendation;
        assert_eq!(rec.primary_crop.name, "Rice");
        assert_eq!(rec.primary_crop.match_score, 100.0);
        assert_eq!(rec.alternative_crops[0].name, "Wheat");
    }

    #[test]
    fn test_explicit_season_wins() {
        let mut inp = input();
        inp.season = Some(Season::YearRound);
        let analysis = build_analysis(Uuid::new_v4(), inp, Utc::now()).unwrap();
        assert_eq!(analysis.season, Season::YearRound);
    }

    #[test]
    fn test_preview_matches_build() {
        let inp = input();
        let result = preview(PreviewInput {
            soil_properties: inp.soil_properties.clone(),
            climate_data: inp.climate_data.clone(),
        })
        .unwrap();
        let analysis = build_analysis(Uuid::new_v4(), inp, Utc::now()).unwrap();
        assert_eq!(result.score.soil_health, analysis.soil_health);
        assert_eq!(result.crop_recommendation, analysis.crop_recommendation);
    }
}
