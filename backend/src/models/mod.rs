//! Database models for the SOILY platform
//!
//! Re-exports the domain models from the shared crate and adds the row types
//! sqlx reads from PostgreSQL. Nested structures live in JSONB columns and
//! enums are stored as their display text.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

pub use shared::models::*;
use shared::Language;

use crate::error::{AppError, AppResult};

/// Column list shared by every farmer query
pub const FARMER_COLUMNS: &str = "id, full_name, email, phone, password_hash, location, farm_size, \
     preferred_language, is_active, is_verified, profile_image, address, crops, soil_type, \
     irrigation_type, farming_experience, notifications, subscription, last_login, notes, \
     created_at, updated_at";

/// Column list shared by every soil analysis query
pub const ANALYSIS_COLUMNS: &str = "id, farmer_id, boundary, soil_properties, climate_data, \
     soil_color, crop_recommendation, soil_health, fertility_rating, analysis_date, season, \
     data_source, notes, is_archived, report_viewed, report_downloaded, download_count, \
     created_at, updated_at";

/// Decode an enum stored as its serde text form
fn parse_text<T: DeserializeOwned>(column: &str, value: &str) -> AppResult<T> {
    serde_json::from_value(serde_json::Value::String(value.to_string())).map_err(|_| {
        AppError::Internal(format!("Unexpected value '{}' in column {}", value, column))
    })
}

/// Encode an enum as the text stored in its column
pub fn enum_text<T: serde::Serialize>(value: &T) -> AppResult<String> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => Ok(s),
        _ => Err(AppError::Internal("Enum did not serialize to text".to_string())),
    }
}

#[derive(Debug, FromRow)]
pub struct FarmerRow {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub location: String,
    pub farm_size: String,
    pub preferred_language: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub profile_image: Option<String>,
    pub address: Json<Address>,
    pub crops: Json<Vec<FarmerCrop>>,
    pub soil_type: Option<String>,
    pub irrigation_type: Option<String>,
    pub farming_experience: Option<i32>,
    pub notifications: Json<NotificationPreferences>,
    pub subscription: Json<Subscription>,
    pub last_login: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<FarmerRow> for Farmer {
    type Error = AppError;

    fn try_from(row: FarmerRow) -> AppResult<Self> {
        let farm_size = FarmSize::parse(&row.farm_size).ok_or_else(|| {
            AppError::Internal(format!("Unexpected farm size '{}'", row.farm_size))
        })?;
        let preferred_language = Language::from_code(&row.preferred_language).ok_or_else(|| {
            AppError::Internal(format!("Unexpected language '{}'", row.preferred_language))
        })?;

        Ok(Farmer {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            location: row.location,
            farm_size,
            preferred_language,
            is_active: row.is_active,
            is_verified: row.is_verified,
            profile_image: row.profile_image,
            address: row.address.0,
            crops: row.crops.0,
            soil_type: row
                .soil_type
                .as_deref()
                .map(|s| parse_text("soil_type", s))
                .transpose()?,
            irrigation_type: row
                .irrigation_type
                .as_deref()
                .map(|s| parse_text("irrigation_type", s))
                .transpose()?,
            farming_experience: row.farming_experience,
            notifications: row.notifications.0,
            subscription: row.subscription.0,
            last_login: row.last_login,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct AnalysisRow {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub boundary: Json<BoundaryGeometry>,
    pub soil_properties: Json<SoilProperties>,
    pub climate_data: Json<ClimateData>,
    pub soil_color: Option<Json<SoilColor>>,
    pub crop_recommendation: Json<CropRecommendation>,
    pub soil_health: String,
    pub fertility_rating: f64,
    pub analysis_date: DateTime<Utc>,
    pub season: String,
    pub data_source: String,
    pub notes: Option<String>,
    pub is_archived: bool,
    pub report_viewed: bool,
    pub report_downloaded: bool,
    pub download_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<AnalysisRow> for SoilAnalysis {
    type Error = AppError;

    fn try_from(row: AnalysisRow) -> AppResult<Self> {
        Ok(SoilAnalysis {
            id: row.id,
            farmer_id: row.farmer_id,
            boundary: row.boundary.0,
            sample: SoilSample {
                soil_properties: row.soil_properties.0,
                climate_data: row.climate_data.0,
            },
            soil_color: row.soil_color.map(|c| c.0),
            crop_recommendation: row.crop_recommendation.0,
            soil_health: SoilHealth::parse(&row.soil_health).ok_or_else(|| {
                AppError::Internal(format!("Unexpected soil health '{}'", row.soil_health))
            })?,
            fertility_rating: row.fertility_rating,
            analysis_date: row.analysis_date,
            season: Season::parse(&row.season)
                .ok_or_else(|| AppError::Internal(format!("Unexpected season '{}'", row.season)))?,
            data_source: DataSource::parse(&row.data_source).ok_or_else(|| {
                AppError::Internal(format!("Unexpected data source '{}'", row.data_source))
            })?,
            notes: row.notes,
            is_archived: row.is_archived,
            report_viewed: row.report_viewed,
            report_downloaded: row.report_downloaded,
            download_count: row.download_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Convert a batch of rows, failing on the first unreadable one
pub fn into_analyses(rows: Vec<AnalysisRow>) -> AppResult<Vec<SoilAnalysis>> {
    rows.into_iter().map(SoilAnalysis::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_text_round_trip() {
        let text = enum_text(&FarmerSoilType::Laterite).unwrap();
        assert_eq!(text, "Laterite");
        let back: FarmerSoilType = parse_text("soil_type", &text).unwrap();
        assert_eq!(back, FarmerSoilType::Laterite);
    }

    #[test]
    fn test_unknown_enum_text_is_internal_error() {
        let err = parse_text::<IrrigationType>("irrigation_type", "Canal").unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
