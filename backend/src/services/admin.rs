//! Admin console service: platform-wide listings, statistics, moderation, and exports

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    AnalysisRow, FarmSize, Farmer, FarmerRow, SoilAnalysis, FARMER_COLUMNS,
};
use crate::services::auth::unique_violation;
use shared::aggregation::fixed;
use shared::validation::{
    normalize_email, normalize_phone, validate_email, validate_full_name, validate_indian_phone,
    validate_location, validate_notes,
};

pub const TOP_CROPS_LIMIT: i64 = 8;
pub const PH_REGIONS_LIMIT: i64 = 10;
pub const REGISTRATION_TREND_MONTHS: i32 = 6;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerWithCount {
    #[serde(flatten)]
    pub farmer: Farmer,
    pub analysis_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisWithFarmer {
    #[serde(flatten)]
    pub analysis: SoilAnalysis,
    pub farmer_name: String,
    pub farmer_email: String,
}

#[derive(Debug, FromRow)]
struct AnalysisWithFarmerRow {
    #[sqlx(flatten)]
    analysis: AnalysisRow,
    farmer_name: String,
    farmer_email: String,
}

impl TryFrom<AnalysisWithFarmerRow> for AnalysisWithFarmer {
    type Error = AppError;

    fn try_from(row: AnalysisWithFarmerRow) -> AppResult<Self> {
        Ok(AnalysisWithFarmer {
            analysis: SoilAnalysis::try_from(row.analysis)?,
            farmer_name: row.farmer_name,
            farmer_email: row.farmer_email,
        })
    }
}

/// One bucket of a grouped count
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Distribution {
    #[serde(rename = "_id")]
    pub id: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RegistrationPoint {
    /// "Jan 2024"
    pub month: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TopCrop {
    pub crop: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegionPh {
    pub location: String,
    /// 2 dp
    pub avg_ph: Decimal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NpkAverages {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub organic_carbon: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SeasonCount {
    pub season: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatistics {
    pub total_farmers: i64,
    pub active_farmers: i64,
    pub total_analyses: i64,
    /// Acres, 2 dp
    pub total_area: Decimal,
    pub archived_reports: i64,
    pub total_downloads: i64,
    pub total_views: i64,
    pub farm_size_distribution: Vec<Distribution>,
    pub soil_type_distribution: Vec<Distribution>,
    pub registration_trend: Vec<RegistrationPoint>,
    pub top_crops: Vec<TopCrop>,
    pub ph_by_region: Vec<RegionPh>,
    pub npk_averages: NpkAverages,
    pub seasonal_data: Vec<SeasonCount>,
    pub soil_health_distribution: Vec<Distribution>,
}

#[derive(Debug, FromRow)]
struct TotalsRow {
    total_farmers: i64,
    active_farmers: i64,
    total_analyses: i64,
    archived_reports: i64,
    total_area: f64,
    total_downloads: i64,
    total_views: i64,
    nitrogen: f64,
    phosphorus: f64,
    potassium: f64,
    organic_carbon: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateFarmerInput {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub farm_size: Option<FarmSize>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkFarmerInput {
    pub farmer_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAnalysisInput {
    pub analysis_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemReport {
    pub generated_at: DateTime<Utc>,
    pub total_farmers: usize,
    pub total_analyses: usize,
    pub farmers: Vec<Farmer>,
    pub analyses: Vec<AnalysisWithFarmer>,
}

/// Flat per-analysis line of the CSV system report
#[derive(Debug, Serialize)]
pub struct AnalysisCsvRow {
    pub analysis_id: Uuid,
    pub farmer_name: String,
    pub farmer_email: String,
    pub analysis_date: String,
    pub season: &'static str,
    pub area_acres: f64,
    pub soil_type: &'static str,
    pub ph: f64,
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub organic_carbon: f64,
    pub soil_health: &'static str,
    pub fertility_rating: f64,
    pub primary_crop: String,
    pub match_score: f64,
    pub data_source: &'static str,
    pub archived: bool,
    pub download_count: i32,
}

impl From<&AnalysisWithFarmer> for AnalysisCsvRow {
    fn from(item: &AnalysisWithFarmer) -> Self {
        let a = &item.analysis;
        let p = &a.sample.soil_properties;
        AnalysisCsvRow {
            analysis_id: a.id,
            farmer_name: item.farmer_name.clone(),
            farmer_email: item.farmer_email.clone(),
            analysis_date: a.analysis_date.format("%Y-%m-%d").to_string(),
            season: a.season.as_str(),
            area_acres: a.boundary.area,
            soil_type: p.soil_type.as_str(),
            ph: p.ph,
            nitrogen: p.nitrogen,
            phosphorus: p.phosphorus,
            potassium: p.potassium,
            organic_carbon: p.organic_carbon,
            soil_health: a.soil_health.as_str(),
            fertility_rating: a.fertility_rating,
            primary_crop: a.crop_recommendation.primary_crop.name.clone(),
            match_score: a.crop_recommendation.primary_crop.match_score,
            data_source: a.data_source.as_str(),
            archived: a.is_archived,
            download_count: a.download_count,
        }
    }
}

/// "Jan 2024" label for a registration bucket
pub fn month_label(month: DateTime<Utc>) -> String {
    month.format("%b %Y").to_string()
}

/// Serialize records as CSV with a header row
pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in data {
        wtr.serialize(record)
            .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
}

const ANALYSIS_WITH_FARMER: &str = r#"
    SELECT a.*,
           COALESCE(f.full_name, 'Unknown') AS farmer_name,
           COALESCE(f.email, 'N/A') AS farmer_email
    FROM soil_analyses a
    LEFT JOIN farmers f ON f.id = a.farmer_id
"#;

/// Admin service
#[derive(Clone)]
pub struct AdminService {
    db: PgPool,
}

impl AdminService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ========================================================================
    // Farmers
    // ========================================================================

    pub async fn list_farmers(&self) -> AppResult<Vec<FarmerWithCount>> {
        let query = format!(
            "SELECT {}, (SELECT COUNT(*) FROM soil_analyses a WHERE a.farmer_id = farmers.id) AS analysis_count \
             FROM farmers ORDER BY created_at DESC",
            FARMER_COLUMNS
        );
        let rows = sqlx::query_as::<_, FarmerCountRow>(&query)
            .fetch_all(&self.db)
            .await?;
        rows.into_iter().map(FarmerWithCount::try_from).collect()
    }

    pub async fn get_farmer(&self, id: Uuid) -> AppResult<FarmerWithCount> {
        let query = format!(
            "SELECT {}, (SELECT COUNT(*) FROM soil_analyses a WHERE a.farmer_id = farmers.id) AS analysis_count \
             FROM farmers WHERE id = $1",
            FARMER_COLUMNS
        );
        let row = sqlx::query_as::<_, FarmerCountRow>(&query)
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Farmer"))?;
        FarmerWithCount::try_from(row)
    }

    pub async fn update_farmer(&self, id: Uuid, input: AdminUpdateFarmerInput) -> AppResult<Farmer> {
        let full_name = input.full_name.map(|n| n.trim().to_string());
        if let Some(name) = &full_name {
            validate_full_name(name).map_err(|m| AppError::validation("fullName", m))?;
        }
        let email = input.email.as_deref().map(normalize_email);
        if let Some(email) = &email {
            validate_email(email).map_err(|m| AppError::validation("email", m))?;
        }
        let phone = input.phone.as_deref().map(normalize_phone);
        if let Some(phone) = &phone {
            validate_indian_phone(phone).map_err(|m| AppError::validation("phone", m))?;
        }
        let location = input.location.map(|l| l.trim().to_string());
        if let Some(location) = &location {
            validate_location(location).map_err(|m| AppError::validation("location", m))?;
        }
        if let Some(notes) = &input.notes {
            validate_notes(notes).map_err(|m| AppError::validation("notes", m))?;
        }

        let query = format!(
            r#"
            UPDATE farmers SET
                full_name = COALESCE($2, full_name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                location = COALESCE($5, location),
                farm_size = COALESCE($6, farm_size),
                is_active = COALESCE($7, is_active),
                notes = COALESCE($8, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            FARMER_COLUMNS
        );
        let row = sqlx::query_as::<_, FarmerRow>(&query)
            .bind(id)
            .bind(full_name)
            .bind(email)
            .bind(phone)
            .bind(location)
            .bind(input.farm_size.map(|s| s.as_str()))
            .bind(input.is_active)
            .bind(input.notes)
            .fetch_optional(&self.db)
            .await
            .map_err(unique_violation)?
            .ok_or_else(|| AppError::not_found("Farmer"))?;

        if input.is_active == Some(false) {
            self.revoke_sessions(id).await?;
        }
        tracing::info!("Admin updated farmer {}", id);
        Farmer::try_from(row)
    }

    /// Flip `is_active` and return the new value
    pub async fn toggle_status(&self, id: Uuid) -> AppResult<bool> {
        let is_active = sqlx::query_scalar::<_, bool>(
            "UPDATE farmers SET is_active = NOT is_active, updated_at = NOW() WHERE id = $1 RETURNING is_active",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Farmer"))?;

        if !is_active {
            self.revoke_sessions(id).await?;
        }
        tracing::info!("Admin set farmer {} active={}", id, is_active);
        Ok(is_active)
    }

    async fn revoke_sessions(&self, farmer_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE farmer_id = $1 AND revoked_at IS NULL",
        )
        .bind(farmer_id)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    /// Delete a farmer; owned analyses cascade
    pub async fn delete_farmer(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM farmers WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Farmer"));
        }
        tracing::info!("Admin deleted farmer {}", id);
        Ok(())
    }

    /// Returns how many farmers were actually removed
    pub async fn bulk_delete_farmers(&self, input: BulkFarmerInput) -> AppResult<u64> {
        let ids = input
            .farmer_ids
            .ok_or_else(|| AppError::BadRequest("Invalid farmer IDs".to_string()))?;
        let result = sqlx::query("DELETE FROM farmers WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&self.db)
            .await?;
        tracing::info!("Admin bulk-deleted {} farmers", result.rows_affected());
        Ok(result.rows_affected())
    }

    // ========================================================================
    // Analyses
    // ========================================================================

    pub async fn list_analyses(&self) -> AppResult<Vec<AnalysisWithFarmer>> {
        let query = format!(
            "{} ORDER BY a.analysis_date DESC, a.created_at DESC",
            ANALYSIS_WITH_FARMER
        );
        let rows = sqlx::query_as::<_, AnalysisWithFarmerRow>(&query)
            .fetch_all(&self.db)
            .await?;
        rows.into_iter().map(AnalysisWithFarmer::try_from).collect()
    }

    pub async fn get_analysis(&self, id: Uuid) -> AppResult<AnalysisWithFarmer> {
        let query = format!("{} WHERE a.id = $1", ANALYSIS_WITH_FARMER);
        let row = sqlx::query_as::<_, AnalysisWithFarmerRow>(&query)
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Analysis"))?;
        AnalysisWithFarmer::try_from(row)
    }

    pub async fn delete_analysis(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM soil_analyses WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Analysis"));
        }
        tracing::info!("Admin deleted analysis {}", id);
        Ok(())
    }

    pub async fn bulk_delete_analyses(&self, input: BulkAnalysisInput) -> AppResult<u64> {
        let ids = input
            .analysis_ids
            .ok_or_else(|| AppError::BadRequest("Invalid analysis IDs".to_string()))?;
        let result = sqlx::query("DELETE FROM soil_analyses WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&self.db)
            .await?;
        tracing::info!("Admin bulk-deleted {} analyses", result.rows_affected());
        Ok(result.rows_affected())
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    pub async fn statistics(&self) -> AppResult<AdminStatistics> {
        let totals = sqlx::query_as::<_, TotalsRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM farmers) AS total_farmers,
                (SELECT COUNT(*) FROM farmers WHERE is_active) AS active_farmers,
                COUNT(*) AS total_analyses,
                COUNT(*) FILTER (WHERE is_archived) AS archived_reports,
                COALESCE(SUM((boundary ->> 'area')::DOUBLE PRECISION), 0) AS total_area,
                COALESCE(SUM(download_count), 0)::BIGINT AS total_downloads,
                COUNT(*) FILTER (WHERE report_viewed) AS total_views,
                COALESCE(AVG((soil_properties ->> 'nitrogen')::DOUBLE PRECISION), 0) AS nitrogen,
                COALESCE(AVG((soil_properties ->> 'phosphorus')::DOUBLE PRECISION), 0) AS phosphorus,
                COALESCE(AVG((soil_properties ->> 'potassium')::DOUBLE PRECISION), 0) AS potassium,
                COALESCE(AVG((soil_properties ->> 'organicCarbon')::DOUBLE PRECISION), 0) AS organic_carbon
            FROM soil_analyses
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let farm_size_distribution = self
            .distribution("SELECT farm_size, COUNT(*) FROM farmers GROUP BY 1 ORDER BY 2 DESC, 1")
            .await?;
        let soil_type_distribution = self
            .distribution(
                "SELECT soil_properties ->> 'soilType', COUNT(*) FROM soil_analyses GROUP BY 1 ORDER BY 2 DESC, 1",
            )
            .await?;
        let soil_health_distribution = self
            .distribution("SELECT soil_health, COUNT(*) FROM soil_analyses GROUP BY 1 ORDER BY 2 DESC, 1")
            .await?;
        let seasonal_data = self
            .distribution("SELECT season, COUNT(*) FROM soil_analyses GROUP BY 1 ORDER BY 2 DESC, 1")
            .await?
            .into_iter()
            .map(|d| SeasonCount {
                season: d.id,
                count: d.count,
            })
            .collect();

        let registration_trend = sqlx::query_as::<_, (DateTime<Utc>, i64)>(
            r#"
            SELECT date_trunc('month', created_at) AS month, COUNT(*)
            FROM farmers
            WHERE created_at >= NOW() - make_interval(months => $1)
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(REGISTRATION_TREND_MONTHS)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(|(month, count)| RegistrationPoint {
            month: month_label(month),
            count,
        })
        .collect();

        let top_crops = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT crop_recommendation -> 'primaryCrop' ->> 'name', COUNT(*)
            FROM soil_analyses
            GROUP BY 1
            ORDER BY 2 DESC, 1
            LIMIT $1
            "#,
        )
        .bind(TOP_CROPS_LIMIT)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(|(crop, count)| TopCrop { crop, count })
        .collect();

        let ph_by_region = sqlx::query_as::<_, (String, f64)>(
            r#"
            SELECT f.location, AVG((a.soil_properties ->> 'pH')::DOUBLE PRECISION)
            FROM soil_analyses a
            JOIN farmers f ON f.id = a.farmer_id
            GROUP BY f.location
            ORDER BY COUNT(*) DESC, f.location
            LIMIT $1
            "#,
        )
        .bind(PH_REGIONS_LIMIT)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(|(location, avg)| RegionPh {
            location,
            avg_ph: fixed(avg, 2),
        })
        .collect();

        Ok(AdminStatistics {
            total_farmers: totals.total_farmers,
            active_farmers: totals.active_farmers,
            total_analyses: totals.total_analyses,
            total_area: fixed(totals.total_area, 2),
            archived_reports: totals.archived_reports,
            total_downloads: totals.total_downloads,
            total_views: totals.total_views,
            farm_size_distribution,
            soil_type_distribution,
            registration_trend,
            top_crops,
            ph_by_region,
            npk_averages: NpkAverages {
                nitrogen: totals.nitrogen,
                phosphorus: totals.phosphorus,
                potassium: totals.potassium,
                organic_carbon: totals.organic_carbon,
            },
            seasonal_data,
            soil_health_distribution,
        })
    }

    async fn distribution(&self, sql: &str) -> AppResult<Vec<Distribution>> {
        let rows = sqlx::query_as::<_, (String, i64)>(sql)
            .fetch_all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(id, count)| Distribution { id, count })
            .collect())
    }

    // ========================================================================
    // System report
    // ========================================================================

    pub async fn system_report(&self) -> AppResult<SystemReport> {
        let query = format!("SELECT {} FROM farmers ORDER BY created_at DESC", FARMER_COLUMNS);
        let farmers = sqlx::query_as::<_, FarmerRow>(&query)
            .fetch_all(&self.db)
            .await?
            .into_iter()
            .map(Farmer::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        let analyses = self.list_analyses().await?;

        Ok(SystemReport {
            generated_at: Utc::now(),
            total_farmers: farmers.len(),
            total_analyses: analyses.len(),
            farmers,
            analyses,
        })
    }
}

#[derive(Debug, FromRow)]
struct FarmerCountRow {
    #[sqlx(flatten)]
    farmer: FarmerRow,
    analysis_count: i64,
}

impl TryFrom<FarmerCountRow> for FarmerWithCount {
    type Error = AppError;

    fn try_from(row: FarmerCountRow) -> AppResult<Self> {
        Ok(FarmerWithCount {
            farmer: Farmer::try_from(row.farmer)?,
            analysis_count: row.analysis_count,
        })
    }
}
