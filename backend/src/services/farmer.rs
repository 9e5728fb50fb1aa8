//! Farmer account service: profile, farm details, preferences, and account removal

use bcrypt::{hash, verify, DEFAULT_COST};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    FarmSize, Farmer, FarmerRow, FarmerSoilType, IrrigationType, LoginRecord,
    NotificationPreferences, FARMER_COLUMNS,
};
use crate::services::auth::{optional_enum_text, unique_violation};
use shared::validation::{
    normalize_phone, validate_full_name, validate_indian_phone, validate_location,
    validate_notes, validate_password,
};
use shared::Language;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub farm_size: Option<FarmSize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmDetailsInput {
    pub location: Option<String>,
    pub farm_size: Option<FarmSize>,
    pub notes: Option<String>,
    pub soil_type: Option<FarmerSoilType>,
    pub irrigation_type: Option<IrrigationType>,
    pub farming_experience: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct LanguageInput {
    pub language: Language,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

/// Farmer plus recent logins, as shown on the profile page
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerDetails {
    #[serde(flatten)]
    pub farmer: Farmer,
    pub farm_size_description: &'static str,
    pub language_name: &'static str,
    pub has_premium_access: bool,
    pub subscription_active: bool,
    pub login_history: Vec<LoginRecord>,
}

/// Farmer service
#[derive(Clone)]
pub struct FarmerService {
    db: PgPool,
}

impl FarmerService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get(&self, farmer_id: Uuid) -> AppResult<Farmer> {
        let query = format!("SELECT {} FROM farmers WHERE id = $1", FARMER_COLUMNS);
        let row = sqlx::query_as::<_, FarmerRow>(&query)
            .bind(farmer_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Farmer"))?;
        Farmer::try_from(row)
    }

    pub async fn profile(&self, farmer_id: Uuid) -> AppResult<FarmerDetails> {
        let farmer = self.get(farmer_id).await?;
        let login_history = self.login_history(farmer_id).await?;
        let today = chrono::Utc::now().date_naive();

        Ok(FarmerDetails {
            farm_size_description: farmer.farm_size_description(),
            language_name: farmer.preferred_language.display_name(),
            has_premium_access: farmer.has_premium_access(),
            subscription_active: farmer.is_subscription_active(today),
            login_history,
            farmer,
        })
    }

    pub async fn login_history(&self, farmer_id: Uuid) -> AppResult<Vec<LoginRecord>> {
        let rows = sqlx::query_as::<_, (chrono::DateTime<chrono::Utc>, Option<String>, Option<String>)>(
            r#"
            SELECT logged_in_at, ip_address, user_agent
            FROM farmer_logins
            WHERE farmer_id = $1
            ORDER BY logged_in_at DESC, id DESC
            "#,
        )
        .bind(farmer_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(timestamp, ip_address, user_agent)| LoginRecord {
                timestamp,
                ip_address,
                user_agent,
            })
            .collect())
    }

    pub async fn update_profile(
        &self,
        farmer_id: Uuid,
        input: UpdateProfileInput,
    ) -> AppResult<Farmer> {
        let full_name = input.full_name.map(|n| n.trim().to_string());
        if let Some(name) = &full_name {
            validate_full_name(name).map_err(|m| AppError::validation("fullName", m))?;
        }
        let phone = input.phone.as_deref().map(normalize_phone);
        if let Some(phone) = &phone {
            validate_indian_phone(phone).map_err(|m| AppError::validation("phone", m))?;
        }
        let location = input.location.map(|l| l.trim().to_string());
        if let Some(location) = &location {
            validate_location(location).map_err(|m| AppError::validation("location", m))?;
        }

        let query = format!(
            r#"
            UPDATE farmers SET
                full_name = COALESCE($2, full_name),
                phone = COALESCE($3, phone),
                location = COALESCE($4, location),
                farm_size = COALESCE($5, farm_size),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            FARMER_COLUMNS
        );
        let row = sqlx::query_as::<_, FarmerRow>(&query)
            .bind(farmer_id)
            .bind(full_name)
            .bind(phone)
            .bind(location)
            .bind(input.farm_size.map(|s| s.as_str()))
            .fetch_optional(&self.db)
            .await
            .map_err(unique_violation)?
            .ok_or_else(|| AppError::not_found("Farmer"))?;

        tracing::info!("Farmer {} updated profile", farmer_id);
        Farmer::try_from(row)
    }

    pub async fn update_farm_details(
        &self,
        farmer_id: Uuid,
        input: FarmDetailsInput,
    ) -> AppResult<Farmer> {
        let location = input.location.map(|l| l.trim().to_string());
        if let Some(location) = &location {
            validate_location(location).map_err(|m| AppError::validation("location", m))?;
        }
        if let Some(notes) = &input.notes {
            validate_notes(notes).map_err(|m| AppError::validation("notes", m))?;
        }
        if input.farming_experience.is_some_and(|y| y < 0) {
            return Err(AppError::validation(
                "farmingExperience",
                "Farming experience cannot be negative",
            ));
        }

        let query = format!(
            r#"
            UPDATE farmers SET
                location = COALESCE($2, location),
                farm_size = COALESCE($3, farm_size),
                notes = COALESCE($4, notes),
                soil_type = COALESCE($5, soil_type),
                irrigation_type = COALESCE($6, irrigation_type),
                farming_experience = COALESCE($7, farming_experience),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            FARMER_COLUMNS
        );
        let row = sqlx::query_as::<_, FarmerRow>(&query)
            .bind(farmer_id)
            .bind(location)
            .bind(input.farm_size.map(|s| s.as_str()))
            .bind(input.notes)
            .bind(optional_enum_text(input.soil_type.as_ref())?)
            .bind(optional_enum_text(input.irrigation_type.as_ref())?)
            .bind(input.farming_experience)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Farmer"))?;

        Farmer::try_from(row)
    }

    pub async fn update_language(&self, farmer_id: Uuid, language: Language) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE farmers SET preferred_language = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(farmer_id)
        .bind(language.code())
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Farmer"));
        }
        Ok(())
    }

    pub async fn update_notifications(
        &self,
        farmer_id: Uuid,
        preferences: NotificationPreferences,
    ) -> AppResult<NotificationPreferences> {
        let result = sqlx::query(
            "UPDATE farmers SET notifications = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(farmer_id)
        .bind(sqlx::types::Json(preferences))
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Farmer"));
        }
        Ok(preferences)
    }

    /// Replace the password after checking the current one.
    /// Outstanding refresh tokens are revoked.
    pub async fn change_password(&self, farmer_id: Uuid, input: ChangePasswordInput) -> AppResult<()> {
        let current_hash =
            sqlx::query_scalar::<_, String>("SELECT password_hash FROM farmers WHERE id = $1")
                .bind(farmer_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::not_found("Farmer"))?;

        let valid = verify(&input.current_password, &current_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::Unauthorized(
                "Current password is incorrect".to_string(),
            ));
        }

        validate_password(&input.new_password)
            .map_err(|m| AppError::validation("newPassword", m))?;
        let new_hash = hash(&input.new_password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let mut tx = self.db.begin().await?;
        sqlx::query("UPDATE farmers SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(farmer_id)
            .bind(&new_hash)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE farmer_id = $1 AND revoked_at IS NULL",
        )
        .bind(farmer_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!("Farmer {} changed password", farmer_id);
        Ok(())
    }

    /// Delete the farmer; analyses, logins and tokens go with it
    pub async fn delete_account(&self, farmer_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM farmers WHERE id = $1")
            .bind(farmer_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Farmer"));
        }
        tracing::info!("Farmer {} deleted their account", farmer_id);
        Ok(())
    }
}
