//! Authentication service for farmer registration, login, and token management

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::{AdminConfig, Config};
use crate::error::{AppError, AppResult};
use crate::models::{enum_text, FarmSize, Farmer, FarmerProfile, FarmerRow, FARMER_COLUMNS};
use shared::validation::{
    normalize_email, normalize_phone, validate_email, validate_full_name, validate_indian_phone,
    validate_location, validate_password,
};
use shared::Language;

/// Login records kept per farmer
pub const LOGIN_HISTORY_LIMIT: i64 = 10;

/// Who a token was issued to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Farmer,
    Admin,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Farmer ID, or the admin username
    pub sub: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

/// Decode and validate an access token
pub fn decode_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::InvalidToken,
    })
}

/// Hash a refresh token for storage
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(length(min = 1, message = "All fields are required"))]
    pub full_name: String,
    #[validate(length(min = 1, message = "All fields are required"))]
    pub email: String,
    #[validate(length(min = 1, message = "All fields are required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "All fields are required"))]
    pub location: String,
    pub farm_size: FarmSize,
    #[validate(length(min = 1, message = "All fields are required"))]
    pub password: String,
    #[serde(default)]
    pub language: Option<Language>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub farmer_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub remember: bool,
}

/// Request metadata recorded with each login
#[derive(Debug, Clone, Default)]
pub struct LoginContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub tokens: AuthTokens,
    pub farmer: FarmerProfile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshInput {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminLoginInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginResponse {
    pub success: bool,
    pub message: String,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
    remember_token_expiry: i64,
    admin_token_expiry: i64,
    admin: AdminConfig,
}

impl AuthService {
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
            remember_token_expiry: config.jwt.remember_token_expiry,
            admin_token_expiry: config.jwt.admin_token_expiry,
            admin: config.admin.clone(),
        }
    }

    /// Register a new farmer account
    pub async fn register(&self, input: RegisterInput) -> AppResult<RegisterResponse> {
        input.validate()?;

        let email = normalize_email(&input.email);
        let phone = normalize_phone(&input.phone);
        let full_name = input.full_name.trim().to_string();
        let location = input.location.trim().to_string();

        validate_full_name(&full_name).map_err(|m| AppError::validation("fullName", m))?;
        validate_email(&email).map_err(|m| AppError::validation("email", m))?;
        validate_indian_phone(&phone).map_err(|m| AppError::validation("phone", m))?;
        validate_location(&location).map_err(|m| AppError::validation("location", m))?;
        validate_password(&input.password).map_err(|m| AppError::validation("password", m))?;

        self.ensure_unique(&email, &phone).await?;

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let farmer_id = Uuid::new_v4();
        let language = input.language.unwrap_or_default();

        sqlx::query(
            r#"
            INSERT INTO farmers (id, full_name, email, phone, password_hash, location, farm_size, preferred_language)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(farmer_id)
        .bind(&full_name)
        .bind(&email)
        .bind(&phone)
        .bind(&password_hash)
        .bind(&location)
        .bind(input.farm_size.as_str())
        .bind(language.code())
        .execute(&self.db)
        .await
        .map_err(unique_violation)?;

        tracing::info!("Registered farmer {} ({})", farmer_id, email);

        Ok(RegisterResponse {
            success: true,
            message: "Registration successful! Please login.".to_string(),
            farmer_id,
        })
    }

    /// Email is checked before phone, matching the order clients show errors in
    async fn ensure_unique(&self, email: &str, phone: &str) -> AppResult<()> {
        let email_taken =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM farmers WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.db)
                .await?;
        if email_taken {
            return Err(duplicate_email());
        }

        let phone_taken =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM farmers WHERE phone = $1)")
                .bind(phone)
                .fetch_one(&self.db)
                .await?;
        if phone_taken {
            return Err(duplicate_phone());
        }
        Ok(())
    }

    /// Authenticate a farmer with email and password
    pub async fn login(&self, input: LoginInput, ctx: LoginContext) -> AppResult<LoginResponse> {
        if input.email.trim().is_empty() || input.password.is_empty() {
            return Err(AppError::BadRequest(
                "Email and password are required".to_string(),
            ));
        }

        let query = format!("SELECT {} FROM farmers WHERE email = $1", FARMER_COLUMNS);
        let row = sqlx::query_as::<_, FarmerRow>(&query)
            .bind(normalize_email(&input.email))
            .fetch_optional(&self.db)
            .await?
            .ok_or(AppError::InvalidCredentials { field: "email" })?;

        if !row.is_active {
            return Err(AppError::AccountDisabled);
        }

        let valid = verify(&input.password, &row.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::InvalidCredentials { field: "password" });
        }

        let farmer = Farmer::try_from(row)?;
        self.record_login(farmer.id, &ctx).await?;

        let lifetime = if input.remember {
            self.remember_token_expiry
        } else {
            self.refresh_token_expiry
        };
        let tokens = self.issue_farmer_tokens(farmer.id, lifetime).await?;

        tracing::info!("Farmer {} logged in", farmer.id);

        Ok(LoginResponse {
            success: true,
            message: "Login successful".to_string(),
            tokens,
            farmer: farmer.public_profile(),
        })
    }

    /// Stamp last login and append to the capped login history
    async fn record_login(&self, farmer_id: Uuid, ctx: &LoginContext) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query("UPDATE farmers SET last_login = NOW() WHERE id = $1")
            .bind(farmer_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO farmer_logins (farmer_id, ip_address, user_agent) VALUES ($1, $2, $3)",
        )
        .bind(farmer_id)
        .bind(&ctx.ip_address)
        .bind(&ctx.user_agent)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM farmer_logins
            WHERE farmer_id = $1
              AND id NOT IN (
                SELECT id FROM farmer_logins
                WHERE farmer_id = $1
                ORDER BY logged_in_at DESC, id DESC
                LIMIT $2
              )
            "#,
        )
        .bind(farmer_id)
        .bind(LOGIN_HISTORY_LIMIT)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Exchange a refresh token for a new pair, revoking the old one.
    /// The new refresh token keeps the lifetime of the one it replaces.
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let token_hash = hash_token(refresh_token);

        let (farmer_id, lifetime) = sqlx::query_as::<_, (Uuid, i64)>(
            r#"
            SELECT rt.farmer_id, EXTRACT(EPOCH FROM (rt.expires_at - rt.created_at))::BIGINT
            FROM refresh_tokens rt
            JOIN farmers f ON f.id = rt.farmer_id
            WHERE rt.token_hash = $1
              AND rt.expires_at > NOW()
              AND rt.revoked_at IS NULL
              AND f.is_active = TRUE
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired refresh token".to_string()))?;

        self.revoke(&token_hash).await?;
        self.issue_farmer_tokens(farmer_id, lifetime).await
    }

    /// Revoke a refresh token; unknown tokens are ignored
    pub async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        self.revoke(&hash_token(refresh_token)).await
    }

    async fn revoke(&self, token_hash: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE token_hash = $1 AND revoked_at IS NULL",
        )
        .bind(token_hash)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    /// Authenticate the single admin account from configuration
    pub async fn admin_login(&self, input: AdminLoginInput) -> AppResult<AdminLoginResponse> {
        if input.username.is_empty() || input.password.is_empty() {
            return Err(AppError::BadRequest(
                "Username and password are required".to_string(),
            ));
        }

        let hash = self.admin.password_hash.clone();
        let password = input.password;
        let password_ok = tokio::task::spawn_blocking(move || verify(password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if input.username != self.admin.username || !password_ok {
            tracing::warn!("Rejected admin login for '{}'", input.username);
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let access_token = self.sign(&input.username, Role::Admin, self.admin_token_expiry)?;
        tracing::info!("Admin '{}' logged in", input.username);

        Ok(AdminLoginResponse {
            success: true,
            message: "Login successful".to_string(),
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.admin_token_expiry,
        })
    }

    fn sign(&self, subject: &str, role: Role, expiry: i64) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            role,
            exp: (now + Duration::seconds(expiry)).timestamp(),
            iat: now.timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    async fn issue_farmer_tokens(&self, farmer_id: Uuid, refresh_lifetime: i64) -> AppResult<AuthTokens> {
        let access_token = self.sign(&farmer_id.to_string(), Role::Farmer, self.access_token_expiry)?;
        let refresh_token = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, farmer_id, token_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(farmer_id)
        .bind(hash_token(&refresh_token))
        .bind(Utc::now() + Duration::seconds(refresh_lifetime))
        .execute(&self.db)
        .await?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }
}

pub fn duplicate_email() -> AppError {
    AppError::DuplicateEntry {
        field: "email".to_string(),
        message: "Email already registered".to_string(),
    }
}

pub fn duplicate_phone() -> AppError {
    AppError::DuplicateEntry {
        field: "phone".to_string(),
        message: "Phone number already registered".to_string(),
    }
}

/// Map a unique-constraint race on insert/update to the matching 409
pub fn unique_violation(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some(c) if c.contains("phone") => duplicate_phone(),
                _ => duplicate_email(),
            };
        }
    }
    AppError::DatabaseError(err)
}

/// Stored text for an optional enum column
pub fn optional_enum_text<T: Serialize>(value: Option<&T>) -> AppResult<Option<String>> {
    value.map(enum_text).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_hash_is_sha256_hex() {
        let h = hash_token("abc");
        assert_eq!(
            h,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_ne!(hash_token("abd"), h);
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            role: Role::Farmer,
            exp: (now + Duration::seconds(60)).timestamp(),
            iat: now.timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"right"),
        )
        .unwrap();

        assert!(decode_token(&token, "right").is_ok());
        assert!(matches!(
            decode_token(&token, "wrong"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_reported_as_expired() {
        let now = Utc::now();
        let claims = Claims {
            sub: "admin".into(),
            role: Role::Admin,
            exp: (now - Duration::hours(2)).timestamp(),
            iat: (now - Duration::hours(3)).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"s")).unwrap();
        assert!(matches!(decode_token(&token, "s"), Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_role_claim_serialization() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }
}
