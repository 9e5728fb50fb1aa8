//! Authentication middleware
//!
//! Bearer-token guards for farmer and admin routes. The signing secret comes
//! from application state; there is no fallback.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use uuid::Uuid;

use crate::error::AppError;
use crate::services::auth::{decode_token, Claims, Role};
use crate::AppState;

/// Authenticated farmer extracted from the access token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub farmer_id: Uuid,
}

/// Authenticated admin
#[derive(Clone, Debug)]
pub struct AdminUser {
    pub username: String,
}

fn bearer_claims(request: &Request, secret: &str) -> Result<Claims, AppError> {
    let Some(Authorization(bearer)) = request.headers().typed_get::<Authorization<Bearer>>() else {
        return Err(AppError::Unauthorized(
            "Missing or invalid Authorization header".to_string(),
        ));
    };
    decode_token(bearer.token(), secret)
}

/// Require a farmer access token
pub async fn farmer_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let claims = match bearer_claims(&request, &state.config.jwt.secret) {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };
    if claims.role != Role::Farmer {
        return AppError::Forbidden("Farmer access required".to_string()).into_response();
    }
    let Ok(farmer_id) = Uuid::parse_str(&claims.sub) else {
        return AppError::InvalidToken.into_response();
    };

    request.extensions_mut().insert(AuthUser { farmer_id });
    next.run(request).await
}

/// Require an admin access token
pub async fn admin_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let claims = match bearer_claims(&request, &state.config.jwt.secret) {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };
    if claims.role != Role::Admin {
        return AppError::Forbidden("Admin access required".to_string()).into_response();
    }

    request.extensions_mut().insert(AdminUser {
        username: claims.sub,
    });
    next.run(request).await
}
