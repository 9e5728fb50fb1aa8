//! Authentication handlers

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::StatusCode,
    Json,
};
use axum_extra::{headers::UserAgent, TypedHeader};

use super::MessageResponse;
use crate::error::AppError;
use crate::services::auth::{
    AdminLoginInput, AdminLoginResponse, AuthTokens, LoginContext, LoginInput, LoginResponse,
    RefreshInput, RegisterInput, RegisterResponse,
};
use crate::services::AuthService;
use crate::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterInput>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let response = auth_service.register(body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    user_agent: Option<TypedHeader<UserAgent>>,
    Json(body): Json<LoginInput>,
) -> Result<Json<LoginResponse>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let ctx = LoginContext {
        ip_address: Some(addr.ip().to_string()),
        user_agent: user_agent.map(|TypedHeader(ua)| ua.as_str().to_string()),
    };
    let response = auth_service.login(body, ctx).await?;
    Ok(Json(response))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshInput>,
) -> Result<Json<AuthTokens>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let tokens = auth_service.refresh_token(&body.refresh_token).await?;
    Ok(Json(tokens))
}

pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<RefreshInput>,
) -> Result<Json<MessageResponse>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    auth_service.logout(&body.refresh_token).await?;
    Ok(Json(MessageResponse::ok("Logged out successfully")))
}

pub async fn admin_login(
    State(state): State<AppState>,
    Json(body): Json<AdminLoginInput>,
) -> Result<Json<AdminLoginResponse>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let response = auth_service.admin_login(body).await?;
    Ok(Json(response))
}
