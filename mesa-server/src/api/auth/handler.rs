//! Auth API Handlers

use axum::{Json, extract::State};
use shared::models::{
    CustomerRegister, LoginRequest, LoginResponse, OtpRequest, OtpVerifyRequest, UserResponse,
};

use crate::api::{ApiResult, ok};
use crate::auth::CurrentUser;
use crate::auth::rate_limit::ClientIp;
use crate::services::auth as auth_service;
use crate::state::AppState;

/// POST /api/auth/login - password login
pub async fn login(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let response = auth_service::login(&state, req, Some(&ip)).await?;
    Ok(ok(response))
}

/// POST /api/auth/register - customer self-registration
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<CustomerRegister>,
) -> ApiResult<UserResponse> {
    let user = auth_service::register_customer(&state, req).await?;
    Ok(ok(user))
}

/// POST /api/auth/otp/request - send a one-time code
///
/// Answers the same whether or not the account exists.
pub async fn request_otp(
    State(state): State<AppState>,
    Json(req): Json<OtpRequest>,
) -> ApiResult<()> {
    auth_service::request_otp(&state, req).await?;
    Ok(ok(()))
}

/// POST /api/auth/otp/verify - log in with a one-time code
pub async fn verify_otp(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(req): Json<OtpVerifyRequest>,
) -> ApiResult<LoginResponse> {
    let response = auth_service::verify_otp(&state, req, Some(&ip)).await?;
    Ok(ok(response))
}

/// GET /api/auth/me - current user
pub async fn me(State(state): State<AppState>, user: CurrentUser) -> ApiResult<UserResponse> {
    let me = auth_service::me(&state, &user).await?;
    Ok(ok(me))
}

/// POST /api/auth/logout - end the current session
pub async fn logout(State(state): State<AppState>, user: CurrentUser) -> ApiResult<()> {
    auth_service::logout(&state, &user).await?;
    Ok(ok(()))
}
