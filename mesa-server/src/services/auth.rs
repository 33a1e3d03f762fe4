//! Onboarding, login, one-time codes, sessions and staff accounts
//!
//! Every issued token is backed by a `session` row whose id is the token's
//! `jti`; logging out or purging the row revokes the token.

use shared::error::{AppError, ErrorCode};
use shared::models::setting::OTP_TTL_SECS;
use shared::models::{
    CustomerRegister, LoginLog, LoginMethod, LoginRequest, LoginResponse, OnboardResponse,
    OtpRequest, OtpVerifyRequest, Restaurant, RestaurantCreate, Role, User, UserCreate,
    UserResponse, UserUpdate,
};

use crate::auth::password::{generate_code, hash_password, verify_password};
use crate::auth::{CurrentUser, TokenSubject};
use crate::db::repository::login_log::{self, NewLoginLog};
use crate::db::repository::{RepoError, otp, restaurant, session, user as user_repo};
use crate::error::ServiceResult;
use crate::security_log;
use crate::services::settings;
use crate::state::AppState;
use crate::utils::validation::{
    MAX_NAME_LEN, normalize_email, validate_password, validate_rate, validate_required_text,
    validate_slug,
};

/// Failed verifications allowed before a code is locked
pub const MAX_OTP_ATTEMPTS: i32 = 5;

/// Maximum rows returned by [`login_history`]
pub const MAX_LOGIN_LOG_LIMIT: i64 = 500;

fn hash(secret: &str) -> ServiceResult<String> {
    hash_password(secret).map_err(|e| {
        tracing::error!(error = %e, "Password hashing failed");
        AppError::internal("Failed to hash secret").into()
    })
}

async fn active_restaurant(state: &AppState, slug: &str) -> ServiceResult<Restaurant> {
    let slug = slug.trim().to_lowercase();
    let restaurant = restaurant::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| {
            AppError::new(ErrorCode::TenantNotFound).with_detail("slug", slug.as_str())
        })?;
    if !restaurant.is_active {
        return Err(AppError::new(ErrorCode::TenantInactive).into());
    }
    Ok(restaurant)
}

/// Create a restaurant together with its first admin
pub async fn onboard(state: &AppState, req: RestaurantCreate) -> ServiceResult<OnboardResponse> {
    validate_required_text(&req.name, "name", MAX_NAME_LEN)?;
    validate_slug(&req.slug)?;
    validate_required_text(&req.admin_name, "admin_name", MAX_NAME_LEN)?;
    validate_password(&req.admin_password)?;
    let email = normalize_email(&req.admin_email)?;
    let password_hash = hash(&req.admin_password)?;

    let mut tx = state.pool.begin().await?;
    let restaurant = match restaurant::create(&mut *tx, req.name.trim(), &req.slug).await {
        Ok(r) => r,
        Err(RepoError::Duplicate(_)) => {
            return Err(AppError::new(ErrorCode::TenantSlugExists)
                .with_detail("slug", req.slug.as_str())
                .into());
        }
        Err(e) => return Err(e.into()),
    };
    let admin = user_repo::create(
        &mut *tx,
        user_repo::NewUser {
            restaurant_id: restaurant.id,
            email: &email,
            name: req.admin_name.trim(),
            password_hash: &password_hash,
            role: Role::Admin,
            hourly_rate: 0.0,
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(restaurant_id = restaurant.id, slug = %restaurant.slug, "Restaurant onboarded");
    Ok(OnboardResponse {
        restaurant,
        admin: admin.into(),
    })
}

async fn insert_user(state: &AppState, new: user_repo::NewUser<'_>) -> ServiceResult<User> {
    let email = new.email.to_string();
    match user_repo::create(&state.pool, new).await {
        Ok(user) => Ok(user),
        Err(RepoError::Duplicate(_)) => Err(AppError::new(ErrorCode::EmailAlreadyRegistered)
            .with_detail("email", email)
            .into()),
        Err(e) => Err(e.into()),
    }
}

/// Customer self-registration; the role is always `customer`
pub async fn register_customer(
    state: &AppState,
    req: CustomerRegister,
) -> ServiceResult<UserResponse> {
    validate_required_text(&req.name, "name", MAX_NAME_LEN)?;
    validate_password(&req.password)?;
    let email = normalize_email(&req.email)?;
    let restaurant = active_restaurant(state, &req.slug).await?;
    let password_hash = hash(&req.password)?;

    let user = insert_user(
        state,
        user_repo::NewUser {
            restaurant_id: restaurant.id,
            email: &email,
            name: req.name.trim(),
            password_hash: &password_hash,
            role: Role::Customer,
            hourly_rate: 0.0,
        },
    )
    .await?;
    tracing::info!(restaurant_id = restaurant.id, user_id = user.id, "Customer registered");
    Ok(user.into())
}

async fn record_attempt(
    state: &AppState,
    restaurant_id: i64,
    user_id: Option<i64>,
    email: &str,
    method: LoginMethod,
    success: bool,
    ip: Option<&str>,
) {
    let entry = NewLoginLog {
        restaurant_id,
        user_id,
        email,
        method,
        success,
        ip,
    };
    if let Err(e) = login_log::create(&state.pool, entry).await {
        tracing::error!(error = %e, "Failed to write login log");
    }
}

/// Open a session and sign a token for it
async fn issue_session(state: &AppState, user: User) -> ServiceResult<LoginResponse> {
    let expires_at = shared::util::now_millis() + state.session_ttl_millis();
    let session = session::create(&state.pool, user.id, user.restaurant_id, expires_at).await?;
    let token = state
        .jwt
        .generate_token(TokenSubject {
            user_id: user.id,
            restaurant_id: user.restaurant_id,
            email: &user.email,
            role: user.role,
            session_id: &session.id,
            expires_at,
        })
        .map_err(|e| {
            tracing::error!(error = %e, "Token generation failed");
            AppError::internal("Failed to issue token")
        })?;

    Ok(LoginResponse {
        token,
        expires_at,
        user: user.into(),
    })
}

/// Password login; every attempt is written to the login log
pub async fn login(
    state: &AppState,
    req: LoginRequest,
    ip: Option<&str>,
) -> ServiceResult<LoginResponse> {
    let rid = active_restaurant(state, &req.slug).await?.id;
    let email = req.email.trim().to_lowercase();
    let found = user_repo::find_by_email(&state.pool, rid, &email).await?;
    let method = LoginMethod::Password;

    let user = match found {
        Some(u) if verify_password(&req.password, &u.password_hash) => u,
        other => {
            let user_id = other.map(|u| u.id);
            record_attempt(state, rid, user_id, &email, method, false, ip).await;
            security_log!(WARN, "login_failed", restaurant_id = rid, email = %email, ip = ?ip);
            return Err(AppError::invalid_credentials().into());
        }
    };
    if !user.is_active {
        record_attempt(state, rid, Some(user.id), &email, method, false, ip).await;
        security_log!(WARN, "login_disabled", user_id = user.id, ip = ?ip);
        return Err(AppError::new(ErrorCode::AccountDisabled).into());
    }

    record_attempt(state, rid, Some(user.id), &email, method, true, ip).await;
    security_log!(INFO, "login_success", user_id = user.id, role = %user.role, ip = ?ip);
    issue_session(state, user).await
}

/// Generate and deliver a one-time code
///
/// Unknown or disabled accounts get the same response without a code being
/// issued.
pub async fn request_otp(state: &AppState, req: OtpRequest) -> ServiceResult<()> {
    let restaurant = active_restaurant(state, &req.slug).await?;
    let email = normalize_email(&req.email)?;

    let eligible = user_repo::find_by_email(&state.pool, restaurant.id, &email)
        .await?
        .is_some_and(|u| u.is_active);
    if !eligible {
        security_log!(WARN, "otp_unknown_account", restaurant_id = restaurant.id, email = %email);
        return Ok(());
    }

    let now = shared::util::now_millis();
    let ttl_secs = settings::integer(&state.pool, restaurant.id, OTP_TTL_SECS).await?;
    let code = generate_code();
    let code_hash = hash(&code)?;
    otp::upsert(&state.pool, restaurant.id, &email, &code_hash, now + ttl_secs * 1000, now).await?;

    state
        .otp_sender
        .send_code(&restaurant.slug, &email, &code)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, email = %email, "One-time code delivery failed");
            AppError::internal("Failed to deliver code")
        })?;
    security_log!(INFO, "otp_issued", restaurant_id = restaurant.id, email = %email);
    Ok(())
}

fn no_pending_code() -> AppError {
    AppError::with_message(ErrorCode::NotFound, "No code pending for this email")
}

/// Check a one-time code and log in on success
///
/// Each call first reserves one attempt in the database; the hash is only
/// compared once the reservation succeeded.
pub async fn verify_otp(
    state: &AppState,
    req: OtpVerifyRequest,
    ip: Option<&str>,
) -> ServiceResult<LoginResponse> {
    let restaurant = active_restaurant(state, &req.slug).await?;
    let rid = restaurant.id;
    let email = normalize_email(&req.email)?;
    let now = shared::util::now_millis();

    let Some((code_hash, attempts)) =
        otp::reserve_attempt(&state.pool, rid, &email, MAX_OTP_ATTEMPTS, now).await?
    else {
        let err = match otp::find(&state.pool, rid, &email).await? {
            None => no_pending_code(),
            Some(record) if now >= record.expires_at => {
                AppError::new(ErrorCode::VerificationCodeExpired)
            }
            Some(_) => {
                security_log!(WARN, "otp_locked", restaurant_id = rid, email = %email);
                AppError::new(ErrorCode::TooManyAttempts)
            }
        };
        return Err(err.into());
    };

    let user = user_repo::find_by_email(&state.pool, rid, &email).await?;
    if !verify_password(req.code.trim(), &code_hash) {
        let user_id = user.map(|u| u.id);
        record_attempt(state, rid, user_id, &email, LoginMethod::Otp, false, ip).await;
        security_log!(WARN, "otp_mismatch", restaurant_id = rid, email = %email, attempts);
        return Err(AppError::new(ErrorCode::VerificationCodeInvalid)
            .with_detail("attempts_left", MAX_OTP_ATTEMPTS - attempts)
            .into());
    }
    if !otp::consume(&state.pool, rid, &email, &code_hash).await? {
        return Err(no_pending_code().into());
    }

    let user = user
        .filter(|u| u.is_active)
        .ok_or_else(AppError::invalid_credentials)?;
    record_attempt(state, rid, Some(user.id), &email, LoginMethod::Otp, true, ip).await;
    security_log!(INFO, "otp_login_success", user_id = user.id, ip = ?ip);
    issue_session(state, user).await
}

pub async fn logout(state: &AppState, user: &CurrentUser) -> ServiceResult<()> {
    session::delete(&state.pool, &user.session_id).await?;
    security_log!(INFO, "logout", user_id = user.user_id);
    Ok(())
}

pub async fn me(state: &AppState, user: &CurrentUser) -> ServiceResult<UserResponse> {
    let found = user_repo::find_by_id(&state.pool, user.restaurant_id, user.user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    Ok(found.into())
}

/// Admin-created account with any role
pub async fn create_user(
    state: &AppState,
    admin: &CurrentUser,
    req: UserCreate,
) -> ServiceResult<UserResponse> {
    validate_required_text(&req.name, "name", MAX_NAME_LEN)?;
    validate_password(&req.password)?;
    validate_rate(req.hourly_rate)?;
    let email = normalize_email(&req.email)?;
    let password_hash = hash(&req.password)?;

    let user = insert_user(
        state,
        user_repo::NewUser {
            restaurant_id: admin.restaurant_id,
            email: &email,
            name: req.name.trim(),
            password_hash: &password_hash,
            role: req.role,
            hourly_rate: req.hourly_rate,
        },
    )
    .await?;
    tracing::info!(
        user_id = user.id,
        role = %user.role,
        created_by = admin.user_id,
        "User created"
    );
    Ok(user.into())
}

/// Change name, role, rate or active flag
///
/// Role changes and deactivation end the user's sessions. Admins cannot
/// demote or deactivate themselves.
pub async fn update_user(
    state: &AppState,
    admin: &CurrentUser,
    user_id: i64,
    req: UserUpdate,
) -> ServiceResult<UserResponse> {
    if let Some(name) = &req.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(rate) = req.hourly_rate {
        validate_rate(rate)?;
    }
    let demotes_self = req.role.is_some_and(|r| r != admin.role) || req.is_active == Some(false);
    if user_id == admin.user_id && demotes_self {
        return Err(AppError::new(ErrorCode::CannotModifySelf).into());
    }

    let before = user_repo::find_by_id(&state.pool, admin.restaurant_id, user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound).with_detail("user_id", user_id))?;
    let updated = user_repo::update(&state.pool, admin.restaurant_id, user_id, &req)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound).with_detail("user_id", user_id))?;

    if updated.role != before.role || (before.is_active && !updated.is_active) {
        let ended = session::delete_for_user(&state.pool, user_id).await?;
        security_log!(INFO, "sessions_revoked", user_id, sessions = ended, by = admin.user_id);
    }
    Ok(updated.into())
}

pub async fn list_users(
    state: &AppState,
    restaurant_id: i64,
    role: Option<Role>,
) -> ServiceResult<Vec<UserResponse>> {
    let users = user_repo::list(&state.pool, restaurant_id, role).await?;
    Ok(users.into_iter().map(UserResponse::from).collect())
}

pub async fn login_history(
    state: &AppState,
    restaurant_id: i64,
    limit: Option<i64>,
) -> ServiceResult<Vec<LoginLog>> {
    let limit = limit.unwrap_or(100).clamp(1, MAX_LOGIN_LOG_LIMIT);
    Ok(login_log::list(&state.pool, restaurant_id, limit).await?)
}
