//! Authentication middleware
//!
//! [`require_auth`] validates the bearer token and its session, then inserts
//! [`CurrentUser`] into the request extensions. [`require_role`] guards routes
//! by role.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};
use shared::models::Role;

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::db::repository::session;
use crate::security_log;
use crate::state::AppState;

/// Validate a raw token and its server-side session
pub async fn authenticate(state: &AppState, token: &str) -> Result<CurrentUser, AppError> {
    let claims = state.jwt.validate_token(token).map_err(|e| {
        security_log!(WARN, "auth_failed", error = %e);
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })?;

    let user = CurrentUser::try_from(claims)
        .map_err(|e| AppError::invalid_token(format!("Malformed claims: {e}")))?;

    let session = session::find_valid(&state.pool, &user.session_id, shared::util::now_millis())
        .await?
        .filter(|s| s.user_id == user.user_id)
        .ok_or_else(|| {
            security_log!(
                WARN,
                "session_invalid",
                user_id = user.user_id,
                session_id = %user.session_id
            );
            AppError::new(ErrorCode::SessionExpired)
        })?;
    debug_assert_eq!(session.restaurant_id, user.restaurant_id);

    Ok(user)
}

/// Pull the bearer token out of the request headers
pub fn bearer_token(headers: &http::HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(AppError::not_authenticated)?;
    JwtService::extract_from_header(header)
        .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))
}

/// Require a valid token and live session
///
/// | Failure | Code |
/// |---------|------|
/// | no Authorization header | 401 NotAuthenticated |
/// | expired token | 401 TokenExpired |
/// | bad token | 401 TokenInvalid |
/// | session logged out or purged | 401 SessionExpired |
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let token = bearer_token(req.headers()).inspect_err(|_| {
        security_log!(WARN, "auth_missing", uri = %req.uri());
    })?;
    let user = authenticate(&state, token).await?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Role guard, layered inside [`require_auth`]
///
/// ```ignore
/// Router::new()
///     .route("/", post(handler::create))
///     .layer(middleware::from_fn(require_role(Role::MANAGEMENT)));
/// ```
pub fn require_role(
    roles: &'static [Role],
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or_else(AppError::not_authenticated)?;

            if !user.has_role(roles) {
                security_log!(
                    WARN,
                    "permission_denied",
                    user_id = user.user_id,
                    role = %user.role,
                    uri = %req.uri()
                );
                return Err(AppError::permission_denied(format!(
                    "Role '{}' may not access this resource",
                    user.role
                )));
            }

            Ok(next.run(req).await)
        })
    }
}
