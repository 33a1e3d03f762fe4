//! Auth API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/auth/login | POST | none, rate limited |
//! | /api/auth/register | POST | none, rate limited |
//! | /api/auth/otp/request | POST | none, rate limited |
//! | /api/auth/otp/verify | POST | none, rate limited |
//! | /api/auth/me | GET | bearer |
//! | /api/auth/logout | POST | bearer |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::rate_limit::{login_rate_limit, otp_rate_limit, register_rate_limit};
use crate::state::AppState;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new().nest("/api/auth", routes(state))
}

fn routes(state: &AppState) -> Router<AppState> {
    let login = Router::new()
        .route("/login", post(handler::login))
        .layer(middleware::from_fn_with_state(state.clone(), login_rate_limit));

    let otp = Router::new()
        .route("/otp/request", post(handler::request_otp))
        .route("/otp/verify", post(handler::verify_otp))
        .layer(middleware::from_fn_with_state(state.clone(), otp_rate_limit));

    let register = Router::new()
        .route("/register", post(handler::register))
        .layer(middleware::from_fn_with_state(state.clone(), register_rate_limit));

    let session = Router::new()
        .route("/me", get(handler::me))
        .route("/logout", post(handler::logout));

    login.merge(otp).merge(register).merge(session)
}
