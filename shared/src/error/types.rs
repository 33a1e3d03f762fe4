//! `AppError` and the response envelope

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Extra context attached to an error, e.g. `{"order_id": 42}`
pub type ErrorDetails = BTreeMap<String, Value>;

/// Business or system failure carried up to the HTTP layer
///
/// The message defaults to the code's text; handlers attach the offending ids
/// or limits as details so clients do not have to parse messages.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<ErrorDetails>,
}

impl AppError {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    /// Infrastructure failure rather than a rejected request
    pub fn is_system(&self) -> bool {
        self.code.category() == ErrorCategory::System
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, msg)
    }

    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }
}

/// Envelope for every JSON body the API returns
///
/// ```json
/// {"code": 0, "message": "OK", "data": {...}}
/// {"code": 7002, "message": "Table is not available", "details": {"table_number": 4}}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: ErrorCode::Success.code(),
            message: "OK".to_string(),
            data: Some(data),
            details: None,
        }
    }

    pub fn error(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message.clone(),
            data: None,
            details: err.details.clone(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == ErrorCode::Success.code()
    }
}

/// Result alias used by validators and other code outside the server
pub type AppResult<T> = Result<T, AppError>;

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if self.is_system() {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                details = ?self.details,
                "Request failed with system error"
            );
        }
        (self.http_status(), axum::Json(ApiResponse::<()>::error(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_message_comes_from_the_code() {
        let err = AppError::new(ErrorCode::TableNotFound);
        assert_eq!(err.message, "Table not found");
        assert!(err.details.is_none());
        assert_eq!(err.to_string(), "Table not found");
    }

    #[test]
    fn details_accumulate_in_key_order() {
        let err = AppError::new(ErrorCode::PaymentExceedsBalance)
            .with_detail("remaining", 12.5)
            .with_detail("amount", 20.0);
        let keys: Vec<_> = err.details.as_ref().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["amount", "remaining"]);
    }

    #[test]
    fn constructors_map_to_expected_statuses() {
        assert_eq!(AppError::not_authenticated().http_status(), StatusCode::UNAUTHORIZED);
        let forbidden = AppError::permission_denied("kitchen only");
        assert_eq!(forbidden.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::validation("bad").http_status(), StatusCode::BAD_REQUEST);
        assert!(AppError::database("locked").is_system());
        assert!(!AppError::invalid_credentials().is_system());
    }

    #[test]
    fn error_envelope_carries_code_and_details() {
        let err = AppError::new(ErrorCode::TableNotAvailable).with_detail("table_number", 4);
        let body = serde_json::to_value(ApiResponse::<()>::error(&err)).unwrap();

        assert_eq!(body["code"], 7002);
        assert_eq!(body["message"], "Table is not available");
        assert_eq!(body["details"]["table_number"], 4);
        assert!(body.get("data").is_none());
    }

    #[test]
    fn success_envelope_has_zero_code() {
        let response = ApiResponse::success(vec![1, 2]);
        assert!(response.is_success());
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"code":0,"message":"OK","data":[1,2]}"#);
    }
}
