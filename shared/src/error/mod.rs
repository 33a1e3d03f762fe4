//! Error codes, `AppError` and the JSON envelope
//!
//! Codes are grouped by thousands (see [`ErrorCategory`]); each one carries
//! a default message and an HTTP status.
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::new(ErrorCode::TableNotAvailable)
//!     .with_detail("table_number", 4);
//!
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code, 7002);
//! assert_eq!(err.http_status(), shared::http::StatusCode::CONFLICT);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult, ErrorDetails};
