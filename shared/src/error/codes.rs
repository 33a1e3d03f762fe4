//! Unified error codes for the Mesa platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Tenant (restaurant) errors
//! - 4xxx: Order and kitchen errors
//! - 5xxx: Payment and loyalty errors
//! - 6xxx: Menu errors
//! - 7xxx: Table errors
//! - 8xxx: Staff and support errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so that clients can switch on
/// a stable number instead of parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Session has expired or was revoked
    SessionExpired = 1005,
    /// Account is disabled
    AccountDisabled = 1007,
    /// One-time code expired
    VerificationCodeExpired = 1010,
    /// One-time code does not match
    VerificationCodeInvalid = 1011,
    /// Too many verification attempts
    TooManyAttempts = 1012,
    /// Request throttled
    TooManyRequests = 1013,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 3xxx: Tenant ====================
    /// Restaurant not found
    TenantNotFound = 3002,
    /// Restaurant is deactivated
    TenantInactive = 3003,
    /// Restaurant slug already taken
    TenantSlugExists = 3004,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been paid
    OrderAlreadyPaid = 4002,
    /// Order has already been completed
    OrderAlreadyCompleted = 4003,
    /// Order has already been cancelled
    OrderAlreadyCancelled = 4004,
    /// Order has recorded payments
    OrderHasPayments = 4005,
    /// Order item not found
    OrderItemNotFound = 4006,
    /// Order is empty
    OrderEmpty = 4007,
    /// Order must be paid first
    OrderNotPaid = 4008,
    /// Client totals do not match the computed totals
    OrderTotalsMismatch = 4009,
    /// Status change not allowed from the current status
    InvalidStatusTransition = 4010,
    /// Order is completed or cancelled
    OrderClosed = 4011,
    /// Item quantity out of range
    InvalidQuantity = 4012,
    /// Kitchen order not found
    KitchenOrderNotFound = 4101,
    /// Kitchen order is not pending
    KitchenOrderNotPending = 4102,

    // ==================== 5xxx: Payment ====================
    /// Payment processing failed
    PaymentFailed = 5001,
    /// Invalid payment amount
    PaymentInvalidAmount = 5002,
    /// Payment exceeds remaining balance
    PaymentExceedsBalance = 5003,
    /// Loyalty balance too low
    InsufficientPoints = 5101,

    // ==================== 6xxx: Menu ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Menu item has invalid price
    MenuItemInvalidPrice = 6002,
    /// Menu item is not available
    MenuItemUnavailable = 6003,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category still has items
    CategoryHasItems = 6102,
    /// Category name already exists
    CategoryNameExists = 6103,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table is not available
    TableNotAvailable = 7002,
    /// Table has an open order
    TableHasOpenOrder = 7003,
    /// Table number already exists
    TableNumberExists = 7004,

    // ==================== 8xxx: Staff & Support ====================
    /// User not found
    UserNotFound = 8001,
    /// Email already registered
    EmailAlreadyRegistered = 8002,
    /// Cannot modify own account this way
    CannotModifySelf = 8003,
    /// User already has an open time entry
    AlreadyClockedIn = 8101,
    /// User has no open time entry
    NotClockedIn = 8102,
    /// Support ticket not found
    TicketNotFound = 8501,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::SessionExpired => "Session has expired",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::VerificationCodeExpired => "Verification code has expired",
            ErrorCode::VerificationCodeInvalid => "Verification code is invalid",
            ErrorCode::TooManyAttempts => "Too many attempts, request a new code",
            ErrorCode::TooManyRequests => "Too many requests, try again later",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",

            // Tenant
            ErrorCode::TenantNotFound => "Restaurant not found",
            ErrorCode::TenantInactive => "Restaurant is inactive",
            ErrorCode::TenantSlugExists => "Restaurant slug already exists",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyPaid => "Order has already been paid",
            ErrorCode::OrderAlreadyCompleted => "Order has already been completed",
            ErrorCode::OrderAlreadyCancelled => "Order has already been cancelled",
            ErrorCode::OrderHasPayments => "Order has recorded payments",
            ErrorCode::OrderItemNotFound => "Order item not found",
            ErrorCode::OrderEmpty => "Order has no items",
            ErrorCode::OrderNotPaid => "Order has not been paid",
            ErrorCode::OrderTotalsMismatch => "Order totals do not match",
            ErrorCode::InvalidStatusTransition => "Status transition is not allowed",
            ErrorCode::OrderClosed => "Order is closed",
            ErrorCode::InvalidQuantity => "Item quantity is out of range",
            ErrorCode::KitchenOrderNotFound => "Kitchen order not found",
            ErrorCode::KitchenOrderNotPending => "Kitchen order is not pending",

            // Payment
            ErrorCode::PaymentFailed => "Payment failed",
            ErrorCode::PaymentInvalidAmount => "Payment amount is invalid",
            ErrorCode::PaymentExceedsBalance => "Payment exceeds remaining balance",
            ErrorCode::InsufficientPoints => "Insufficient loyalty points",

            // Menu
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::MenuItemInvalidPrice => "Menu item price is invalid",
            ErrorCode::MenuItemUnavailable => "Menu item is not available",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryHasItems => "Category still has menu items",
            ErrorCode::CategoryNameExists => "Category name already exists",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableNotAvailable => "Table is not available",
            ErrorCode::TableHasOpenOrder => "Table has an open order",
            ErrorCode::TableNumberExists => "Table number already exists",

            // Staff & Support
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::EmailAlreadyRegistered => "Email is already registered",
            ErrorCode::CannotModifySelf => "Cannot modify your own account",
            ErrorCode::AlreadyClockedIn => "Already clocked in",
            ErrorCode::NotClockedIn => "Not clocked in",
            ErrorCode::TicketNotFound => "Support ticket not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::SessionExpired),
            1007 => Ok(ErrorCode::AccountDisabled),
            1010 => Ok(ErrorCode::VerificationCodeExpired),
            1011 => Ok(ErrorCode::VerificationCodeInvalid),
            1012 => Ok(ErrorCode::TooManyAttempts),
            1013 => Ok(ErrorCode::TooManyRequests),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),

            // Tenant
            3002 => Ok(ErrorCode::TenantNotFound),
            3003 => Ok(ErrorCode::TenantInactive),
            3004 => Ok(ErrorCode::TenantSlugExists),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAlreadyPaid),
            4003 => Ok(ErrorCode::OrderAlreadyCompleted),
            4004 => Ok(ErrorCode::OrderAlreadyCancelled),
            4005 => Ok(ErrorCode::OrderHasPayments),
            4006 => Ok(ErrorCode::OrderItemNotFound),
            4007 => Ok(ErrorCode::OrderEmpty),
            4008 => Ok(ErrorCode::OrderNotPaid),
            4009 => Ok(ErrorCode::OrderTotalsMismatch),
            4010 => Ok(ErrorCode::InvalidStatusTransition),
            4011 => Ok(ErrorCode::OrderClosed),
            4012 => Ok(ErrorCode::InvalidQuantity),
            4101 => Ok(ErrorCode::KitchenOrderNotFound),
            4102 => Ok(ErrorCode::KitchenOrderNotPending),

            // Payment
            5001 => Ok(ErrorCode::PaymentFailed),
            5002 => Ok(ErrorCode::PaymentInvalidAmount),
            5003 => Ok(ErrorCode::PaymentExceedsBalance),
            5101 => Ok(ErrorCode::InsufficientPoints),

            // Menu
            6001 => Ok(ErrorCode::MenuItemNotFound),
            6002 => Ok(ErrorCode::MenuItemInvalidPrice),
            6003 => Ok(ErrorCode::MenuItemUnavailable),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6102 => Ok(ErrorCode::CategoryHasItems),
            6103 => Ok(ErrorCode::CategoryNameExists),

            // Table
            7001 => Ok(ErrorCode::TableNotFound),
            7002 => Ok(ErrorCode::TableNotAvailable),
            7003 => Ok(ErrorCode::TableHasOpenOrder),
            7004 => Ok(ErrorCode::TableNumberExists),

            // Staff & Support
            8001 => Ok(ErrorCode::UserNotFound),
            8002 => Ok(ErrorCode::EmailAlreadyRegistered),
            8003 => Ok(ErrorCode::CannotModifySelf),
            8101 => Ok(ErrorCode::AlreadyClockedIn),
            8102 => Ok(ErrorCode::NotClockedIn),
            8501 => Ok(ErrorCode::TicketNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::TenantNotFound.code(), 3002);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::KitchenOrderNotPending.code(), 4102);
        assert_eq!(ErrorCode::InsufficientPoints.code(), 5101);
        assert_eq!(ErrorCode::CategoryHasItems.code(), 6102);
        assert_eq!(ErrorCode::TableNotAvailable.code(), 7002);
        assert_eq!(ErrorCode::TicketNotFound.code(), 8501);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::NotFound.is_success());
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(9999), Err(InvalidErrorCode(9999)));
        assert_eq!(ErrorCode::try_from(1006), Err(InvalidErrorCode(1006)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::TableNotAvailable).unwrap();
        assert_eq!(json, "7002");
        let code: ErrorCode = serde_json::from_str("4102").unwrap();
        assert_eq!(code, ErrorCode::KitchenOrderNotPending);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::NotFound.message(), "Resource not found");
        assert_eq!(ErrorCode::TableNotAvailable.message(), "Table is not available");
    }

    #[test]
    fn test_every_code_survives_u16_conversion() {
        for value in 0u16..10_000 {
            if let Ok(code) = ErrorCode::try_from(value) {
                assert_eq!(u16::from(code), value);
            }
        }
    }
}
