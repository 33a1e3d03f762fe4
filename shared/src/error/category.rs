//! Error code ranges

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain an error code belongs to, taken from its thousands digit
///
/// | Range | Category |
/// |-------|----------|
/// | 0xxx | general |
/// | 1xxx | auth |
/// | 2xxx | permission |
/// | 3xxx | tenant |
/// | 4xxx | order and kitchen |
/// | 5xxx | payment and loyalty |
/// | 6xxx | menu |
/// | 7xxx | table |
/// | 8xxx | staff and support |
/// | 9xxx | system |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Auth,
    Permission,
    Tenant,
    Order,
    Payment,
    Menu,
    Table,
    Staff,
    System,
}

impl ErrorCategory {
    const BY_THOUSAND: [ErrorCategory; 10] = [
        Self::General,
        Self::Auth,
        Self::Permission,
        Self::Tenant,
        Self::Order,
        Self::Payment,
        Self::Menu,
        Self::Table,
        Self::Staff,
        Self::System,
    ];

    /// Anything at or above 9000 is a system error
    pub fn from_code(code: u16) -> Self {
        Self::BY_THOUSAND
            .get(usize::from(code / 1000))
            .copied()
            .unwrap_or(Self::System)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Tenant => "tenant",
            Self::Order => "order",
            Self::Payment => "payment",
            Self::Menu => "menu",
            Self::Table => "table",
            Self::Staff => "staff",
            Self::System => "system",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_follow_the_thousands_digit() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1013), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(4102), ErrorCategory::Order);
        assert_eq!(ErrorCategory::from_code(8501), ErrorCategory::Staff);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(u16::MAX), ErrorCategory::System);
    }

    #[test]
    fn codes_report_their_domain() {
        assert_eq!(ErrorCode::VerificationCodeExpired.category(), ErrorCategory::Auth);
        assert_eq!(ErrorCode::TenantNotFound.category(), ErrorCategory::Tenant);
        assert_eq!(ErrorCode::InsufficientPoints.category(), ErrorCategory::Payment);
        assert_eq!(ErrorCode::TableHasOpenOrder.category(), ErrorCategory::Table);
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }

    #[test]
    fn display_matches_serde_name() {
        assert_eq!(ErrorCategory::Menu.to_string(), "menu");
        assert_eq!(serde_json::to_string(&ErrorCategory::Staff).unwrap(), "\"staff\"");
    }
}
