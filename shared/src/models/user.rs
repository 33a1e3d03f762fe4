//! User Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User role
///
/// Staff roles run the restaurant; `Customer` only orders, earns loyalty
/// points and opens support tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Cashier,
    Waiter,
    Kitchen,
    Customer,
}

impl Role {
    pub const STAFF: &'static [Role] = &[
        Role::Admin,
        Role::Manager,
        Role::Cashier,
        Role::Waiter,
        Role::Kitchen,
    ];
    pub const MANAGEMENT: &'static [Role] = &[Role::Admin, Role::Manager];
    pub const ADMIN: &'static [Role] = &[Role::Admin];
    /// Roles that work the kitchen queue
    pub const KITCHEN: &'static [Role] = &[Role::Admin, Role::Manager, Role::Kitchen];
    /// Roles that take orders and payments
    pub const FRONT_OF_HOUSE: &'static [Role] =
        &[Role::Admin, Role::Manager, Role::Cashier, Role::Waiter];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Cashier => "cashier",
            Role::Waiter => "waiter",
            Role::Kitchen => "kitchen",
            Role::Customer => "customer",
        }
    }

    pub fn is_staff(&self) -> bool {
        !matches!(self, Role::Customer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "cashier" => Ok(Role::Cashier),
            "waiter" => Ok(Role::Waiter),
            "kitchen" => Ok(Role::Kitchen),
            "customer" => Ok(Role::Customer),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// User row (includes the password hash, never serialized to clients)
#[derive(Debug, Clone)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub restaurant_id: i64,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
    pub hourly_rate: f64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// User response (without password)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub restaurant_id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub hourly_rate: f64,
    pub is_active: bool,
    pub created_at: i64,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            restaurant_id: u.restaurant_id,
            email: u.email,
            name: u.name,
            role: u.role,
            hourly_rate: u.hourly_rate,
            is_active: u.is_active,
            created_at: u.created_at,
        }
    }
}

/// Create staff payload (admin only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub hourly_rate: f64,
}

/// Update staff payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub hourly_rate: Option<f64>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_its_own_name() {
        for role in Role::STAFF.iter().chain(std::iter::once(&Role::Customer)) {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), *role);
        }
        assert!("chef".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Kitchen).unwrap(), "\"kitchen\"");
        assert!(!Role::Customer.is_staff());
        assert!(Role::Waiter.is_staff());
    }
}
