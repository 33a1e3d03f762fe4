//! Time Entry and Payroll Models

use serde::{Deserialize, Serialize};

/// Clock-in / clock-out record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TimeEntry {
    pub id: i64,
    pub restaurant_id: i64,
    pub user_id: i64,
    pub clock_in: i64,
    pub clock_out: Option<i64>,
}

/// One user's line in a payroll report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollLine {
    pub user_id: i64,
    pub name: String,
    pub hourly_rate: f64,
    pub hours: f64,
    pub gross_pay: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollReport {
    pub from: i64,
    pub to: i64,
    pub lines: Vec<PayrollLine>,
    pub total_gross_pay: f64,
}
