//! Support Ticket (complaint) Model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    /// Closed is terminal; every other status can move anywhere
    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        *self != TicketStatus::Closed || next == TicketStatus::Closed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SupportTicket {
    pub id: i64,
    pub restaurant_id: i64,
    pub customer_id: i64,
    pub order_id: Option<i64>,
    pub subject: String,
    pub message: String,
    pub status: TicketStatus,
    pub response: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportTicketCreate {
    pub subject: String,
    pub message: String,
    pub order_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupportTicketUpdate {
    pub status: Option<TicketStatus>,
    pub response: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_is_terminal() {
        assert!(TicketStatus::Resolved.can_transition_to(TicketStatus::Open));
        assert!(TicketStatus::Open.can_transition_to(TicketStatus::Closed));
        assert!(!TicketStatus::Closed.can_transition_to(TicketStatus::Open));
        assert!(TicketStatus::Closed.can_transition_to(TicketStatus::Closed));
    }
}
