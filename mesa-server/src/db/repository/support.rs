//! Support Ticket Repository

use super::RepoResult;
use shared::models::{SupportTicket, SupportTicketCreate, TicketStatus};
use sqlx::SqliteExecutor;

const COLUMNS: &str =
    "id, restaurant_id, customer_id, order_id, subject, message, status, response, \
     created_at, updated_at";

pub async fn create(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    customer_id: i64,
    data: &SupportTicketCreate,
) -> RepoResult<SupportTicket> {
    let now = shared::util::now_millis();
    let ticket = sqlx::query_as::<_, SupportTicket>(&format!(
        "INSERT INTO support_ticket \
         (id, restaurant_id, customer_id, order_id, subject, message, status, created_at, \
         updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'open', ?7, ?7) RETURNING {COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(restaurant_id)
    .bind(customer_id)
    .bind(data.order_id)
    .bind(data.subject.trim())
    .bind(data.message.trim())
    .bind(now)
    .fetch_one(exec)
    .await?;
    Ok(ticket)
}

pub async fn find_by_id(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    id: i64,
) -> RepoResult<Option<SupportTicket>> {
    let ticket = sqlx::query_as::<_, SupportTicket>(&format!(
        "SELECT {COLUMNS} FROM support_ticket WHERE restaurant_id = ? AND id = ?"
    ))
    .bind(restaurant_id)
    .bind(id)
    .fetch_optional(exec)
    .await?;
    Ok(ticket)
}

/// Newest first; `customer_id` restricts to one customer's tickets
pub async fn list(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    customer_id: Option<i64>,
    status: Option<TicketStatus>,
) -> RepoResult<Vec<SupportTicket>> {
    let tickets = sqlx::query_as::<_, SupportTicket>(&format!(
        "SELECT {COLUMNS} FROM support_ticket WHERE restaurant_id = ?1 \
         AND (?2 IS NULL OR customer_id = ?2) AND (?3 IS NULL OR status = ?3) \
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(restaurant_id)
    .bind(customer_id)
    .bind(status)
    .fetch_all(exec)
    .await?;
    Ok(tickets)
}

/// Partial update; a closed ticket only accepts `closed` as its status
///
/// Returns `None` when the ticket is missing or the status change would
/// reopen it.
pub async fn update(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    id: i64,
    status: Option<TicketStatus>,
    response: Option<&str>,
) -> RepoResult<Option<SupportTicket>> {
    let ticket = sqlx::query_as::<_, SupportTicket>(&format!(
        "UPDATE support_ticket \
         SET status = COALESCE(?1, status), response = COALESCE(?2, response), updated_at = ?3 \
         WHERE restaurant_id = ?4 AND id = ?5 \
         AND (status != 'closed' OR COALESCE(?1, 'closed') = 'closed') \
         RETURNING {COLUMNS}"
    ))
    .bind(status)
    .bind(response)
    .bind(shared::util::now_millis())
    .bind(restaurant_id)
    .bind(id)
    .fetch_optional(exec)
    .await?;
    Ok(ticket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{testing, user};
    use shared::models::Role;

    #[tokio::test]
    async fn closed_ticket_cannot_be_reopened() {
        let (pool, rid) = testing::setup().await;
        let customer = user::create(
            &pool,
            user::NewUser {
                restaurant_id: rid,
                email: "guest@example.com",
                name: "Guest",
                password_hash: "x",
                role: Role::Customer,
                hourly_rate: 0.0,
            },
        )
        .await
        .unwrap();
        let ticket = create(
            &pool,
            rid,
            customer.id,
            &SupportTicketCreate {
                subject: "Cold soup".into(),
                message: "The soup arrived cold".into(),
                order_id: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(ticket.status, TicketStatus::Open);

        let closed = update(&pool, rid, ticket.id, Some(TicketStatus::Closed), Some("Sorry!"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(closed.status, TicketStatus::Closed);
        assert_eq!(closed.response.as_deref(), Some("Sorry!"));

        let reopened = update(&pool, rid, ticket.id, Some(TicketStatus::Open), None).await;
        assert!(reopened.unwrap().is_none());
        let note = update(&pool, rid, ticket.id, None, Some("Refunded")).await.unwrap().unwrap();
        assert_eq!(note.status, TicketStatus::Closed);
        assert_eq!(note.response.as_deref(), Some("Refunded"));

        let mine = list(&pool, rid, Some(customer.id), None).await.unwrap();
        assert_eq!(mine.len(), 1);
    }
}
