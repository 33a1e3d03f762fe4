//! Real-time WebSocket endpoint
//!
//! GET /api/ws?token=<JWT>
//!
//! The token travels in the query string because browsers cannot set headers
//! on a WebSocket handshake. After the upgrade the server sends a `ready`
//! frame, then every event of the caller's restaurant as
//! `{"event": <name>, "data": <payload>}`. A subscriber that falls behind gets
//! a `resync` frame and should refetch state.

use axum::Router;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use futures::{Sink, SinkExt, StreamExt};
use serde::Deserialize;
use shared::error::AppError;
use shared::event::RealtimeEvent;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::Duration;

use crate::auth::CurrentUser;
use crate::auth::middleware::authenticate;
use crate::db::repository::session;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/ws", get(handle_ws))
}

#[derive(Deserialize)]
pub struct WsAuthQuery {
    token: String,
}

/// GET /api/ws?token=<JWT>
pub async fn handle_ws(
    State(state): State<AppState>,
    Query(query): Query<WsAuthQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let user = authenticate(&state, &query.token).await?;
    Ok(ws.on_upgrade(move |socket| ws_session(socket, state, user)))
}

async fn send_event<S>(sink: &mut S, event: &RealtimeEvent) -> Result<(), ()>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    let text = serde_json::to_string(event).map_err(|_| ())?;
    sink.send(Message::Text(text.into())).await.map_err(|_| ())
}

/// Result of passing one hub receive on to the socket
#[derive(Debug, PartialEq)]
enum Relay {
    Sent,
    /// `n` events were dropped and a `resync` frame went out instead
    Resynced(u64),
    Stop,
}

async fn relay<S>(sink: &mut S, received: Result<RealtimeEvent, RecvError>) -> Relay
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    let (event, lagged) = match received {
        Ok(event) => (event, None),
        Err(RecvError::Lagged(n)) => (RealtimeEvent::Resync, Some(n)),
        Err(RecvError::Closed) => return Relay::Stop,
    };
    match (send_event(sink, &event).await, lagged) {
        (Err(()), _) => Relay::Stop,
        (Ok(()), Some(n)) => Relay::Resynced(n),
        (Ok(()), None) => Relay::Sent,
    }
}

/// The socket's session has not been logged out, purged or expired
async fn session_alive(state: &AppState, user: &CurrentUser) -> bool {
    let now = shared::util::now_millis();
    match session::find_valid(&state.pool, &user.session_id, now).await {
        Ok(found) => found.is_some_and(|s| s.user_id == user.user_id),
        Err(e) => {
            tracing::warn!(user_id = user.user_id, error = %e, "WS session check failed");
            true
        }
    }
}

async fn ws_session(socket: WebSocket, state: AppState, user: CurrentUser) {
    let rid = user.restaurant_id;
    let (mut sink, mut stream) = socket.split();
    let mut hub_rx = state.hub.subscribe(rid);

    tracing::info!(restaurant_id = rid, user_id = user.user_id, "WS connected");

    if send_event(&mut sink, &RealtimeEvent::Ready { restaurant_id: rid }).await.is_err() {
        return;
    }

    let period = Duration::from_secs(state.config.ws_ping_interval_secs.max(1));
    let mut ping_interval = tokio::time::interval(period);
    ping_interval.tick().await;

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if !session_alive(&state, &user).await {
                    tracing::info!(restaurant_id = rid, user_id = user.user_id, "WS session ended");
                    let _ = sink.close().await;
                    break;
                }
                if sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }

            received = hub_rx.recv() => {
                match relay(&mut sink, received).await {
                    Relay::Sent => {}
                    Relay::Resynced(n) => {
                        tracing::warn!(
                            restaurant_id = rid,
                            user_id = user.user_id,
                            lagged = n,
                            "WS subscriber lagged"
                        );
                        hub_rx = state.hub.subscribe(rid);
                    }
                    Relay::Stop => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::info!(restaurant_id = rid, user_id = user.user_id, "WS disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixture;
    use futures::channel::mpsc;
    use tokio::sync::broadcast;

    fn frame_event(msg: Message) -> serde_json::Value {
        match msg {
            Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
            other => panic!("expected a text frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn lagging_subscriber_gets_a_resync_frame() {
        let (tx, mut hub_rx) = broadcast::channel(1);
        tx.send(RealtimeEvent::Ready { restaurant_id: 1 }).unwrap();
        tx.send(RealtimeEvent::Ready { restaurant_id: 2 }).unwrap();

        let (frames_tx, mut frames) = mpsc::unbounded::<Message>();
        let mut sink = frames_tx.sink_map_err(axum::Error::new);

        let outcome = relay(&mut sink, hub_rx.recv().await).await;
        assert_eq!(outcome, Relay::Resynced(1));
        assert_eq!(frame_event(frames.next().await.unwrap())["event"], "resync");

        let outcome = relay(&mut sink, hub_rx.recv().await).await;
        assert_eq!(outcome, Relay::Sent);
        let frame = frame_event(frames.next().await.unwrap());
        assert_eq!(frame["event"], "ready");
        assert_eq!(frame["data"]["restaurant_id"], 2);
    }

    #[tokio::test]
    async fn closed_hub_or_socket_stops_the_relay() {
        let (frames_tx, _frames) = mpsc::unbounded::<Message>();
        let mut sink = frames_tx.sink_map_err(axum::Error::new);
        assert_eq!(relay(&mut sink, Err(RecvError::Closed)).await, Relay::Stop);

        let (frames_tx, frames) = mpsc::unbounded::<Message>();
        drop(frames);
        let mut sink = frames_tx.sink_map_err(axum::Error::new);
        let event = Ok(RealtimeEvent::Resync);
        assert_eq!(relay(&mut sink, event).await, Relay::Stop);
    }

    #[tokio::test]
    async fn socket_session_ends_with_logout() {
        let fx = fixture::setup().await;
        let state = &fx.state;
        let expires_at = shared::util::now_millis() + 60_000;
        let live = session::create(&state.pool, fx.waiter.user_id, fx.rid, expires_at)
            .await
            .unwrap();
        let waiter = CurrentUser {
            session_id: live.id.clone(),
            ..fx.waiter.clone()
        };

        assert!(session_alive(state, &waiter).await);
        assert!(!session_alive(state, &fx.waiter).await);
        let borrowed = CurrentUser {
            user_id: fx.cook.user_id,
            ..waiter.clone()
        };
        assert!(!session_alive(state, &borrowed).await);

        session::delete(&state.pool, &live.id).await.unwrap();
        assert!(!session_alive(state, &waiter).await);
    }
}
