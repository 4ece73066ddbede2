//! Server-Sent Events mirror of the WebSocket feed, for simple browser sources.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use serde_json::json;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use crate::app::SharedState;
use crate::events;

/// GET /events
pub async fn sse_handler(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let client_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(
        clients = state.ws_sender().receiver_count() + 1,
        "SSE client connected: {client_id}"
    );

    let welcome = events::message(
        events::CONNECTED,
        json!({ "clientId": client_id, "message": "Connected to gift wheel server" }),
    );
    let first = tokio_stream::once(welcome.to_string());

    // Lagged receivers skip what they missed.
    let updates = BroadcastStream::new(state.subscribe_ws()).filter_map(|msg| msg.ok());

    let stream = first
        .chain(updates)
        .map(|data| Ok(Event::default().data(data)));

    Sse::new(stream).keep_alive(KeepAlive::default())
}
