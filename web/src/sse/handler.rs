use async_stream::stream;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use log::*;
use service::AppState;
use sse::{ClientId, ConnectionId, Manager};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Unregisters a stream when axum drops its response body, which happens
/// as soon as the client goes away.
struct StreamGuard {
    manager: Arc<Manager>,
    client_id: ClientId,
    connection_id: ConnectionId,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        debug!("SSE stream closed for client {}, cleaning up", self.client_id);
        self.manager
            .unregister_stream(&self.client_id, &self.connection_id);
    }
}

/// GET /__sse/:client_id
///
/// Opens the push-stream of a client. Channel events arrive on it once the
/// client subscribes.
pub(crate) async fn sse_handler(
    Path(client_id): Path<String>,
    State(app_state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let client_id = ClientId::new(client_id);
    debug!("Establishing SSE stream for client {}", client_id);

    let (tx, mut rx) = mpsc::unbounded_channel();

    let connection_id = app_state
        .sse_manager
        .register_stream(client_id.clone(), tx)
        .await;

    let guard = StreamGuard {
        manager: app_state.sse_manager.clone(),
        client_id,
        connection_id,
    };

    let stream = stream! {
        let _guard = guard;
        while let Some(event) = rx.recv().await {
            yield event;
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new().interval(app_state.config.keep_alive_interval()),
    )
}
