use crate::channel::ChannelTable;
use crate::error::{ConnectionErrorKind, Error, ErrorKind};
use crate::event::{ClientEvent, EventListeners};
use eventsource_stream::Eventsource;
use futures_util::{pin_mut, StreamExt};
use log::*;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::StatusCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

const EVENT_STREAM: &str = "text/event-stream";

/// An open push-stream and the task reading it.
///
/// Dropping the connection stops the reader and closes the stream.
pub(crate) struct Connection {
    reader: JoinHandle<()>,
    // Set before `ConnectionLost` is emitted.
    lost: Arc<AtomicBool>,
}

impl Connection {
    /// Opens the stream at `url`.
    ///
    /// Resolves once the server has answered 200 with an event-stream body;
    /// events are then dispatched to `channels` until the stream ends, at
    /// which point `ConnectionLost` is emitted on `listeners`.
    pub(crate) async fn open(
        http: &reqwest::Client,
        url: &str,
        channels: ChannelTable,
        listeners: EventListeners,
    ) -> Result<Self, Error> {
        let response = http
            .get(url)
            .header(ACCEPT, EVENT_STREAM)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| Error {
                source: Some(Box::new(e)),
                error_kind: ErrorKind::Connection(ConnectionErrorKind::Network),
            })?;

        if response.status() != StatusCode::OK {
            return Err(Error::new(ErrorKind::Connection(
                ConnectionErrorKind::UnexpectedStatus(response.status().as_u16()),
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with(EVENT_STREAM) {
            return Err(Error::new(ErrorKind::Connection(
                ConnectionErrorKind::UnexpectedContentType(content_type),
            )));
        }

        debug!("Push-stream open at {url}");

        let lost = Arc::new(AtomicBool::new(false));
        let reader_lost = lost.clone();
        let reader = tokio::spawn(async move {
            let events = response.bytes_stream().eventsource();
            pin_mut!(events);

            while let Some(item) = events.next().await {
                match item {
                    Ok(event) => {
                        trace!("Received '{}' event", event.event);
                        channels.dispatch(&event.event, &event.data);
                    }
                    Err(e) => {
                        warn!("Push-stream error: {e}");
                        break;
                    }
                }
            }

            debug!("Push-stream ended");
            reader_lost.store(true, Ordering::SeqCst);
            listeners.dispatch(ClientEvent::ConnectionLost);
        });

        Ok(Self { reader, lost })
    }

    /// Whether the stream is still being read. False from the moment
    /// `ConnectionLost` is emitted.
    pub(crate) fn is_live(&self) -> bool {
        !self.lost.load(Ordering::SeqCst) && !self.reader.is_finished()
    }

    /// Stops reading and closes the stream without emitting any event.
    pub(crate) fn close(self) {
        self.reader.abort();
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
