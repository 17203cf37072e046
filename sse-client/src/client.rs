use crate::channel::ChannelTable;
use crate::connection::Connection;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::event::{ClientEvent, EventListeners};
use crate::store::{self, IdStore};
use log::*;
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for `SseClient`.
///
/// Defaults to the process-wide session store for the client id, a fresh
/// reqwest client and a 30 second timeout on subscribe/unsubscribe calls.
pub struct ClientBuilder {
    base_url: String,
    store: Option<Arc<dyn IdStore>>,
    http: Option<reqwest::Client>,
    request_timeout: Duration,
}

impl ClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            store: None,
            http: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set where the client id is loaded from and saved to.
    pub fn with_id_store(mut self, store: Arc<dyn IdStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use an existing HTTP client. It must not carry a global timeout,
    /// which would also cut the push-stream.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Set the timeout of subscribe and unsubscribe calls.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<SseClient, Error> {
        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder()
                .user_agent(format!("sse-client/{}", env!("CARGO_PKG_VERSION")))
                .build()?,
        };

        let endpoint = Endpoint::new(&self.base_url);
        let id_store = self.store.unwrap_or_else(store::session_store);
        let client_id = store::load_or_create(id_store.as_ref(), &endpoint.storage_key());

        debug!(
            "SSE client {} for {}",
            client_id,
            endpoint.base_url()
        );

        Ok(SseClient {
            endpoint,
            client_id,
            http,
            request_timeout: self.request_timeout,
            connection: None,
            channels: ChannelTable::new(),
            listeners: EventListeners::new(),
        })
    }
}

/// Client of one channel server.
///
/// Holds at most one push-stream, the channel name to callback table and the
/// lifecycle listeners. Methods that talk to the server take `&mut self`, so
/// the calls of one client never overlap.
pub struct SseClient {
    endpoint: Endpoint,
    client_id: String,
    http: reqwest::Client,
    request_timeout: Duration,
    connection: Option<Connection>,
    channels: ChannelTable,
    listeners: EventListeners,
}

impl SseClient {
    /// Client with default settings for `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        ClientBuilder::new(base_url).build()
    }

    pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(base_url)
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn base_url(&self) -> &str {
        self.endpoint.base_url()
    }

    /// Whether a push-stream is open and still being read. Turns false once
    /// `ConnectionLost` has been emitted.
    pub fn is_connected(&self) -> bool {
        self.connection.as_ref().is_some_and(Connection::is_live)
    }

    pub fn is_subscribed(&self, channel: &str) -> bool {
        self.channels.contains(channel)
    }

    /// Names of the remembered channels, in no particular order.
    pub fn channels(&self) -> Vec<String> {
        self.channels.names()
    }

    /// Registers `listener` for a lifecycle event. Listeners run on the
    /// stream reader or inside `connect()`, and must not block.
    pub fn add_event_listener<F>(&self, event: ClientEvent, listener: F)
    where
        F: Fn(ClientEvent) + Send + Sync + 'static,
    {
        self.listeners.add(event, Arc::new(listener));
    }

    /// Opens the push-stream unless a live one is already held.
    ///
    /// A stream that was lost is replaced. Once open, every remembered channel
    /// is subscribed again and `Connect` is emitted. A stream that fails to
    /// open emits `ConnectionError` and leaves the client disconnected.
    pub async fn connect(&mut self) -> Result<(), Error> {
        match self.connection.take() {
            Some(connection) if connection.is_live() => {
                self.connection = Some(connection);
                return Ok(());
            }
            Some(_) => debug!("Push-stream of {} was lost, reopening", self.client_id),
            None => {}
        }

        let url = self.endpoint.stream_url(&self.client_id);
        let opened = Connection::open(
            &self.http,
            &url,
            self.channels.clone(),
            self.listeners.clone(),
        )
        .await;

        match opened {
            Ok(connection) => self.connection = Some(connection),
            Err(err) => {
                warn!("Unable to open push-stream at {url}: {err}");
                self.listeners.dispatch(ClientEvent::ConnectionError);
                return Err(err);
            }
        }

        self.renew_subscriptions().await;

        info!("SSE client {} connected", self.client_id);
        self.listeners.dispatch(ClientEvent::Connect);

        Ok(())
    }

    /// Closes the push-stream if open. Remembered channels are kept for the
    /// next `connect()`.
    pub fn disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close();
            info!("SSE client {} disconnected", self.client_id);
        }
    }

    /// Joins `channel` and routes its deliveries to `callback`.
    ///
    /// The callback is recorded only after the server accepted the call; a
    /// channel that already has a callback keeps it. Any failure returns
    /// false and leaves nothing behind.
    pub async fn subscribe<F>(&mut self, channel: &str, callback: F) -> bool
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        if let Err(err) = self.ask_for_subscription(channel).await {
            debug!("{err}");
            return false;
        }

        if !self.channels.insert(channel, Arc::new(callback)) {
            debug!("Channel '{channel}' already has a listener, keeping it");
        }

        true
    }

    /// Leaves `channel`. The channel stays remembered when the server does
    /// not answer 200.
    pub async fn unsubscribe(&mut self, channel: &str) -> Result<(), Error> {
        let url = self.endpoint.channel_url(&self.client_id, channel);
        let response = self
            .http
            .delete(url)
            .timeout(self.request_timeout)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            debug!(
                "Unsubscribe from '{channel}' answered {}",
                response.status()
            );
            return Err(Error::unsubscription(channel));
        }

        self.channels.remove(channel);
        Ok(())
    }

    async fn ask_for_subscription(&self, channel: &str) -> Result<(), Error> {
        let url = self.endpoint.channel_url(&self.client_id, channel);
        let response = self
            .http
            .post(url)
            .timeout(self.request_timeout)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            debug!(
                "Subscribe to '{channel}' answered {}",
                response.status()
            );
            return Err(Error::subscription(channel));
        }

        Ok(())
    }

    // One call at a time, each awaited before the next.
    async fn renew_subscriptions(&self) {
        for channel in self.channels.names() {
            if let Err(err) = self.ask_for_subscription(&channel).await {
                warn!("Renewing subscription failed: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConnectionErrorKind, ErrorKind};
    use crate::store::MemoryIdStore;
    use mockito::{Mock, Server, ServerGuard};
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn test_client(server: &ServerGuard) -> SseClient {
        SseClient::builder(server.url())
            .with_id_store(Arc::new(MemoryIdStore::new()))
            .build()
            .unwrap()
    }

    fn stream_path(client: &SseClient) -> String {
        format!("/__sse/{}", client.client_id())
    }

    fn channel_path(client: &SseClient, channel: &str) -> String {
        format!("/__sse/{}/channel/{}", client.client_id(), channel)
    }

    // Keeps the stream open with comments until the client goes away.
    async fn mock_stream(server: &mut ServerGuard, client: &SseClient, hits: usize) -> Mock {
        server
            .mock("GET", stream_path(client).as_str())
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_chunked_body(|w| loop {
                w.write_all(b": ping\n\n")?;
                std::thread::sleep(Duration::from_millis(50));
            })
            .expect(hits)
            .create_async()
            .await
    }

    // Answers 200 and ends the stream right away.
    async fn mock_ending_stream(server: &mut ServerGuard, client: &SseClient, hits: usize) -> Mock {
        server
            .mock("GET", stream_path(client).as_str())
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body("")
            .expect(hits)
            .create_async()
            .await
    }

    async fn wait_for(rx: &mut tokio::sync::mpsc::UnboundedReceiver<ClientEvent>) -> ClientEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap()
    }

    async fn mock_channel(
        server: &mut ServerGuard,
        client: &SseClient,
        method: &str,
        channel: &str,
        status: usize,
        hits: usize,
    ) -> Mock {
        server
            .mock(method, channel_path(client, channel).as_str())
            .with_status(status)
            .expect(hits)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_connect_twice_opens_one_stream() {
        let mut server = Server::new_async().await;
        let mut client = test_client(&server);
        let stream = mock_stream(&mut server, &client, 1).await;

        client.connect().await.unwrap();
        client.connect().await.unwrap();

        assert!(client.is_connected());
        stream.assert_async().await;
    }

    #[tokio::test]
    async fn test_connect_emits_connect_event() {
        let mut server = Server::new_async().await;
        let mut client = test_client(&server);
        let _stream = mock_stream(&mut server, &client, 1).await;

        let connects = Arc::new(AtomicUsize::new(0));
        let counter = connects.clone();
        client.add_event_listener(ClientEvent::Connect, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        client.connect().await.unwrap();
        client.connect().await.unwrap();

        assert_eq!(connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_connect_failure_rejects_and_emits_connection_error() {
        let mut server = Server::new_async().await;
        let mut client = test_client(&server);
        let _stream = server
            .mock("GET", stream_path(&client).as_str())
            .with_status(500)
            .create_async()
            .await;

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        client.add_event_listener(ClientEvent::ConnectionError, move |event| {
            sink.lock().unwrap().push(event);
        });

        let err = client.connect().await.unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::Connection(ConnectionErrorKind::UnexpectedStatus(500))
        );
        assert!(!client.is_connected());
        assert_eq!(*events.lock().unwrap(), vec![ClientEvent::ConnectionError]);
    }

    #[tokio::test]
    async fn test_connect_rejects_non_event_stream_body() {
        let mut server = Server::new_async().await;
        let mut client = test_client(&server);
        let _stream = server
            .mock("GET", stream_path(&client).as_str())
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html></html>")
            .create_async()
            .await;

        let err = client.connect().await.unwrap_err();

        assert!(matches!(
            err.error_kind,
            ErrorKind::Connection(ConnectionErrorKind::UnexpectedContentType(_))
        ));
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_ended_stream_emits_connection_lost() {
        let mut server = Server::new_async().await;
        let mut client = test_client(&server);
        let _stream = mock_ending_stream(&mut server, &client, 1).await;

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        client.add_event_listener(ClientEvent::ConnectionLost, move |event| {
            let _ = tx.send(event);
        });

        client.connect().await.unwrap();

        assert_eq!(wait_for(&mut rx).await, ClientEvent::ConnectionLost);
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_connect_after_connection_lost_reopens_and_renews() {
        let mut server = Server::new_async().await;
        let mut client = test_client(&server);
        let stream = mock_ending_stream(&mut server, &client, 2).await;
        let news = mock_channel(&mut server, &client, "POST", "news", 200, 2).await;

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        client.add_event_listener(ClientEvent::ConnectionLost, move |event| {
            let _ = tx.send(event);
        });
        let connects = Arc::new(AtomicUsize::new(0));
        let counter = connects.clone();
        client.add_event_listener(ClientEvent::Connect, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        client.connect().await.unwrap();
        assert!(client.subscribe("news", |_| {}).await);
        assert_eq!(wait_for(&mut rx).await, ClientEvent::ConnectionLost);

        client.connect().await.unwrap();

        assert_eq!(connects.load(Ordering::SeqCst), 2);
        assert!(client.is_subscribed("news"));
        stream.assert_async().await;
        news.assert_async().await;
    }

    #[tokio::test]
    async fn test_subscribe_failure_registers_nothing() {
        let mut server = Server::new_async().await;
        let mut client = test_client(&server);
        let _subscribe = mock_channel(&mut server, &client, "POST", "news", 404, 1).await;

        assert!(!client.subscribe("news", |_| {}).await);
        assert!(!client.is_subscribed("news"));
        assert!(client.channels().is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_network_failure_returns_false() {
        let mut client = SseClient::builder("127.0.0.1:1")
            .with_id_store(Arc::new(MemoryIdStore::new()))
            .with_request_timeout(Duration::from_secs(2))
            .build()
            .unwrap();

        assert!(!client.subscribe("news", |_| {}).await);
        assert!(!client.is_subscribed("news"));
    }

    #[tokio::test]
    async fn test_second_subscribe_keeps_first_callback() {
        let mut server = Server::new_async().await;
        let mut client = test_client(&server);
        let subscribe = mock_channel(&mut server, &client, "POST", "news", 200, 2).await;

        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let first_counter = first.clone();
        let second_counter = second.clone();

        assert!(
            client
                .subscribe("news", move |_| {
                    first_counter.fetch_add(1, Ordering::SeqCst);
                })
                .await
        );
        assert!(
            client
                .subscribe("news", move |_| {
                    second_counter.fetch_add(1, Ordering::SeqCst);
                })
                .await
        );

        client.channels.dispatch("news", "{}");

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
        assert_eq!(client.channels(), vec!["news".to_string()]);
        subscribe.assert_async().await;
    }

    #[tokio::test]
    async fn test_unsubscribe_failure_keeps_channel() {
        let mut server = Server::new_async().await;
        let mut client = test_client(&server);
        let _subscribe = mock_channel(&mut server, &client, "POST", "news", 200, 1).await;
        let _unsubscribe = mock_channel(&mut server, &client, "DELETE", "news", 404, 1).await;

        assert!(client.subscribe("news", |_| {}).await);
        let err = client.unsubscribe("news").await.unwrap_err();

        assert_eq!(err.error_kind, ErrorKind::Unsubscription("news".to_string()));
        assert_eq!(err.channel(), Some("news"));
        assert!(client.is_subscribed("news"));
    }

    #[tokio::test]
    async fn test_unsubscribe_success_forgets_channel() {
        let mut server = Server::new_async().await;
        let mut client = test_client(&server);
        let _subscribe = mock_channel(&mut server, &client, "POST", "news", 200, 1).await;
        let _unsubscribe = mock_channel(&mut server, &client, "DELETE", "news", 200, 1).await;

        assert!(client.subscribe("news", |_| {}).await);
        client.unsubscribe("news").await.unwrap();

        assert!(!client.is_subscribed("news"));
    }

    #[tokio::test]
    async fn test_reconnect_renews_every_remembered_channel() {
        let mut server = Server::new_async().await;
        let mut client = test_client(&server);
        let stream = mock_stream(&mut server, &client, 2).await;
        let news = mock_channel(&mut server, &client, "POST", "news", 200, 2).await;
        let sport = mock_channel(&mut server, &client, "POST", "sport", 200, 2).await;

        client.connect().await.unwrap();
        assert!(client.subscribe("news", |_| {}).await);
        assert!(client.subscribe("sport", |_| {}).await);

        client.disconnect();
        assert!(!client.is_connected());
        assert!(client.is_subscribed("news"));

        client.connect().await.unwrap();

        stream.assert_async().await;
        news.assert_async().await;
        sport.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_renewal_does_not_fail_connect() {
        let mut server = Server::new_async().await;
        let mut client = test_client(&server);
        let _stream = mock_stream(&mut server, &client, 2).await;
        let _first = mock_channel(&mut server, &client, "POST", "news", 200, 1).await;

        client.connect().await.unwrap();
        assert!(client.subscribe("news", |_| {}).await);
        client.disconnect();

        server.reset_async().await;
        let _stream = mock_stream(&mut server, &client, 1).await;
        let _refused = mock_channel(&mut server, &client, "POST", "news", 500, 1).await;

        client.connect().await.unwrap();
        assert!(client.is_connected());
        assert!(client.is_subscribed("news"));
    }

    #[test]
    fn test_client_id_is_shared_per_base_url() {
        let store: Arc<dyn IdStore> = Arc::new(MemoryIdStore::new());
        let build = |base: &str| {
            SseClient::builder(base)
                .with_id_store(store.clone())
                .build()
                .unwrap()
        };

        let first = build("localhost:4000");
        let again = build("localhost:4000");
        let other = build("localhost:5000");

        assert_eq!(first.client_id(), again.client_id());
        assert_ne!(first.client_id(), other.client_id());
        assert_eq!(
            store.get("sse-id-localhost:4000").as_deref(),
            Some(first.client_id())
        );
    }
}
