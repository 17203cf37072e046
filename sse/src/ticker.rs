use crate::manager::Manager;
use log::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Emits `{"tick": n}` on `channel` every `period`, starting at 1.
///
/// Gives a bare server something to deliver. Runs until the handle is aborted.
pub fn spawn_ticker(manager: Arc<Manager>, channel: String, period: Duration) -> JoinHandle<()> {
    info!("Emitting ticks on '{}' every {:?}", channel, period);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick of an interval completes immediately.
        interval.tick().await;

        let mut tick: u64 = 0;
        loop {
            interval.tick().await;
            tick += 1;

            match manager.emit(&channel, &json!({ "tick": tick })) {
                Ok(delivered) => trace!("Tick {} reached {} stream(s)", tick, delivered),
                Err(e) => warn!("Tick {} on '{}' failed: {}", tick, channel, e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ClientId;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_ticker_reaches_channel_members() {
        let manager = Arc::new(Manager::new());
        let client = ClientId::from("abc");
        let (tx, mut rx) = mpsc::unbounded_channel();
        manager.register_stream(client.clone(), tx).await;
        manager.subscribe(&client, "clock").await.unwrap();

        let ticker = spawn_ticker(manager.clone(), "clock".to_string(), Duration::from_millis(10));

        let first = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        ticker.abort();

        assert!(matches!(first, Ok(Some(Ok(_)))));
    }

    #[tokio::test]
    async fn test_ticker_without_members_keeps_running() {
        let manager = Arc::new(Manager::new());
        let ticker = spawn_ticker(manager, "clock".to_string(), Duration::from_millis(5));

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(!ticker.is_finished());
        ticker.abort();
    }
}
