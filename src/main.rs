use events::EventPublisher;
use log::*;
use service::{config::Config, logging::Logger, AppState};
use sse::{lifecycle::LoggingEventHandler, ticker, Manager};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();

    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logger: {e}");
        std::process::exit(1);
    }

    info!(
        "Starting SSE channel server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let publisher = EventPublisher::new().with_handler(Arc::new(LoggingEventHandler));
    let sse_manager = Arc::new(Manager::with_publisher(publisher));

    if let Some(channel) = config.tick_channel.clone() {
        ticker::spawn_ticker(sse_manager.clone(), channel, config.tick_interval());
    }

    let app_state = AppState::new(config, &sse_manager);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped: {e}");
        std::process::exit(1);
    }
}
