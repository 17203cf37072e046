use axum::http::{HeaderValue, Method};
use axum::Router;
use log::*;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub use service::AppState;

mod controller;
pub mod error;
pub mod router;
mod sse;

/// Full application: routes plus the CORS layer for the configured origins.
pub fn app(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state.config.allowed_origins);
    router::define_routes(app_state).layer(cors)
}

/// Binds the configured interface and port and serves until the process ends.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let address = app_state.config.listen_address();
    let listener = TcpListener::bind(&address).await?;

    info!("Server starting... listening for connections on http://{address}");

    serve(listener, app_state).await
}

/// Serves on an already bound listener.
pub async fn serve(listener: TcpListener, app_state: AppState) -> std::io::Result<()> {
    axum::serve(listener, app(app_state)).await
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {origin}: {e}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
}
