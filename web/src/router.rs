use crate::{controller::channel_controller, controller::health_check_controller, sse, AppState};
use axum::{
    routing::{get, post},
    Router,
};

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(sse_routes(app_state))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn sse_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/__sse/:client_id", get(sse::handler::sse_handler))
        .route(
            "/__sse/:client_id/channel/:channel",
            post(channel_controller::subscribe).delete(channel_controller::unsubscribe),
        )
        .with_state(app_state)
}
