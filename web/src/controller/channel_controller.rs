use crate::error::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use log::*;
use service::AppState;
use sse::{ClientId, SubscribeOutcome};

/// POST /__sse/:client_id/channel/:channel
///
/// Joins a channel. Joining twice is still a success.
pub async fn subscribe(
    State(app_state): State<AppState>,
    Path((client_id, channel)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    debug!("POST subscribe client {client_id} to '{channel}'");

    let outcome = app_state
        .sse_manager
        .subscribe(&ClientId::new(client_id), &channel)
        .await?;

    let body = match outcome {
        SubscribeOutcome::Subscribed => "",
        SubscribeOutcome::AlreadySubscribed => "Already subscribed to this channel",
    };

    Ok((StatusCode::OK, body))
}

/// DELETE /__sse/:client_id/channel/:channel
pub async fn unsubscribe(
    State(app_state): State<AppState>,
    Path((client_id, channel)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    debug!("DELETE subscription of client {client_id} to '{channel}'");

    app_state
        .sse_manager
        .unsubscribe(&ClientId::new(client_id), &channel)
        .await?;

    Ok((StatusCode::OK, ""))
}
