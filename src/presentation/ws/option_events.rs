use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, header};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::application::dto::events::NewOptionEventLog;
use crate::application::errors::ApiError;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth;
use crate::presentation::http::error::ApiHttpError;
use crate::presentation::http::event_logs::save_option;

#[derive(Debug, Deserialize, Clone)]
pub struct AuthQuery {
    pub token: Option<String>,
}

#[utoipa::path(
    get,
    path = "/ws/option-event",
    params(
        ("token" = Option<String>, Query, description = "JWT"),
        ("Authorization" = Option<String>, Header, description = "Bearer token")
    ),
    responses(
        (status = 101, description = "Switching Protocols (WebSocket upgrade)"),
        (status = 401, body = ApiHttpError)
    ),
    tag = "Event logs"
)]
pub async fn option_event_socket(
    ws: WebSocketUpgrade,
    Query(query): Query<AuthQuery>,
    headers: HeaderMap,
    State(ctx): State<AppContext>,
) -> Result<impl IntoResponse, ApiError> {
    let token = query
        .token
        .filter(|t| !t.is_empty())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
                .map(str::to_string)
        })
        .or_else(|| auth::cookie_token(&headers))
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".into()))?;
    let user = auth::authenticate(&ctx, &token).await?;

    Ok(ws.on_upgrade(move |socket| peer(socket, ctx, user.id)))
}

async fn peer(socket: WebSocket, ctx: AppContext, user_id: u32) {
    tracing::debug!(user_id, "option_socket_opened");
    let (mut sink, mut stream) = socket.split();
    while let Some(msg) = stream.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(user_id, error = %e, "option_socket_read_failed");
                break;
            }
        };
        if let Some(reply) = handle_frame(&ctx, user_id, &text).await {
            if let Err(e) = sink.send(Message::Text(reply)).await {
                tracing::debug!(user_id, error = %e, "option_socket_write_failed");
                break;
            }
        }
    }
    tracing::debug!(user_id, "option_socket_closed");
}

/// Stores one frame. Returns the error frame to answer with, if any.
async fn handle_frame(ctx: &AppContext, user_id: u32, text: &str) -> Option<String> {
    let result = match serde_json::from_str::<NewOptionEventLog>(text) {
        Ok(req) => save_option(ctx, user_id, &req).await,
        Err(_) => Err(ApiError::invalid("Invalid request body", Vec::new())),
    };
    let err = result.err()?;
    let body = ApiHttpError::from(&err);
    match serde_json::to_string(&body) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::error!(error = ?e, "option_socket_encode_failed");
            None
        }
    }
}
