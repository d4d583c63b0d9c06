//! WebSocket upgrade handler.
//!
//! Browsers cannot set an Authorization header on a WebSocket upgrade,
//! so the access token travels as a query parameter and is verified
//! before the upgrade completes.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use taskhub_realtime::message::InboundMessage;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameter for WebSocket authentication.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// JWT access token.
    pub token: String,
}

/// GET /ws?token={jwt}
pub async fn ws_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    // Authenticate before upgrading; a bad token fails the HTTP
    // handshake instead of producing a socket that is closed instantly.
    let authenticated = state.session_manager.authenticate(&query.token).await?;

    Ok(ws.on_upgrade(move |socket| handle_socket(state, authenticated, socket)))
}

/// Pumps messages between the socket and the connection handle until
/// either side closes.
async fn handle_socket(
    state: AppState,
    authenticated: taskhub_auth::session::AuthenticatedRequest,
    socket: WebSocket,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (handle, mut outbound_rx) = state.realtime.register(
        authenticated.user.id,
        authenticated.claims.session_id(),
        authenticated.user.username.clone(),
    );
    let conn_id = handle.id;

    // Forward engine messages to the socket.
    let outbound_task = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "Failed to serialize outbound message");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Drain inbound messages.
    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<InboundMessage>(&text) {
                Ok(inbound) => {
                    if let Some(reply) = state.realtime.handle_inbound(&handle, inbound) {
                        handle.send(reply);
                    }
                }
                Err(e) => {
                    debug!(connection_id = %conn_id, error = %e, "Ignoring unparseable message");
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(connection_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    outbound_task.abort();
    state.realtime.unregister(&conn_id);

    info!(
        connection_id = %conn_id,
        user_id = %authenticated.user.id,
        "WebSocket connection closed"
    );
}
