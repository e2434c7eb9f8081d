use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use serde::Serialize;

use crate::state::AppState;

/// `GET /ws/items` — WebSocket change-event stream.
///
/// Upgrades the HTTP connection, registers it with the connection
/// registry, and pushes every change event as a JSON text frame. Incoming
/// well-formed JSON frames are echoed back; malformed ones get an error
/// frame. The subscriber stays registered until it disconnects or a send
/// to it fails.
pub(super) async fn items_ws(state: State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let app_state = state.0.clone();
    ws.on_upgrade(move |socket| handle_items_ws(socket, app_state))
}

/// Client-bound frames other than the change-event broadcasts.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsServerMessage {
    /// Acknowledgement sent right after the upgrade.
    Connection { message: &'static str },
    /// Echo of a well-formed JSON frame received from the client.
    Echo { original_message: serde_json::Value },
    /// The client sent a frame that is not valid JSON.
    Error { message: &'static str },
}

/// Background task that drives a single WebSocket connection.
///
/// 1. Registers with the connection registry and acknowledges the client.
/// 2. Forwards broadcast frames from the registry channel to the socket.
/// 3. Echoes client messages (or reports malformed JSON) until disconnect.
/// 4. Unregisters on any exit path.
async fn handle_items_ws(mut socket: WebSocket, state: AppState) {
    let (conn_id, mut broadcast_rx) = state.registry.register().await;

    let hello = WsServerMessage::Connection {
        message: "connected; currency rate change events will follow",
    };
    if send_json(&mut socket, &hello).await.is_err() {
        state.registry.unregister(conn_id).await;
        return;
    }

    loop {
        tokio::select! {
            frame = broadcast_rx.recv() => {
                match frame {
                    Some(text) => {
                        if socket.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    // Our sender half was pruned after a failed delivery.
                    None => break,
                }
            }

            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = match serde_json::from_str::<serde_json::Value>(&text) {
                            Ok(value) => {
                                tracing::debug!(connection = ?conn_id, "WS message from client");
                                WsServerMessage::Echo {
                                    original_message: value,
                                }
                            }
                            Err(_) => WsServerMessage::Error {
                                message: "invalid JSON",
                            },
                        };
                        if send_json(&mut socket, &reply).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }

    state.registry.unregister(conn_id).await;
}

/// Serialize `value` as JSON and send it as a text WebSocket frame.
///
/// Returns `Err(())` if the send fails (client disconnected).
async fn send_json<T: serde::Serialize>(socket: &mut WebSocket, value: &T) -> Result<(), ()> {
    let json = serde_json::to_string(value).map_err(|_| ())?;
    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_frames_are_tagged_by_type() {
        let echo = WsServerMessage::Echo {
            original_message: serde_json::json!({"ping": 1}),
        };
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["type"], "echo");
        assert_eq!(json["original_message"]["ping"], 1);

        let error = WsServerMessage::Error {
            message: "invalid JSON",
        };
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["type"], "error");
    }
}
