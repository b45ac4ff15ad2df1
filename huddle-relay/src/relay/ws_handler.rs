use crate::relay::RelayService;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures::{SinkExt, StreamExt};
use huddle_core::{Address, ClientFrame, ServerFrame};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub struct AppState {
    pub relay: RelayService,
}

pub fn router(relay: RelayService) -> Router {
    Router::new()
        .route("/signal", get(ws_handler))
        .with_state(Arc::new(AppState { relay }))
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let relay = state.relay.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, relay))
}

async fn handle_socket(socket: WebSocket, relay: RelayService) {
    // The relay assigns the address; clients learn theirs from Welcome.
    let address = Address::generate();
    info!(%address, "new signaling connection");

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerFrame>();

    relay.bind(address.clone(), tx.clone());

    let _ = tx.send(ServerFrame::Welcome {
        address: address.clone(),
    });
    let _ = tx.send(ServerFrame::IceConfig {
        ice_servers: relay.ice_servers(),
    });

    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            match serde_json::to_string(&frame) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!("failed to serialize server frame: {e}"),
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let relay = relay.clone();
        let address = address.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientFrame>(&text) {
                        Ok(frame) => {
                            let (kind, to, payload) = frame.into_parts();
                            if let Err(e) = relay.relay(kind, &to, &payload) {
                                warn!(%address, "relay rejected: {e}");
                                let _ = tx.send(ServerFrame::Error {
                                    reason: e.to_string(),
                                });
                            }
                        }
                        Err(e) => {
                            warn!(%address, "invalid client frame: {e}");
                            let _ = tx.send(ServerFrame::Error {
                                reason: format!("invalid frame: {e}"),
                            });
                        }
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    relay.unbind(&address);
    info!(%address, "signaling connection closed");
}
