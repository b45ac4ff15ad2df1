use crate::channel::{ChannelEvent, SignalChannel};
use anyhow::{Context, bail};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use huddle_core::{Address, ClientFrame, ServerFrame, SignalError, SignalKind};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

enum WsCommand {
    Frame(ClientFrame),
    Close,
}

/// WebSocket signaling channel to a huddle relay.
///
/// `connect` blocks until the relay's `Welcome` assigns this side its
/// address; every later frame (including `IceConfig`) arrives as a
/// `ChannelEvent` on the returned receiver. The reader task only forwards
/// events, so no handler can stall the socket.
pub struct WsChannel {
    address: Address,
    command_tx: mpsc::UnboundedSender<WsCommand>,
}

impl WsChannel {
    pub async fn connect(url: &str) -> anyhow::Result<(Self, mpsc::Receiver<ChannelEvent>)> {
        let (socket, _) = connect_async(url)
            .await
            .with_context(|| format!("failed to connect to relay at {url}"))?;
        let (mut sink, mut source) = socket.split();

        // The relay speaks first: Welcome carries our assigned address.
        let address = loop {
            let Some(msg) = source.next().await else {
                bail!("relay closed the connection before Welcome");
            };
            let Message::Text(text) = msg.context("websocket error before Welcome")? else {
                continue;
            };
            let frame: ServerFrame =
                serde_json::from_str(&text).context("invalid frame before Welcome")?;
            match frame {
                ServerFrame::Welcome { address } => break address,
                other => bail!("expected Welcome, relay sent {other:?}"),
            }
        };
        info!(%address, "signaling channel established");

        let (command_tx, mut command_rx) = mpsc::unbounded_channel::<WsCommand>();
        let (event_tx, event_rx) = mpsc::channel::<ChannelEvent>(64);

        tokio::spawn(async move {
            while let Some(cmd) = command_rx.recv().await {
                match cmd {
                    WsCommand::Frame(frame) => {
                        let json = match serde_json::to_string(&frame) {
                            Ok(json) => json,
                            Err(e) => {
                                warn!("failed to serialize client frame: {e}");
                                continue;
                            }
                        };
                        if sink.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    WsCommand::Close => {
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
        });

        tokio::spawn(async move {
            while let Some(Ok(msg)) = source.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ServerFrame>(&text) {
                        Ok(frame) => {
                            if event_tx.send(ChannelEvent::from_frame(frame)).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("invalid server frame: {e}"),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            debug!("signaling channel reader finished");
            let _ = event_tx.send(ChannelEvent::Disconnected).await;
        });

        Ok((
            Self {
                address,
                command_tx,
            },
            event_rx,
        ))
    }
}

#[async_trait]
impl SignalChannel for WsChannel {
    async fn relay(
        &self,
        kind: SignalKind,
        to: &Address,
        payload: &str,
    ) -> Result<(), SignalError> {
        let frame = ClientFrame::new(kind, to.clone(), payload.to_string());
        self.command_tx
            .send(WsCommand::Frame(frame))
            .map_err(|_| SignalError::ChannelClosed)
    }

    fn local_address(&self) -> Address {
        self.address.clone()
    }

    async fn close(&self) {
        let _ = self.command_tx.send(WsCommand::Close);
    }
}
