mod ws;

pub use ws::WsChannel;

use async_trait::async_trait;
use huddle_core::{Address, IceServerConfig, ServerFrame, SignalError, SignalKind};

/// Events a signaling channel delivers to its owner.
///
/// Handlers must not block the channel's message loop; the session consumes
/// these from an mpsc receiver on its own task.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// The relay assigned this connection its address.
    Welcome { address: Address },
    /// STUN/TURN configuration pushed by the relay.
    IceConfig { ice_servers: Vec<IceServerConfig> },
    /// A routed signal from the counterpart.
    Signal { kind: SignalKind, payload: String },
    /// An earlier relay call from this side was rejected.
    RelayError { reason: String },
    /// The channel is gone; the address is no longer valid.
    Disconnected,
}

impl ChannelEvent {
    /// Translate a wire frame into a channel event.
    pub fn from_frame(frame: ServerFrame) -> ChannelEvent {
        match frame {
            ServerFrame::Welcome { address } => ChannelEvent::Welcome { address },
            ServerFrame::IceConfig { ice_servers } => ChannelEvent::IceConfig { ice_servers },
            ServerFrame::ReceiveOffer { payload } => ChannelEvent::Signal {
                kind: SignalKind::Offer,
                payload,
            },
            ServerFrame::ReceiveAnswer { payload } => ChannelEvent::Signal {
                kind: SignalKind::Answer,
                payload,
            },
            ServerFrame::ReceiveIceCandidate { payload } => ChannelEvent::Signal {
                kind: SignalKind::IceCandidate,
                payload,
            },
            ServerFrame::Error { reason } => ChannelEvent::RelayError { reason },
        }
    }
}

/// A bidirectional named-message channel to the relay.
///
/// Implementations hand out an `mpsc::Receiver<ChannelEvent>` at connect
/// time; sends are fire-and-forget with failures reported, never retried.
#[async_trait]
pub trait SignalChannel: Send + Sync {
    /// Relay one signal to the channel bound to `to`.
    async fn relay(&self, kind: SignalKind, to: &Address, payload: &str)
    -> Result<(), SignalError>;

    /// The relay-assigned address of this side.
    fn local_address(&self) -> Address;

    /// Close the channel. Idempotent.
    async fn close(&self);
}
