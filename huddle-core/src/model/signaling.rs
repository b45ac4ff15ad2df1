use crate::model::address::Address;
use serde::{Deserialize, Serialize};

/// The three signal kinds the relay routes. Payloads are opaque blobs owned
/// by the peer-connection layer; the kind alone selects the delivery event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
}

impl SignalKind {
    /// Event name delivered to the destination channel.
    pub fn event_name(&self) -> &'static str {
        match self {
            SignalKind::Offer => "ReceiveOffer",
            SignalKind::Answer => "ReceiveAnswer",
            SignalKind::IceCandidate => "ReceiveIceCandidate",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// Frames a client sends to the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ClientFrame {
    Offer { to: Address, payload: String },
    Answer { to: Address, payload: String },
    IceCandidate { to: Address, payload: String },
}

impl ClientFrame {
    pub fn new(kind: SignalKind, to: Address, payload: String) -> Self {
        match kind {
            SignalKind::Offer => ClientFrame::Offer { to, payload },
            SignalKind::Answer => ClientFrame::Answer { to, payload },
            SignalKind::IceCandidate => ClientFrame::IceCandidate { to, payload },
        }
    }

    pub fn kind(&self) -> SignalKind {
        match self {
            ClientFrame::Offer { .. } => SignalKind::Offer,
            ClientFrame::Answer { .. } => SignalKind::Answer,
            ClientFrame::IceCandidate { .. } => SignalKind::IceCandidate,
        }
    }

    pub fn into_parts(self) -> (SignalKind, Address, String) {
        match self {
            ClientFrame::Offer { to, payload } => (SignalKind::Offer, to, payload),
            ClientFrame::Answer { to, payload } => (SignalKind::Answer, to, payload),
            ClientFrame::IceCandidate { to, payload } => (SignalKind::IceCandidate, to, payload),
        }
    }
}

/// Frames the relay sends to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ServerFrame {
    Welcome {
        address: Address,
    },
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    ReceiveOffer {
        payload: String,
    },
    ReceiveAnswer {
        payload: String,
    },
    ReceiveIceCandidate {
        payload: String,
    },
    /// A relay call from this client was rejected. Reported once, never
    /// retried.
    Error {
        reason: String,
    },
}

impl ServerFrame {
    /// The delivery frame for a routed signal.
    pub fn signal(kind: SignalKind, payload: String) -> Self {
        match kind {
            SignalKind::Offer => ServerFrame::ReceiveOffer { payload },
            SignalKind::Answer => ServerFrame::ReceiveAnswer { payload },
            SignalKind::IceCandidate => ServerFrame::ReceiveIceCandidate { payload },
        }
    }
}
