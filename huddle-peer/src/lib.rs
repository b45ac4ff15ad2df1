pub mod backend;
pub mod channel;
pub mod media;
pub mod session;

pub use huddle_core::{Address, SignalError, SignalKind};

pub use backend::{DescriptionKind, PeerBackend, PeerEvent, RtcBackend};
pub use channel::{ChannelEvent, SignalChannel, WsChannel};
pub use media::{LocalMedia, MediaSource, NoMedia};
pub use session::{ApplyOutcome, MAX_QUEUED_CANDIDATES, NegotiationRole, Session, SignalingState};
