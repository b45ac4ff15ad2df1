mod rtc;

pub use rtc::RtcBackend;

use crate::media::LocalMedia;
use async_trait::async_trait;
use huddle_core::SignalError;

/// Which side of the offer/answer pair a description blob is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionKind {
    Offer,
    Answer,
}

/// Events a peer-connection backend emits while negotiating.
#[derive(Debug, Clone)]
pub enum PeerEvent {
    /// The local network discovered a viable path. Relayed immediately,
    /// regardless of signaling state.
    CandidateDiscovered(String),
    /// Remote media became available (track id).
    RemoteMedia(String),
    /// The underlying connection failed or closed.
    Disconnected,
}

/// The peer-connection collaborator, consumed but never implemented by the
/// negotiation engine. All operations are opaque and may fail; failures
/// surface as `NegotiationFailed`.
#[async_trait]
pub trait PeerBackend: Send {
    async fn add_media(&self, media: LocalMedia) -> Result<(), SignalError>;
    async fn create_offer(&self) -> Result<String, SignalError>;
    async fn create_answer(&self) -> Result<String, SignalError>;
    async fn set_local_description(
        &self,
        kind: DescriptionKind,
        sdp: &str,
    ) -> Result<(), SignalError>;
    async fn set_remote_description(
        &self,
        kind: DescriptionKind,
        sdp: &str,
    ) -> Result<(), SignalError>;
    async fn add_ice_candidate(&self, candidate: &str) -> Result<(), SignalError>;
    /// Release the connection and everything it holds, including local
    /// capture tracks. Idempotent.
    async fn close(&self) -> Result<(), SignalError>;
}
