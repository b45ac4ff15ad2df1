use async_trait::async_trait;
use huddle_core::SignalError;
use std::sync::Arc;
use webrtc::track::track_local::TrackLocal;

/// Captured local tracks, ready to be attached to a peer connection.
/// Opaque to the negotiation engine.
pub struct LocalMedia {
    pub tracks: Vec<Arc<dyn TrackLocal + Send + Sync>>,
}

impl LocalMedia {
    pub fn empty() -> Self {
        Self { tracks: Vec::new() }
    }
}

/// Local capture seam.
///
/// Capture failure maps to `MediaAcquisitionFailed` and aborts the session
/// before any negotiation message is sent.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn capture(&self) -> Result<LocalMedia, SignalError>;
}

/// Media source for sessions that negotiate without sending local tracks.
pub struct NoMedia;

#[async_trait]
impl MediaSource for NoMedia {
    async fn capture(&self) -> Result<LocalMedia, SignalError> {
        Ok(LocalMedia::empty())
    }
}
