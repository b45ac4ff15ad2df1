use crate::backend::{DescriptionKind, PeerBackend, PeerEvent};
use crate::channel::{ChannelEvent, SignalChannel};
use crate::media::MediaSource;
use crate::session::state::{ApplyOutcome, NegotiationRole, SignalingState};
use huddle_core::{Address, SignalError, SignalKind};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Upper bound on candidates held before the remote description is set.
/// A well-behaved peer produces far fewer; overflow means the sender is
/// misbehaving and the newest candidate is dropped with a warning.
pub const MAX_QUEUED_CANDIDATES: usize = 128;

/// One negotiation session: the per-peer state machine that drives a
/// `PeerBackend` through the offer/answer/candidate exchange over a
/// `SignalChannel`.
///
/// A session exclusively owns its signaling state and candidate queue and
/// processes all events on one task, which is what makes "apply the remote
/// description, then drain queued candidates in arrival order" atomic with
/// respect to candidates arriving mid-drain: they are simply the next
/// event in the loop.
pub struct Session<C: SignalChannel> {
    role: NegotiationRole,
    state: SignalingState,
    remote: Address,
    channel: Arc<C>,
    backend: Box<dyn PeerBackend>,
    channel_rx: mpsc::Receiver<ChannelEvent>,
    backend_rx: mpsc::Receiver<PeerEvent>,
    queued_candidates: VecDeque<String>,
    remote_description_set: bool,
}

impl<C: SignalChannel> std::fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("role", &self.role)
            .field("state", &self.state)
            .field("remote", &self.remote)
            .field("queued_candidates", &self.queued_candidates.len())
            .field("remote_description_set", &self.remote_description_set)
            .finish_non_exhaustive()
    }
}

impl<C: SignalChannel> Session<C> {
    /// Start as the initiator: capture media, attach it, commit a local
    /// offer and relay it to `remote`.
    ///
    /// Fails with `MediaAcquisitionFailed` before anything is sent if
    /// capture cannot start. On any failure the backend is torn down
    /// before the error is returned.
    pub async fn start(
        channel: Arc<C>,
        channel_rx: mpsc::Receiver<ChannelEvent>,
        backend: Box<dyn PeerBackend>,
        backend_rx: mpsc::Receiver<PeerEvent>,
        remote: Address,
        media: &dyn MediaSource,
    ) -> Result<Self, SignalError> {
        let mut session = Self::new(
            NegotiationRole::Initiator,
            channel,
            channel_rx,
            backend,
            backend_rx,
            remote,
        );
        if let Err(e) = session.bootstrap(media).await {
            session.teardown().await;
            return Err(e);
        }
        Ok(session)
    }

    /// Join as the responder: capture media, attach it, and wait in `Idle`
    /// for the initiator's offer.
    pub async fn join(
        channel: Arc<C>,
        channel_rx: mpsc::Receiver<ChannelEvent>,
        backend: Box<dyn PeerBackend>,
        backend_rx: mpsc::Receiver<PeerEvent>,
        remote: Address,
        media: &dyn MediaSource,
    ) -> Result<Self, SignalError> {
        let mut session = Self::new(
            NegotiationRole::Responder,
            channel,
            channel_rx,
            backend,
            backend_rx,
            remote,
        );
        if let Err(e) = session.bootstrap(media).await {
            session.teardown().await;
            return Err(e);
        }
        Ok(session)
    }

    fn new(
        role: NegotiationRole,
        channel: Arc<C>,
        channel_rx: mpsc::Receiver<ChannelEvent>,
        backend: Box<dyn PeerBackend>,
        backend_rx: mpsc::Receiver<PeerEvent>,
        remote: Address,
    ) -> Self {
        Self {
            role,
            state: SignalingState::Idle,
            remote,
            channel,
            backend,
            channel_rx,
            backend_rx,
            queued_candidates: VecDeque::new(),
            remote_description_set: false,
        }
    }

    async fn bootstrap(&mut self, media: &dyn MediaSource) -> Result<(), SignalError> {
        let local_media = media.capture().await?;
        self.backend.add_media(local_media).await?;

        if self.role == NegotiationRole::Initiator {
            let offer = self.backend.create_offer().await?;
            self.backend
                .set_local_description(DescriptionKind::Offer, &offer)
                .await?;
            self.state = SignalingState::HaveLocalOffer;
            info!(remote = %self.remote, "local offer committed, relaying");
            self.channel
                .relay(SignalKind::Offer, &self.remote, &offer)
                .await?;
        }
        Ok(())
    }

    pub fn role(&self) -> NegotiationRole {
        self.role
    }

    pub fn state(&self) -> SignalingState {
        self.state
    }

    pub fn remote(&self) -> &Address {
        &self.remote
    }

    pub fn queued_candidates(&self) -> usize {
        self.queued_candidates.len()
    }

    /// The channel's event stream, for callers embedding their own loop
    /// instead of `run`.
    pub fn channel_events(&mut self) -> &mut mpsc::Receiver<ChannelEvent> {
        &mut self.channel_rx
    }

    /// The backend's event stream, for callers embedding their own loop.
    pub fn backend_events(&mut self) -> &mut mpsc::Receiver<PeerEvent> {
        &mut self.backend_rx
    }

    /// Apply the counterpart's offer (responder only, legal in `Idle`).
    ///
    /// Commits it as the remote description, answers, relays the answer,
    /// reaches `Stable` and drains the candidate queue. A failure at any
    /// commit step is `NegotiationFailed` and leaves the session
    /// unrecoverable; the caller restarts with a fresh session.
    pub async fn apply_remote_offer(&mut self, sdp: &str) -> Result<ApplyOutcome, SignalError> {
        if self.role != NegotiationRole::Responder || self.state != SignalingState::Idle {
            warn!(
                role = ?self.role,
                state = ?self.state,
                "discarding offer received out of state"
            );
            return Ok(ApplyOutcome::DiscardedOutOfState);
        }

        self.backend
            .set_remote_description(DescriptionKind::Offer, sdp)
            .await?;
        self.remote_description_set = true;
        self.state = SignalingState::HaveRemoteOffer;

        let answer = self.backend.create_answer().await?;
        self.backend
            .set_local_description(DescriptionKind::Answer, &answer)
            .await?;
        self.channel
            .relay(SignalKind::Answer, &self.remote, &answer)
            .await?;
        self.state = SignalingState::Stable;
        info!(remote = %self.remote, "answer relayed, session stable");

        self.drain_candidates().await;
        Ok(ApplyOutcome::Applied)
    }

    /// Apply the counterpart's answer (initiator only, legal in
    /// `HaveLocalOffer`).
    ///
    /// On failure the state stays `HaveLocalOffer`; there is no automatic
    /// retry, a fresh offer requires a fresh session.
    pub async fn apply_remote_answer(&mut self, sdp: &str) -> Result<ApplyOutcome, SignalError> {
        if self.role != NegotiationRole::Initiator || self.state != SignalingState::HaveLocalOffer {
            warn!(
                role = ?self.role,
                state = ?self.state,
                "discarding answer received out of state"
            );
            return Ok(ApplyOutcome::DiscardedOutOfState);
        }

        self.backend
            .set_remote_description(DescriptionKind::Answer, sdp)
            .await?;
        self.remote_description_set = true;
        self.state = SignalingState::Stable;
        info!(remote = %self.remote, "answer applied, session stable");

        self.drain_candidates().await;
        Ok(ApplyOutcome::Applied)
    }

    /// Apply or queue a remote candidate.
    ///
    /// Queued while the remote description is unset, applied immediately
    /// afterwards (including after `Stable`). Backend rejections are
    /// logged and swallowed: late or duplicate candidates are expected
    /// and harmless to drop.
    pub async fn apply_remote_candidate(&mut self, candidate: &str) -> ApplyOutcome {
        if !self.remote_description_set {
            if self.queued_candidates.len() >= MAX_QUEUED_CANDIDATES {
                warn!("candidate queue full, dropping candidate");
                return ApplyOutcome::DroppedQueueFull;
            }
            debug!("queueing candidate until remote description is set");
            self.queued_candidates.push_back(candidate.to_string());
            return ApplyOutcome::Queued;
        }

        if let Err(e) = self.backend.add_ice_candidate(candidate).await {
            debug!("dropping candidate the backend rejected: {e}");
        }
        ApplyOutcome::Applied
    }

    /// Relay a locally discovered candidate. Legal in any state; the
    /// receiver is responsible for queueing. Delivery failure is reported
    /// in logs and never retried.
    pub async fn relay_local_candidate(&mut self, candidate: &str) {
        if let Err(e) = self
            .channel
            .relay(SignalKind::IceCandidate, &self.remote, candidate)
            .await
        {
            warn!(remote = %self.remote, "failed to relay local candidate: {e}");
        }
    }

    async fn drain_candidates(&mut self) {
        if self.queued_candidates.is_empty() {
            return;
        }
        info!(
            count = self.queued_candidates.len(),
            "applying candidates queued before the remote description"
        );
        while let Some(candidate) = self.queued_candidates.pop_front() {
            if let Err(e) = self.backend.add_ice_candidate(&candidate).await {
                warn!("queued candidate rejected: {e}");
            }
        }
    }

    /// Dispatch one channel event.
    pub async fn handle_channel_event(&mut self, event: ChannelEvent) -> Result<(), SignalError> {
        match event {
            ChannelEvent::Signal {
                kind: SignalKind::Offer,
                payload,
            } => {
                self.apply_remote_offer(&payload).await?;
            }
            ChannelEvent::Signal {
                kind: SignalKind::Answer,
                payload,
            } => {
                self.apply_remote_answer(&payload).await?;
            }
            ChannelEvent::Signal {
                kind: SignalKind::IceCandidate,
                payload,
            } => {
                self.apply_remote_candidate(&payload).await;
            }
            ChannelEvent::RelayError { reason } => {
                // Reported once; restarting is the caller's decision.
                warn!(remote = %self.remote, "relay reported failure: {reason}");
            }
            ChannelEvent::IceConfig { ice_servers } => {
                debug!(
                    count = ice_servers.len(),
                    "ignoring ICE config received mid-session"
                );
            }
            ChannelEvent::Welcome { address } => {
                debug!(%address, "ignoring duplicate welcome");
            }
            ChannelEvent::Disconnected => return Err(SignalError::ChannelClosed),
        }
        Ok(())
    }

    /// Dispatch one backend event. Returns false when the connection is
    /// gone and the loop should stop.
    pub async fn handle_peer_event(&mut self, event: PeerEvent) -> bool {
        match event {
            PeerEvent::CandidateDiscovered(candidate) => {
                self.relay_local_candidate(&candidate).await;
                true
            }
            PeerEvent::RemoteMedia(track_id) => {
                info!(%track_id, "remote media available");
                true
            }
            PeerEvent::Disconnected => {
                info!(remote = %self.remote, "peer connection closed");
                false
            }
        }
    }

    /// Drive the session until the peer connection or the channel goes
    /// away, then tear down. Teardown runs on every exit path, error
    /// exits included.
    pub async fn run(mut self) -> Result<(), SignalError> {
        let outcome = self.drive().await;
        self.teardown().await;
        outcome
    }

    async fn drive(&mut self) -> Result<(), SignalError> {
        loop {
            tokio::select! {
                event = self.channel_rx.recv() => {
                    match event {
                        Some(event) => self.handle_channel_event(event).await?,
                        None => return Err(SignalError::ChannelClosed),
                    }
                }
                event = self.backend_rx.recv() => {
                    match event {
                        Some(event) => {
                            if !self.handle_peer_event(event).await {
                                return Ok(());
                            }
                        }
                        None => return Ok(()),
                    }
                }
            }
        }
    }

    /// Leave the session: release the peer connection (stopping local
    /// capture) before closing the channel.
    pub async fn leave(mut self) {
        self.teardown().await;
    }

    async fn teardown(&mut self) {
        if let Err(e) = self.backend.close().await {
            warn!("error closing peer connection: {e}");
        }
        self.channel.close().await;
        debug!(remote = %self.remote, "session torn down");
    }
}
