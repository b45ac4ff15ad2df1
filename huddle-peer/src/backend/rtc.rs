use crate::backend::{DescriptionKind, PeerBackend, PeerEvent};
use crate::media::LocalMedia;
use anyhow::Result;
use async_trait::async_trait;
use huddle_core::{IceServerConfig, SignalError};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::track::track_remote::TrackRemote;

fn negotiation_err(e: impl std::fmt::Display) -> SignalError {
    SignalError::NegotiationFailed(e.to_string())
}

/// `PeerBackend` over the `webrtc` crate.
pub struct RtcBackend {
    peer_connection: Arc<RTCPeerConnection>,
}

impl RtcBackend {
    /// Build a peer connection and wire its callbacks into `event_tx`.
    /// Callbacks only forward events; nothing here blocks the media stack.
    pub async fn new(
        ice_servers: Vec<IceServerConfig>,
        event_tx: mpsc::Sender<PeerEvent>,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers
                .into_iter()
                .map(|s| RTCIceServer {
                    urls: s.urls,
                    username: s.username.unwrap_or_default(),
                    credential: s.credential.unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let state_tx = event_tx.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                Box::pin(async move {
                    info!("peer connection state changed: {s:?}");
                    match s {
                        RTCPeerConnectionState::Failed
                        | RTCPeerConnectionState::Disconnected
                        | RTCPeerConnectionState::Closed => {
                            let _ = tx.send(PeerEvent::Disconnected).await;
                        }
                        _ => {}
                    }
                })
            },
        ));

        let ice_tx = event_tx.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(json_candidate) = candidate.to_json() else {
                    return;
                };
                let Ok(str_candidate) = serde_json::to_string(&json_candidate) else {
                    return;
                };
                let _ = tx.send(PeerEvent::CandidateDiscovered(str_candidate)).await;
            })
        }));

        let track_tx = event_tx.clone();
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();
                Box::pin(async move {
                    debug!("remote track available: {}", track.id());
                    let _ = tx.send(PeerEvent::RemoteMedia(track.id())).await;
                })
            },
        ));

        Ok(Self { peer_connection })
    }

    fn description(kind: DescriptionKind, sdp: &str) -> Result<RTCSessionDescription, SignalError> {
        match kind {
            DescriptionKind::Offer => RTCSessionDescription::offer(sdp.to_string()),
            DescriptionKind::Answer => RTCSessionDescription::answer(sdp.to_string()),
        }
        .map_err(negotiation_err)
    }
}

#[async_trait]
impl PeerBackend for RtcBackend {
    async fn add_media(&self, media: LocalMedia) -> Result<(), SignalError> {
        for track in media.tracks {
            self.peer_connection
                .add_track(track)
                .await
                .map_err(negotiation_err)?;
        }
        Ok(())
    }

    async fn create_offer(&self) -> Result<String, SignalError> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .map_err(negotiation_err)?;
        Ok(offer.sdp)
    }

    async fn create_answer(&self) -> Result<String, SignalError> {
        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .map_err(negotiation_err)?;
        Ok(answer.sdp)
    }

    async fn set_local_description(
        &self,
        kind: DescriptionKind,
        sdp: &str,
    ) -> Result<(), SignalError> {
        let desc = Self::description(kind, sdp)?;
        self.peer_connection
            .set_local_description(desc)
            .await
            .map_err(negotiation_err)
    }

    async fn set_remote_description(
        &self,
        kind: DescriptionKind,
        sdp: &str,
    ) -> Result<(), SignalError> {
        let desc = Self::description(kind, sdp)?;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .map_err(negotiation_err)
    }

    async fn add_ice_candidate(&self, candidate: &str) -> Result<(), SignalError> {
        let init: RTCIceCandidateInit = serde_json::from_str(candidate)
            .map_err(|_| SignalError::NegotiationFailed("invalid ICE candidate JSON".into()))?;
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .map_err(negotiation_err)
    }

    async fn close(&self) -> Result<(), SignalError> {
        self.peer_connection.close().await.map_err(negotiation_err)
    }
}
