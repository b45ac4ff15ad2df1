use crate::integration::init_tracing;
use crate::utils::{FakeBackend, FakeCall, FakeMedia, MemoryHub};
use huddle_peer::{
    ChannelEvent, DescriptionKind, NegotiationRole, PeerEvent, Session, SignalKind, SignalingState,
};
use tokio::sync::mpsc;

#[tokio::test]
async fn test_full_offer_answer_convergence() {
    init_tracing();
    let hub = MemoryHub::new();

    let (chan_a, rx_a, addr_a) = hub.connect();
    let (chan_b, rx_b, addr_b) = hub.connect();

    let (backend_a, handle_a) = FakeBackend::new("sdp-A");
    let (backend_b, handle_b) = FakeBackend::new("sdp-B");
    let (_pe_a_tx, pe_a_rx) = mpsc::channel::<PeerEvent>(16);
    let (_pe_b_tx, pe_b_rx) = mpsc::channel::<PeerEvent>(16);

    // Responder joins first and waits in Idle.
    let mut responder = Session::join(
        chan_b,
        rx_b,
        backend_b,
        pe_b_rx,
        addr_a.clone(),
        &FakeMedia::ok(),
    )
    .await
    .expect("join failed");
    assert_eq!(responder.role(), NegotiationRole::Responder);
    assert_eq!(responder.state(), SignalingState::Idle);

    // Initiator starts: commits a local offer and relays it to B.
    let mut initiator = Session::start(
        chan_a,
        rx_a,
        backend_a,
        pe_a_rx,
        addr_b.clone(),
        &FakeMedia::ok(),
    )
    .await
    .expect("start failed");
    assert_eq!(initiator.state(), SignalingState::HaveLocalOffer);
    assert!(
        handle_a
            .calls()
            .contains(&FakeCall::SetLocal(DescriptionKind::Offer, "sdp-A".into()))
    );

    // Responder receives the offer: Idle -> HaveRemoteOffer -> Stable,
    // answer relayed back.
    let event = responder.channel_events().recv().await.expect("no offer");
    assert!(matches!(
        &event,
        ChannelEvent::Signal { kind: SignalKind::Offer, payload } if payload == "sdp-A"
    ));
    responder.handle_channel_event(event).await.expect("offer apply failed");
    assert_eq!(responder.state(), SignalingState::Stable);
    assert_eq!(
        handle_b.remote_descriptions(),
        vec![(DescriptionKind::Offer, "sdp-A".to_string())]
    );
    assert!(
        handle_b
            .calls()
            .contains(&FakeCall::SetLocal(DescriptionKind::Answer, "sdp-B".into()))
    );

    // Initiator receives the answer: HaveLocalOffer -> Stable.
    let event = initiator.channel_events().recv().await.expect("no answer");
    assert!(matches!(
        &event,
        ChannelEvent::Signal { kind: SignalKind::Answer, payload } if payload == "sdp-B"
    ));
    initiator.handle_channel_event(event).await.expect("answer apply failed");
    assert_eq!(initiator.state(), SignalingState::Stable);
    assert_eq!(
        handle_a.remote_descriptions(),
        vec![(DescriptionKind::Answer, "sdp-B".to_string())]
    );
}

#[tokio::test]
async fn test_locally_discovered_candidate_is_relayed_immediately() {
    init_tracing();
    let hub = MemoryHub::new();

    let (chan_a, rx_a, _) = hub.connect();
    let (_chan_b, mut rx_b, addr_b) = hub.connect();

    let (backend_a, _handle_a) = FakeBackend::new("sdp-A");
    let (_pe_tx, pe_rx) = mpsc::channel::<PeerEvent>(16);

    let mut initiator = Session::start(chan_a, rx_a, backend_a, pe_rx, addr_b, &FakeMedia::ok())
        .await
        .expect("start failed");

    // Candidates go out in any state; the receiver is the one that queues.
    assert_eq!(initiator.state(), SignalingState::HaveLocalOffer);
    let keep_going = initiator
        .handle_peer_event(PeerEvent::CandidateDiscovered("cand-early".into()))
        .await;
    assert!(keep_going);

    // B's stream sees the offer first, then the candidate.
    let event = rx_b.recv().await.expect("no offer");
    assert!(matches!(event, ChannelEvent::Signal { kind: SignalKind::Offer, .. }));
    let event = rx_b.recv().await.expect("no candidate");
    assert!(matches!(
        &event,
        ChannelEvent::Signal { kind: SignalKind::IceCandidate, payload } if payload == "cand-early"
    ));
}
