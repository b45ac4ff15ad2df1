use crate::integration::init_tracing;
use crate::utils::{FakeBackend, FakeMedia, MemoryHub};
use huddle_peer::{ApplyOutcome, PeerEvent, Session, SignalingState};
use tokio::sync::mpsc;

#[tokio::test]
async fn test_answer_out_of_state_is_discarded_without_mutation() {
    init_tracing();
    let hub = MemoryHub::new();

    let (chan_b, rx_b, _) = hub.connect();
    let (_chan_a, _rx_a, addr_a) = hub.connect();

    // A responder in Idle must never apply an answer.
    let (backend_b, handle_b) = FakeBackend::new("sdp-B");
    let (_pe_tx, pe_rx) = mpsc::channel::<PeerEvent>(16);
    let mut responder = Session::join(chan_b, rx_b, backend_b, pe_rx, addr_a, &FakeMedia::ok())
        .await
        .expect("join failed");

    let outcome = responder
        .apply_remote_answer("sdp-stray")
        .await
        .expect("discard is not an error");
    assert_eq!(outcome, ApplyOutcome::DiscardedOutOfState);
    assert_eq!(responder.state(), SignalingState::Idle);
    assert!(handle_b.remote_descriptions().is_empty());
}

#[tokio::test]
async fn test_duplicate_answer_in_stable_is_discarded() {
    init_tracing();
    let hub = MemoryHub::new();

    let (chan_a, rx_a, _) = hub.connect();
    let (_chan_b, _rx_b, addr_b) = hub.connect();

    let (backend_a, handle_a) = FakeBackend::new("sdp-A");
    let (_pe_tx, pe_rx) = mpsc::channel::<PeerEvent>(16);
    let mut initiator = Session::start(chan_a, rx_a, backend_a, pe_rx, addr_b, &FakeMedia::ok())
        .await
        .expect("start failed");

    initiator
        .apply_remote_answer("sdp-B")
        .await
        .expect("answer apply failed");
    assert_eq!(initiator.state(), SignalingState::Stable);
    let mutations_before = handle_a.calls().len();

    // The duplicate is absorbed: state untouched, backend untouched.
    let outcome = initiator
        .apply_remote_answer("sdp-B")
        .await
        .expect("discard is not an error");
    assert_eq!(outcome, ApplyOutcome::DiscardedOutOfState);
    assert_eq!(initiator.state(), SignalingState::Stable);
    assert_eq!(handle_a.calls().len(), mutations_before);
}

#[tokio::test]
async fn test_duplicate_offer_is_discarded_by_responder() {
    init_tracing();
    let hub = MemoryHub::new();

    let (chan_b, rx_b, _) = hub.connect();
    let (_chan_a, _rx_a, addr_a) = hub.connect();

    let (backend_b, handle_b) = FakeBackend::new("sdp-B");
    let (_pe_tx, pe_rx) = mpsc::channel::<PeerEvent>(16);
    let mut responder = Session::join(chan_b, rx_b, backend_b, pe_rx, addr_a, &FakeMedia::ok())
        .await
        .expect("join failed");

    responder.apply_remote_offer("sdp-A").await.expect("offer apply failed");
    assert_eq!(responder.state(), SignalingState::Stable);

    let outcome = responder
        .apply_remote_offer("sdp-A-again")
        .await
        .expect("discard is not an error");
    assert_eq!(outcome, ApplyOutcome::DiscardedOutOfState);
    assert_eq!(responder.state(), SignalingState::Stable);
    assert_eq!(handle_b.remote_descriptions().len(), 1);
}

#[tokio::test]
async fn test_initiator_never_applies_an_offer() {
    init_tracing();
    let hub = MemoryHub::new();

    let (chan_a, rx_a, _) = hub.connect();
    let (_chan_b, _rx_b, addr_b) = hub.connect();

    let (backend_a, handle_a) = FakeBackend::new("sdp-A");
    let (_pe_tx, pe_rx) = mpsc::channel::<PeerEvent>(16);
    let mut initiator = Session::start(chan_a, rx_a, backend_a, pe_rx, addr_b, &FakeMedia::ok())
        .await
        .expect("start failed");

    let outcome = initiator
        .apply_remote_offer("sdp-crossed")
        .await
        .expect("discard is not an error");
    assert_eq!(outcome, ApplyOutcome::DiscardedOutOfState);
    assert_eq!(initiator.state(), SignalingState::HaveLocalOffer);
    assert!(handle_a.remote_descriptions().is_empty());
}
