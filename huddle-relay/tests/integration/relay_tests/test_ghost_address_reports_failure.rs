use crate::integration::{init_tracing, start_relay};
use crate::utils::TestClient;
use huddle_core::{Address, ServerFrame, SignalKind};

#[tokio::test]
async fn test_relay_to_ghost_address_reports_delivery_failed() {
    init_tracing();
    let server = start_relay().await;

    let mut a = TestClient::connect(&server).await;
    let mut bystander = TestClient::connect(&server).await;

    a.send_signal(SignalKind::Offer, &Address::from("ghost-address"), "sdp")
        .await;

    let frame = a.next_frame(2000).await.expect("error not reported");
    assert!(
        matches!(&frame, ServerFrame::Error { reason } if reason.contains("ghost-address")),
        "expected delivery failure for ghost-address, got {frame:?}"
    );

    // No event fires anywhere else.
    assert!(bystander.next_frame(300).await.is_none());

    a.close().await;
    bystander.close().await;
}

#[tokio::test]
async fn test_empty_payload_is_rejected() {
    init_tracing();
    let server = start_relay().await;

    let mut a = TestClient::connect(&server).await;
    let mut b = TestClient::connect(&server).await;
    let addr_b = b.address().clone();

    a.send_signal(SignalKind::Offer, &addr_b, "").await;

    let frame = a.next_frame(2000).await.expect("error not reported");
    assert!(matches!(&frame, ServerFrame::Error { reason } if reason.contains("invalid argument")));
    assert!(b.next_frame(300).await.is_none(), "nothing may be delivered");

    a.close().await;
    b.close().await;
}
