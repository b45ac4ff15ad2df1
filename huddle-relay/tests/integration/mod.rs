//! Wire-level tests for the relay: real axum server, real WebSocket clients.


use huddle_core::IceServerConfig;
use huddle_relay::{RelayService, router};
use tracing::Level;

/// Initialize tracing for tests (call once per test).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Spin up a relay on an ephemeral port; returns its `host:port`.
pub async fn start_relay() -> String {
    let relay = RelayService::new(vec![IceServerConfig {
        urls: vec!["stun:stun.test:3478".to_string()],
        username: None,
        credential: None,
    }]);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().expect("no local addr");

    tokio::spawn(async move {
        let _ = axum::serve(listener, router(relay)).await;
    });

    addr.to_string()
}
