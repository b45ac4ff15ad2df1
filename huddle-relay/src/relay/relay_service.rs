use dashmap::DashMap;
use huddle_core::{Address, IceServerConfig, ServerFrame, SignalError, SignalKind};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

struct RelayInner {
    peers: DashMap<Address, mpsc::UnboundedSender<ServerFrame>>,
    ice_servers: Vec<IceServerConfig>,
}

/// Stateless address-based signal forwarder.
///
/// Holds nothing but the routing table: which address is bound to which
/// live connection, plus the ICE server list pushed to clients at connect.
/// Payloads pass through uninspected and are not retained after delivery.
#[derive(Clone)]
pub struct RelayService {
    inner: Arc<RelayInner>,
}

impl RelayService {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            inner: Arc::new(RelayInner {
                peers: DashMap::new(),
                ice_servers,
            }),
        }
    }

    pub fn ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    /// Bind an address to a live connection's outbound channel.
    pub fn bind(&self, address: Address, tx: mpsc::UnboundedSender<ServerFrame>) {
        self.inner.peers.insert(address, tx);
    }

    /// Unbind an address. Subsequent relays to it fail with `DeliveryFailed`.
    pub fn unbind(&self, address: &Address) {
        self.inner.peers.remove(address);
    }

    pub fn is_bound(&self, address: &Address) -> bool {
        self.inner.peers.contains_key(address)
    }

    /// Forward one signal to the channel currently bound to `to`.
    ///
    /// Malformed calls are rejected before any delivery attempt; an unbound
    /// destination is reported as `DeliveryFailed` and never buffered or
    /// retried. Payload bodies are not logged.
    pub fn relay(&self, kind: SignalKind, to: &Address, payload: &str) -> Result<(), SignalError> {
        if to.is_empty() {
            return Err(SignalError::InvalidArgument("destination address is empty"));
        }
        if payload.is_empty() {
            return Err(SignalError::InvalidArgument("payload is empty"));
        }

        let Some(peer) = self.inner.peers.get(to) else {
            warn!(event = kind.event_name(), %to, "relay to unbound address");
            return Err(SignalError::DeliveryFailed(to.clone()));
        };

        if peer.send(ServerFrame::signal(kind, payload.to_string())).is_err() {
            // The bound connection is mid-teardown; same contract as unbound.
            warn!(event = kind.event_name(), %to, "relay to closing connection");
            return Err(SignalError::DeliveryFailed(to.clone()));
        }

        debug!(
            event = kind.event_name(),
            %to,
            payload_len = payload.len(),
            "signal relayed"
        );
        Ok(())
    }
}
