use crate::model::Address;
use thiserror::Error;

/// Failure taxonomy for the signaling core.
///
/// Protocol-sequencing violations (stale or duplicate messages) are not
/// represented here: they are absorbed and logged where they occur, since
/// they are expected under benign reordering. These variants cover the
/// failures a caller must actually decide about.
#[derive(Debug, Error)]
pub enum SignalError {
    /// A relay call was malformed. Rejected before any delivery attempt.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// No channel is currently bound to the destination address. Reported
    /// to the sender, never buffered or retried.
    #[error("no channel bound to address {0}")]
    DeliveryFailed(Address),

    /// Local capture could not start. The session aborts before any
    /// negotiation message is sent.
    #[error("local media acquisition failed: {0}")]
    MediaAcquisitionFailed(String),

    /// The peer connection rejected a description or a negotiation step.
    /// The session is left in its last stable state or torn down.
    #[error("negotiation failed: {0}")]
    NegotiationFailed(String),

    /// The signaling channel is gone. Nothing can be sent any more.
    #[error("signaling channel closed")]
    ChannelClosed,
}
