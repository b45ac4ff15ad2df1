/// Which side of the negotiation this session plays. Fixed for the
/// session's lifetime: `start` makes an initiator, `join` a responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationRole {
    Initiator,
    Responder,
}

/// Signaling progression of one session.
///
/// Initiator: `Idle → HaveLocalOffer → Stable`.
/// Responder: `Idle → HaveRemoteOffer → Stable`.
/// An answer is only legal in `HaveLocalOffer`; an offer only in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalingState {
    Idle,
    HaveLocalOffer,
    HaveRemoteOffer,
    Stable,
}

/// What happened to an incoming signal.
///
/// Out-of-state messages are expected under benign reordering, so they are
/// reported as data and logged, never raised as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Committed to the peer connection.
    Applied,
    /// Held until the remote description is set.
    Queued,
    /// Illegal for the current state; state untouched.
    DiscardedOutOfState,
    /// Candidate queue is full; candidate dropped.
    DroppedQueueFull,
}
