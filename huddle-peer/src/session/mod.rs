mod session;
mod state;

pub use session::{MAX_QUEUED_CANDIDATES, Session};
pub use state::{ApplyOutcome, NegotiationRole, SignalingState};
