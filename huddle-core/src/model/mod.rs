mod address;
mod signaling;

pub use address::Address;
pub use signaling::{ClientFrame, IceServerConfig, ServerFrame, SignalKind};
