use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Channel-assigned identifier naming one connected participant.
///
/// The relay mints a fresh `Address` for every accepted connection and
/// announces it in the `Welcome` frame. An address is only valid while its
/// connection is alive; after disconnect it is unbound and any relay to it
/// fails with `DeliveryFailed`.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
pub struct Address(String);

impl Address {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
