//! Session and listener configuration.

use std::time::Duration;

/// Tunables for the listener and every session it spawns.
#[derive(Clone, Debug)]
pub struct Settings {
    /// TCP port to accept panel connections on.
    pub listen_port: u16,
    /// Access code for Type1 key derivation.
    pub type1_access_code: Vec<u8>,
    /// Access code for Type2 key derivation.
    pub type2_access_code: Vec<u8>,
    /// Inbound silence required before the reconnection quiet-gate opens.
    pub quiet_gate: Duration,
    /// Interval between `ConnectionPoll` heartbeats (the panel drops the
    /// connection after 120 s of silence).
    pub heartbeat: Duration,
    /// Budget for every response wait.
    pub response_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen_port: 3073,
            type1_access_code: Vec::new(),
            type2_access_code: Vec::new(),
            quiet_gate: Duration::from_millis(2000),
            heartbeat: Duration::from_secs(100),
            response_timeout: Duration::from_secs(60),
        }
    }
}
