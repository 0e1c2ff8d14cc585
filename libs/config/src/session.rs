//! Per-session configuration, grounded on `dlep_session_config` in
//! `dlep_session.h`.

use serde::{Deserialize, Serialize};

/// Tunables carried by every DLEP session on an interface.
///
/// Defaults match spec §6's fixed defaults, chosen to match the original
/// `dlep_session_config` initializer in the absence of a loaded config
/// file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Free-text peer type string sent in the Peer Type TLV. `None` omits
    /// the TLV entirely, matching the original's empty-string default.
    pub peer_type: Option<String>,

    /// Interval between UDP Peer Discovery / Peer Offer probes, in
    /// milliseconds.
    pub discovery_interval_ms: u64,

    /// Interval between Heartbeat signals this side sends, in milliseconds.
    pub heartbeat_interval_ms: u64,

    /// Whether to include destination information in Peer Update signals
    /// at session start (radio side only).
    pub send_neighbors: bool,

    /// Whether to report proxied (multi-hop) destinations.
    pub send_proxied: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            peer_type: None,
            discovery_interval_ms: 1000,
            heartbeat_interval_ms: 1000,
            send_neighbors: false,
            send_proxied: false,
        }
    }
}

impl SessionConfig {
    pub fn discovery_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.discovery_interval_ms)
    }

    pub fn heartbeat_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.heartbeat_interval_ms)
    }

    /// Ack timeout for heartbeats: `max(2 * heartbeat_interval, 1s)`, the
    /// floor chosen so a sub-second `heartbeat_interval_ms` in a test
    /// config can't produce an unreasonably twitchy timeout.
    pub fn heartbeat_ack_timeout(&self) -> std::time::Duration {
        std::cmp::max(
            self.heartbeat_interval() * 2,
            std::time::Duration::from_secs(1),
        )
    }
}
