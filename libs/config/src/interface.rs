//! Per-interface configuration, grounded on `dlep_if_add`'s setup in
//! `dlep_interface.c`.

use serde::{Deserialize, Serialize};

use crate::session::SessionConfig;

/// Configuration for one DLEP-speaking interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceConfig {
    /// Name of the network interface to bind to, e.g. `"wlan0"`.
    pub interface: String,

    /// True if this side plays the radio role on this interface, false for
    /// router.
    pub radio: bool,

    /// UDP multicast/discovery port.
    pub discovery_port: u16,

    /// TCP session port a radio listens on / a router connects to.
    pub session_port: u16,

    /// When true, this interface accepts at most one active TCP session at
    /// a time and suppresses further discovery replies while one is live —
    /// mirrors `dlep_if_add`'s `single_session` field.
    pub single_session: bool,

    pub session: SessionConfig,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        InterfaceConfig {
            interface: String::new(),
            radio: false,
            discovery_port: 854,
            session_port: 855,
            single_session: true,
            session: SessionConfig::default(),
        }
    }
}

/// Top-level config file shape: one entry per interface a daemon instance
/// should speak DLEP on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default)]
    pub interfaces: Vec<InterfaceConfig>,
}
