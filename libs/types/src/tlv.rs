//! TLV type identifiers.
//!
//! The baseline catalogue (spec §6). Extension-owned metric TLVs (current
//! data rate, max data rate, latency, loss) live above
//! `TlvType::EXTENSION_RANGE_START`; see `dlep-extensions`'s worked metrics
//! extension.

use std::fmt;

/// A 16-bit DLEP TLV type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TlvType(pub u16);

impl TlvType {
    pub const STATUS: TlvType = TlvType(1);
    pub const IPV4_ADDRESS: TlvType = TlvType(2);
    pub const IPV6_ADDRESS: TlvType = TlvType(3);
    pub const MAC_ADDRESS: TlvType = TlvType(4);
    pub const PEER_TYPE: TlvType = TlvType(5);
    pub const HEARTBEAT_INTERVAL: TlvType = TlvType(6);
    pub const EXTENSIONS_SUPPORTED: TlvType = TlvType(7);
    pub const PORT: TlvType = TlvType(8);

    /// First id available for extension-defined TLVs.
    pub const EXTENSION_RANGE_START: u16 = 512;

    pub const fn baseline_name(self) -> Option<&'static str> {
        match self {
            Self::STATUS => Some("Status"),
            Self::IPV4_ADDRESS => Some("IPv4 Address"),
            Self::IPV6_ADDRESS => Some("IPv6 Address"),
            Self::MAC_ADDRESS => Some("MAC Address"),
            Self::PEER_TYPE => Some("Peer Type"),
            Self::HEARTBEAT_INTERVAL => Some("Heartbeat Interval"),
            Self::EXTENSIONS_SUPPORTED => Some("Extensions Supported"),
            Self::PORT => Some("Port"),
            _ => None,
        }
    }
}

impl fmt::Display for TlvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.baseline_name() {
            Some(name) => write!(f, "{name} ({})", self.0),
            None => write!(f, "tlv {}", self.0),
        }
    }
}

impl From<u16> for TlvType {
    fn from(v: u16) -> Self {
        TlvType(v)
    }
}
