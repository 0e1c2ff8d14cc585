//! Signal type identifiers.
//!
//! The baseline catalogue (spec §6) plus the numeric values this workspace
//! fixes for them — see DESIGN.md, Open Question (a). Extensions may define
//! further signal types above `SignalType::EXTENSION_RANGE_START`.

use std::fmt;

/// A 16-bit DLEP signal type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalType(pub u16);

impl SignalType {
    pub const PEER_DISCOVERY: SignalType = SignalType(1);
    pub const PEER_OFFER: SignalType = SignalType(2);
    pub const PEER_INITIALIZATION: SignalType = SignalType(3);
    pub const PEER_INITIALIZATION_ACK: SignalType = SignalType(4);
    pub const PEER_UPDATE: SignalType = SignalType(5);
    pub const PEER_UPDATE_ACK: SignalType = SignalType(6);
    pub const PEER_TERMINATION: SignalType = SignalType(7);
    pub const PEER_TERMINATION_ACK: SignalType = SignalType(8);
    pub const DESTINATION_UP: SignalType = SignalType(9);
    pub const DESTINATION_UP_ACK: SignalType = SignalType(10);
    pub const DESTINATION_UPDATE: SignalType = SignalType(11);
    pub const DESTINATION_DOWN: SignalType = SignalType(12);
    pub const DESTINATION_DOWN_ACK: SignalType = SignalType(13);
    pub const HEARTBEAT: SignalType = SignalType(14);

    /// First id available for extension-defined signals.
    pub const EXTENSION_RANGE_START: u16 = 1024;

    pub const fn baseline_name(self) -> Option<&'static str> {
        match self {
            Self::PEER_DISCOVERY => Some("Peer Discovery"),
            Self::PEER_OFFER => Some("Peer Offer"),
            Self::PEER_INITIALIZATION => Some("Peer Initialization"),
            Self::PEER_INITIALIZATION_ACK => Some("Peer Initialization Ack"),
            Self::PEER_UPDATE => Some("Peer Update"),
            Self::PEER_UPDATE_ACK => Some("Peer Update Ack"),
            Self::PEER_TERMINATION => Some("Peer Termination"),
            Self::PEER_TERMINATION_ACK => Some("Peer Termination Ack"),
            Self::DESTINATION_UP => Some("Destination Up"),
            Self::DESTINATION_UP_ACK => Some("Destination Up Ack"),
            Self::DESTINATION_UPDATE => Some("Destination Update"),
            Self::DESTINATION_DOWN => Some("Destination Down"),
            Self::DESTINATION_DOWN_ACK => Some("Destination Down Ack"),
            Self::HEARTBEAT => Some("Heartbeat"),
            _ => None,
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.baseline_name() {
            Some(name) => write!(f, "{name} ({})", self.0),
            None => write!(f, "signal {}", self.0),
        }
    }
}

impl From<u16> for SignalType {
    fn from(v: u16) -> Self {
        SignalType(v)
    }
}
