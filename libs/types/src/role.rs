//! The two sides of a DLEP session.

/// Which side of the router↔radio exchange a session plays.
///
/// A session is either attached to a radio interface (answering discovery
/// probes, emitting destination lifecycle signals) or a router interface
/// (probing for radios, consuming metrics). See spec §3 "Session".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Radio,
    Router,
}

impl Role {
    pub fn is_radio(self) -> bool {
        matches!(self, Role::Radio)
    }

    pub fn other(self) -> Role {
        match self {
            Role::Radio => Role::Router,
            Role::Router => Role::Radio,
        }
    }
}
