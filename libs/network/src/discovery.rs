//! UDP discovery datagram handling, grounded on `dlep_interface.c`'s
//! `_cb_receive_udp` and `_cb_send_multicast`.
//!
//! ```mermaid
//! graph TB
//!     A[UDP datagram arrives] --> B{single_session active?}
//!     B -- yes --> C[drop]
//!     B -- no --> D{has DLEP prefix?}
//!     D -- no --> C
//!     D -- yes --> E{source is this interface's own address?}
//!     E -- yes --> C
//!     E -- no --> F[strip prefix, decode signal]
//!     F --> G[Router: Peer Offer accepted / Radio: Peer Discovery answered]
//! ```
//! The two rejection paths above (`single_session` suppression and the
//! self-loopback guard) are exactly what kept `dlep_if_add`'s multicast
//! socket from answering its own broadcasts on a shared interface.

use std::net::SocketAddr;

use dlep_codec::{frame_signal, prime_udp_buffer, strip_udp_prefix, unframe_signal};
use dlep_types::signal::SignalType;

use crate::error::{NetworkError, NetworkResult};

/// Decides whether an inbound UDP datagram should be processed, and builds
/// the discovery-side replies for the ones that should.
pub struct DiscoveryFilter {
    local_addr: SocketAddr,
    single_session: bool,
}

impl DiscoveryFilter {
    pub fn new(local_addr: SocketAddr, single_session: bool) -> Self {
        DiscoveryFilter {
            local_addr,
            single_session,
        }
    }

    /// Update whether this interface currently has a live TCP session.
    /// Discovery replies are suppressed while one does and
    /// `single_session` is set — mirrors the original's check of
    /// `interf->session_tree` before answering multicast discovery.
    pub fn set_single_session_active(&mut self, active: bool) {
        self.single_session = active;
    }

    /// Validate and unwrap one inbound datagram, returning its signal type
    /// and TLV payload if it should be processed.
    ///
    /// Returns `Ok(None)` for datagrams that should be silently dropped
    /// (self-loopback, or discovery traffic arriving while a
    /// `single_session` interface already has a peer) — these are routine,
    /// not protocol errors, and the caller should neither log nor answer
    /// them.
    pub fn accept<'a>(
        &self,
        source: SocketAddr,
        datagram: &'a [u8],
    ) -> NetworkResult<Option<(SignalType, &'a [u8])>> {
        if source == self.local_addr {
            return Ok(None);
        }
        let stripped = match strip_udp_prefix(datagram) {
            Ok(s) => s,
            Err(_) => return Ok(None),
        };
        let (signal_type, payload, _) = unframe_signal(stripped)?;
        if self.single_session
            && matches!(
                signal_type,
                SignalType::PEER_DISCOVERY | SignalType::PEER_OFFER
            )
        {
            return Ok(None);
        }
        Ok(Some((signal_type, payload)))
    }

    /// Build an outbound UDP datagram: the discovery prefix followed by the
    /// framed signal. Returns `Ok(None)` if a `single_session` interface
    /// already has a live peer, mirroring `_cb_send_multicast`'s suppression
    /// of further discovery broadcasts.
    pub fn build_datagram(&self, signal_type: SignalType, payload: &[u8]) -> Option<Vec<u8>> {
        if self.single_session {
            return None;
        }
        let mut out = Vec::new();
        prime_udp_buffer(&mut out);
        frame_signal(&mut out, signal_type, payload).ok()?;
        Some(out)
    }
}
