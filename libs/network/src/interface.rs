//! The interface controller (C7): owns one interface's UDP discovery path
//! and its live TCP sessions.
//!
//! ```mermaid
//! graph TB
//!     U[UDP datagram] --> F{DiscoveryFilter::accept}
//!     F -- dropped --> X[ignored]
//!     F -- PeerDiscovery, role=Radio --> O[build Peer Offer, unicast reply]
//!     F -- PeerOffer, role=Router --> C[ConnectTcp event]
//!     C --> T[daemon opens TCP, calls on_tcp_connected]
//!     T --> S[Session::build_peer_init]
//!     S --> H[TCP bytes in/out via on_tcp_data / TcpSend events]
//! ```
//!
//! Grounded on `dlep_interface.c`'s `dlep_if_add`: one `dlep_if` per
//! configured interface, owning `udp_out`/`udp_in` and an AVL tree of TCP
//! sessions keyed by remote socket address, with `single_session` gating
//! both the discovery reply path and the multicast re-beacon path.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use dlep_codec::{CodecResult, SignalParser, TlvConstraint, Writer};
use dlep_config::InterfaceConfig;
use dlep_types::layer2::{L2NetworkId, Layer2Store};
use dlep_types::mac::MacAddr;
use dlep_types::neighbor::NeighborState;
use dlep_types::role::Role;
use dlep_types::signal::SignalType;
use dlep_types::tlv::TlvType;

use dlep_extensions::{ExtensionId, ExtensionRegistry};

use crate::discovery::DiscoveryFilter;
use crate::error::{NetworkError, NetworkResult};
use crate::session::{Session, SessionEnd};

/// Something the owning daemon must do in response to processing a
/// datagram, a tick, or a chunk of TCP data.
///
/// The interface controller never touches a socket itself — it returns
/// these and the daemon's event loop carries them out, keeping every
/// socket operation at the edge of the program (spec §5's resource
/// discipline: "Sockets are scoped to the interface").
#[derive(Debug)]
pub enum InterfaceEvent {
    /// Unicast `datagram` back to `to` on the UDP socket.
    UnicastReply { to: SocketAddr, datagram: Vec<u8> },
    /// Multicast `datagram` to every configured discovery address.
    Multicast(Vec<u8>),
    /// Open a TCP connection to `addr`; once connected, the caller must
    /// call [`Interface::on_tcp_connected`].
    ConnectTcp { addr: SocketAddr },
    /// Write `bytes` to the TCP session keyed by `addr`.
    TcpSend { addr: SocketAddr, bytes: Vec<u8> },
    /// Close and drop the TCP session keyed by `addr`.
    CloseTcp { addr: SocketAddr, reason: SessionEnd },
}

/// One DLEP-speaking network interface: its UDP discovery path plus
/// zero-or-more live TCP sessions.
pub struct Interface {
    name: String,
    role: Role,
    config: InterfaceConfig,
    registry: Arc<ExtensionRegistry>,
    store: Arc<dyn Layer2Store>,
    net: L2NetworkId,
    discovery: DiscoveryFilter,
    next_discovery_at: Instant,
    tcp_sessions: HashMap<SocketAddr, Session>,
}

impl Interface {
    pub fn new(
        name: impl Into<String>,
        config: InterfaceConfig,
        registry: Arc<ExtensionRegistry>,
        store: Arc<dyn Layer2Store>,
        local_udp_addr: SocketAddr,
        now: Instant,
    ) -> Self {
        let role = if config.radio { Role::Radio } else { Role::Router };
        let name = name.into();
        let net = L2NetworkId(name.clone());
        let discovery_interval = config.session.discovery_interval();
        Interface {
            name,
            role,
            // Starts un-gated: `single_session` only suppresses discovery
            // once a TCP session actually exists (`refresh_single_session_gate`),
            // never merely because the config flag is set.
            discovery: DiscoveryFilter::new(local_udp_addr, false),
            config,
            registry,
            store,
            net,
            next_discovery_at: now + discovery_interval,
            tcp_sessions: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn active_session_count(&self) -> usize {
        self.tcp_sessions.len()
    }

    pub fn session_state(&self, addr: SocketAddr) -> Option<crate::session::SessionState> {
        self.tcp_sessions.get(&addr).map(|s| s.state())
    }

    /// The local-neighbor state this interface's session with `addr` holds
    /// for `mac`, if that session exists and has sent it a lifecycle signal.
    pub fn neighbor_state(&self, addr: SocketAddr, mac: MacAddr) -> Option<NeighborState> {
        self.tcp_sessions
            .get(&addr)
            .and_then(|s| s.neighbors().get(mac))
            .map(|n| n.state)
    }

    /// Build and return a Destination Up signal for `mac` on the session
    /// keyed by `addr`, arming that neighbor's ack timer. The caller is
    /// responsible for sending the bytes over that session's TCP stream.
    pub fn announce_destination_up(
        &mut self,
        addr: SocketAddr,
        mac: MacAddr,
        now: Instant,
    ) -> NetworkResult<Vec<u8>> {
        let session = self
            .tcp_sessions
            .get_mut(&addr)
            .ok_or_else(|| NetworkError::transport("no session for that address"))?;
        session.announce_destination_up(now, mac)
    }

    /// Build and return a Destination Down signal for `mac` on the session
    /// keyed by `addr`, arming that neighbor's ack timer.
    pub fn announce_destination_down(
        &mut self,
        addr: SocketAddr,
        mac: MacAddr,
        now: Instant,
    ) -> NetworkResult<Vec<u8>> {
        let session = self
            .tcp_sessions
            .get_mut(&addr)
            .ok_or_else(|| NetworkError::transport("no session for that address"))?;
        session.announce_destination_down(now, mac)
    }

    fn refresh_single_session_gate(&mut self) {
        let active = !self.tcp_sessions.is_empty();
        self.discovery.set_single_session_active(active && self.config.single_session);
    }

    fn local_extension_ids(&self) -> Vec<ExtensionId> {
        self.registry.ids().to_vec()
    }

    /// Handle one inbound UDP datagram. Returns events produced (a unicast
    /// reply, typically); an empty vec means the datagram was legitimately
    /// dropped (self-loopback, missing prefix, or `single_session`
    /// suppression) or this interface's role has nothing to say about it.
    pub fn on_udp_datagram(
        &mut self,
        source: SocketAddr,
        datagram: &[u8],
    ) -> NetworkResult<Vec<InterfaceEvent>> {
        let Some((signal_type, payload)) = self.discovery.accept(source, datagram)? else {
            return Ok(Vec::new());
        };

        match (self.role, signal_type) {
            (Role::Radio, SignalType::PEER_DISCOVERY) => {
                let peer_ids = extract_extension_ids(payload)?;
                let negotiated = self.registry.negotiate(&peer_ids);
                let offer = build_peer_offer(self.config.session_port, &negotiated)?;
                let datagram = self
                    .discovery
                    .build_datagram(SignalType::PEER_OFFER, &offer)
                    .ok_or_else(|| NetworkError::transport("single_session interface cannot answer discovery"))?;
                Ok(vec![InterfaceEvent::UnicastReply {
                    to: source,
                    datagram,
                }])
            }
            (Role::Router, SignalType::PEER_OFFER) => {
                let tcp_port = extract_port(payload)?.unwrap_or(self.config.session_port);
                let addr = SocketAddr::new(source.ip(), tcp_port);
                tracing::info!(interface = %self.name, %addr, "accepted peer offer, opening TCP session");
                Ok(vec![InterfaceEvent::ConnectTcp { addr }])
            }
            _ => {
                tracing::debug!(
                    interface = %self.name,
                    ?signal_type,
                    role = ?self.role,
                    "discovery signal not meaningful for this role, ignoring"
                );
                Ok(Vec::new())
            }
        }
    }

    /// A router-initiated or radio-accepted TCP connection to `addr` is now
    /// established; create its session. For the router side this always
    /// follows a `ConnectTcp` event; for the radio side this follows the
    /// daemon's TCP listener accepting a new peer.
    pub fn on_tcp_connected(&mut self, addr: SocketAddr, now: Instant) -> Option<Vec<u8>> {
        let mut session = Session::new(
            self.role,
            self.config.session.clone(),
            self.registry.clone(),
            self.store.clone(),
            self.net.clone(),
            now,
        );

        // Router side speaks first: Peer Initialization.
        let outbound = if self.role == Role::Router {
            session.build_peer_init().ok()
        } else {
            None
        };

        self.tcp_sessions.insert(addr, session);
        self.refresh_single_session_gate();
        outbound
    }

    /// Feed a chunk of bytes read from the TCP stream at `addr` through the
    /// session's framing and state machine, repeatedly, for as many
    /// complete signals as `buf` contains. Returns outbound events
    /// (replies to send, or a close) plus the number of bytes consumed —
    /// the caller must retain `buf[consumed..]` for the next read, per
    /// spec §6's "arbitrary segmentation" requirement.
    pub fn on_tcp_data(&mut self, addr: SocketAddr, buf: &[u8], now: Instant) -> (Vec<InterfaceEvent>, usize) {
        let mut events = Vec::new();
        let mut consumed = 0;

        loop {
            let remaining = &buf[consumed..];
            let (signal_type, payload, used) = match dlep_codec::unframe_signal(remaining) {
                Ok(parsed) => parsed,
                Err(_incomplete) => break,
            };

            let Some(session) = self.tcp_sessions.get_mut(&addr) else {
                break;
            };
            let outcome = session.receive(now, signal_type, payload);
            let terminated = session.state() == crate::session::SessionState::Terminated;
            consumed += used;

            match outcome {
                Ok(Some(reply)) => events.push(InterfaceEvent::TcpSend { addr, bytes: reply }),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(interface = %self.name, %addr, %err, "session rejected signal");
                    events.push(InterfaceEvent::CloseTcp {
                        addr,
                        reason: SessionEnd::TerminatedLocally,
                    });
                    self.tcp_sessions.remove(&addr);
                    self.refresh_single_session_gate();
                    break;
                }
            }
            if terminated {
                self.tcp_sessions.remove(&addr);
                self.refresh_single_session_gate();
                break;
            }
        }

        (events, consumed)
    }

    /// Drive every periodic timer this interface owns: the discovery
    /// beacon/probe, each session's heartbeat, and timeout sweeps. Call
    /// once per event-loop tick.
    pub fn tick(&mut self, now: Instant) -> Vec<InterfaceEvent> {
        let mut events = Vec::new();

        if now >= self.next_discovery_at {
            self.next_discovery_at = now + self.config.session.discovery_interval();
            if let Some(datagram) = self.build_discovery_beacon() {
                if let Some(framed) = self.discovery.build_datagram(
                    match self.role {
                        Role::Router => SignalType::PEER_DISCOVERY,
                        Role::Radio => SignalType::PEER_OFFER,
                    },
                    &datagram,
                ) {
                    events.push(InterfaceEvent::Multicast(framed));
                }
            }
        }

        let mut to_close = Vec::new();
        for (addr, session) in self.tcp_sessions.iter_mut() {
            if let Some(reason) = session.check_timeouts(now) {
                to_close.push((*addr, reason));
                continue;
            }
            if session.heartbeat_due(now) {
                if let Ok(heartbeat) = session.build_heartbeat(now) {
                    events.push(InterfaceEvent::TcpSend {
                        addr: *addr,
                        bytes: heartbeat,
                    });
                }
            }
        }
        let any_closed = !to_close.is_empty();
        for (addr, reason) in to_close {
            tracing::info!(interface = %self.name, %addr, ?reason, "session timed out");
            self.tcp_sessions.remove(&addr);
            events.push(InterfaceEvent::CloseTcp { addr, reason });
        }
        if any_closed {
            self.refresh_single_session_gate();
        }

        events
    }

    fn build_discovery_beacon(&self) -> Option<Vec<u8>> {
        match self.role {
            Role::Router => build_peer_discovery(&self.local_extension_ids()).ok(),
            Role::Radio => build_peer_offer(self.config.session_port, &self.local_extension_ids()).ok(),
        }
    }
}

/// Build an unframed Peer Discovery payload carrying this side's
/// Extensions Supported TLV.
fn build_peer_discovery(extension_ids: &[ExtensionId]) -> CodecResult<Vec<u8>> {
    let mut buf = Vec::new();
    let mut writer = Writer::new(&mut buf);
    writer.begin_signal(SignalType::PEER_DISCOVERY)?;
    writer.add_tlv(TlvType::EXTENSIONS_SUPPORTED, &encode_extension_ids(extension_ids))?;
    writer.finish_signal()?;
    let (_, payload, _) = dlep_codec::unframe_signal(&buf).expect("just framed");
    Ok(payload.to_vec())
}

/// Build an unframed Peer Offer payload: the radio's TCP port plus the
/// negotiated (already-intersected) extension id list.
fn build_peer_offer(tcp_port: u16, extension_ids: &[ExtensionId]) -> CodecResult<Vec<u8>> {
    let mut buf = Vec::new();
    let mut writer = Writer::new(&mut buf);
    writer.begin_signal(SignalType::PEER_OFFER)?;
    writer.add_tlv(TlvType::PORT, &tcp_port.to_be_bytes())?;
    writer.add_tlv(TlvType::EXTENSIONS_SUPPORTED, &encode_extension_ids(extension_ids))?;
    writer.finish_signal()?;
    let (_, payload, _) = dlep_codec::unframe_signal(&buf).expect("just framed");
    Ok(payload.to_vec())
}

fn encode_extension_ids(ids: &[ExtensionId]) -> Vec<u8> {
    ids.iter().flat_map(|id| id.0.to_be_bytes()).collect()
}

/// Loosely parse a discovery-phase payload's Extensions Supported TLV,
/// tolerating payloads that omit it (no extensions offered).
fn extract_extension_ids(payload: &[u8]) -> NetworkResult<Vec<ExtensionId>> {
    let mut parser = SignalParser::new();
    parser.allow(
        TlvType::EXTENSIONS_SUPPORTED,
        TlvConstraint::range(0, u16::MAX as usize, false),
    );
    parser.allow(TlvType::PORT, TlvConstraint::fixed(2, false));
    parser.parse(payload)?;
    let Some(value) = parser.first(TlvType::EXTENSIONS_SUPPORTED) else {
        return Ok(Vec::new());
    };
    let bytes = parser.bytes(payload, value);
    Ok(bytes
        .chunks_exact(2)
        .map(|chunk| ExtensionId(u16::from_be_bytes([chunk[0], chunk[1]])))
        .collect())
}

fn extract_port(payload: &[u8]) -> NetworkResult<Option<u16>> {
    let mut parser = SignalParser::new();
    parser.allow(TlvType::PORT, TlvConstraint::fixed(2, false));
    parser.allow(
        TlvType::EXTENSIONS_SUPPORTED,
        TlvConstraint::range(0, u16::MAX as usize, false),
    );
    parser.parse(payload)?;
    Ok(parser
        .first(TlvType::PORT)
        .map(|value| u16::from_be_bytes(parser.bytes(payload, value).try_into().expect("2-byte tlv"))))
}
