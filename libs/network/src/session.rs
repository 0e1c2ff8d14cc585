//! The DLEP session state machine (spec §4.6), grounded on `dlep_session`'s
//! `next_signal` field and the peer/destination lifecycle in
//! `dlep_extension.c`'s worked processing functions.
//!
//! A `Session` is driven entirely by direct method calls from its owning
//! interface's single-threaded event loop (spec §5) — there is no internal
//! task or channel here, matching the teacher's discovery-module note that
//! each interface is a single actor with no fan-out between sessions.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dlep_types::layer2::{L2NetworkId, Layer2Store};
use dlep_types::mac::MacAddr;
use dlep_types::role::Role;
use dlep_types::signal::SignalType;
use dlep_types::status::StatusCode;
use dlep_types::tlv::TlvType;

use dlep_codec::{SignalParser, TlvConstraint, Writer};
use dlep_extensions::{ExtensionId, ExtensionRegistry};

use dlep_config::SessionConfig;

use crate::error::{NetworkError, NetworkResult};
use crate::neighbor::LocalNeighborTable;

/// How long a router waits for Peer Initialization Ack, and a radio waits
/// for Peer Initialization, before giving up. Fixed per DESIGN.md's Open
/// Question decision (b): not configurable, since a peer this slow to
/// respond is indistinguishable from one that will never respond.
pub const PEER_INIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Where a session sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Router: about to send Peer Initialization. Radio: waiting to
    /// receive it.
    WaitingPeerInit,
    /// Router only: Peer Initialization sent, waiting for the ack.
    WaitingPeerInitAck,
    /// Session established; destination and heartbeat traffic flows.
    InSession,
    /// Peer Termination sent or received; waiting for the ack before the
    /// transport is torn down.
    Terminating,
    /// Terminated; the owning interface should drop this session.
    Terminated,
}

impl SessionState {
    fn name(self) -> &'static str {
        match self {
            SessionState::WaitingPeerInit => "WaitingPeerInit",
            SessionState::WaitingPeerInitAck => "WaitingPeerInitAck",
            SessionState::InSession => "InSession",
            SessionState::Terminating => "Terminating",
            SessionState::Terminated => "Terminated",
        }
    }
}

/// A reason the owning interface should tear this session down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    PeerInitTimeout,
    HeartbeatTimeout,
    TerminatedByPeer(StatusCode),
    TerminatedLocally,
}

/// One DLEP peer relationship over one transport connection.
pub struct Session {
    role: Role,
    state: SessionState,
    config: SessionConfig,
    registry: Arc<ExtensionRegistry>,
    negotiated: Vec<ExtensionId>,
    parsers: HashMap<SignalType, SignalParser>,
    store: Arc<dyn Layer2Store>,
    net: L2NetworkId,
    neighbors: LocalNeighborTable,
    remote_heartbeat_interval: Duration,
    last_received_at: Instant,
    peer_init_deadline: Option<Instant>,
    next_heartbeat_at: Instant,
    terminate_deadline: Option<Instant>,
}

impl Session {
    pub fn new(
        role: Role,
        config: SessionConfig,
        registry: Arc<ExtensionRegistry>,
        store: Arc<dyn Layer2Store>,
        net: L2NetworkId,
        now: Instant,
    ) -> Self {
        let heartbeat_interval = config.heartbeat_interval();
        Session {
            role,
            state: SessionState::WaitingPeerInit,
            config,
            registry,
            negotiated: Vec::new(),
            parsers: HashMap::new(),
            store,
            net,
            neighbors: LocalNeighborTable::new(),
            remote_heartbeat_interval: heartbeat_interval,
            last_received_at: now,
            peer_init_deadline: Some(now + PEER_INIT_TIMEOUT),
            next_heartbeat_at: now + heartbeat_interval,
            terminate_deadline: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn neighbors(&self) -> &LocalNeighborTable {
        &self.neighbors
    }

    fn local_extension_ids(&self) -> Vec<ExtensionId> {
        self.registry.ids().to_vec()
    }

    /// Let every negotiated extension clear whatever L2 state it owns for
    /// `mac` — called once that destination is gone for good, whether by an
    /// in-band Destination Down, an ack timeout, or session teardown.
    fn cleanup_neighbor(&mut self, mac: MacAddr) {
        self.registry
            .dispatch_cleanup_neighbor(&self.negotiated, self.store.as_ref(), &self.net, mac);
    }

    /// Drop every tracked local neighbor and clear its L2 state. Used
    /// whenever a session reaches `Terminated`, clean or not — nothing is
    /// left behind for a destination once its session is gone.
    fn drain_neighbors(&mut self) {
        for mac in self.neighbors.drain() {
            self.cleanup_neighbor(mac);
        }
    }

    /// Get (building and caching if absent) the parser for `signal`, wired
    /// up with every negotiated extension's declared TLVs.
    fn parser_for(&mut self, signal: SignalType) -> &mut SignalParser {
        self.parsers.entry(signal).or_insert_with(|| {
            let mut parser = SignalParser::new();
            self.registry
                .configure_parser(&self.negotiated, signal, &mut parser);
            parser
        })
    }

    /// Drop every cached parser so the next `parser_for` call rebuilds it
    /// against the current `negotiated` set. Needed once, right after
    /// negotiation completes during Peer Initialization.
    fn rebuild_parsers(&mut self) {
        self.parsers.clear();
    }

    /// Router side: build the initial Peer Initialization signal.
    pub fn build_peer_init(&mut self) -> NetworkResult<Vec<u8>> {
        let mut buf = Vec::new();
        let mut writer = Writer::new(&mut buf);
        writer.begin_signal(SignalType::PEER_INITIALIZATION)?;
        writer.add_tlv(
            TlvType::HEARTBEAT_INTERVAL,
            &(self.config.heartbeat_interval_ms as u16).to_be_bytes(),
        )?;
        if let Some(peer_type) = &self.config.peer_type {
            writer.add_tlv(TlvType::PEER_TYPE, peer_type.as_bytes())?;
        }
        writer.add_tlv(TlvType::EXTENSIONS_SUPPORTED, &encode_extension_ids(&self.local_extension_ids()))?;
        writer.finish_signal()?;
        self.state = SessionState::WaitingPeerInitAck;
        Ok(buf)
    }

    /// Process one received signal's already-unframed payload, returning
    /// bytes to send back (an ack, typically) if any.
    ///
    /// A signal this session can't legally accept, or one that fails TLV
    /// validation, does not simply error out: per spec §8's error-handling
    /// principle, this side answers with its own Peer Termination (carrying
    /// whatever status best describes the violation) and moves to
    /// `Terminating`, so the peer learns why before the transport closes.
    /// Only errors that leave no well-formed signal to answer with (none
    /// currently reach this far — framing is validated before `receive` is
    /// called) would still propagate as `Err`.
    pub fn receive(
        &mut self,
        now: Instant,
        signal: SignalType,
        payload: &[u8],
    ) -> NetworkResult<Option<Vec<u8>>> {
        self.last_received_at = now;

        if !self.signal_is_legal(signal) {
            let status = if signal.baseline_name().is_none() {
                StatusCode::UnknownSignal
            } else {
                StatusCode::UnexpectedSignal
            };
            return self.terminate_with(now, status);
        }

        let outcome = match signal {
            SignalType::PEER_INITIALIZATION => self.handle_peer_init(now, payload),
            SignalType::PEER_INITIALIZATION_ACK => self.handle_peer_init_ack(now, payload),
            SignalType::HEARTBEAT => Ok(None),
            SignalType::DESTINATION_UP => self.handle_destination_up(payload),
            SignalType::DESTINATION_UP_ACK => self.handle_destination_up_ack(payload),
            SignalType::DESTINATION_DOWN => self.handle_destination_down(payload),
            SignalType::DESTINATION_DOWN_ACK => self.handle_destination_down_ack(payload),
            SignalType::PEER_TERMINATION => self.handle_peer_termination(),
            SignalType::PEER_TERMINATION_ACK => {
                self.drain_neighbors();
                self.state = SessionState::Terminated;
                Ok(None)
            }
            // Only DESTINATION_UPDATE reaches here: `signal_is_legal` admits
            // it in `InSession` but no extension in this registry declares
            // any TLVs against it yet, so there is nothing to process.
            _ => Ok(None),
        };

        match outcome {
            Err(NetworkError::Codec(_)) => self.terminate_with(now, StatusCode::InvalidTlv),
            other => other,
        }
    }

    /// Build an outgoing Peer Termination carrying `status`, move to
    /// `Terminating`, and arm the same deadline a peer-init handshake uses —
    /// if the peer never sends back a Peer Termination Ack, `check_timeouts`
    /// tears the session down anyway.
    fn terminate_with(&mut self, now: Instant, status: StatusCode) -> NetworkResult<Option<Vec<u8>>> {
        tracing::warn!(state = self.state.name(), %status, "terminating session locally");
        let mut buf = Vec::new();
        let mut writer = Writer::new(&mut buf);
        writer.begin_signal(SignalType::PEER_TERMINATION)?;
        writer.add_tlv(TlvType::STATUS, &[status as u8])?;
        writer.finish_signal()?;
        self.state = SessionState::Terminating;
        self.terminate_deadline = Some(now + PEER_INIT_TIMEOUT);
        Ok(Some(buf))
    }

    fn signal_is_legal(&self, signal: SignalType) -> bool {
        use SessionState::*;
        match (self.state, self.role) {
            (WaitingPeerInit, Role::Radio) => signal == SignalType::PEER_INITIALIZATION,
            (WaitingPeerInitAck, Role::Router) => signal == SignalType::PEER_INITIALIZATION_ACK,
            (InSession, _) => matches!(
                signal,
                SignalType::HEARTBEAT
                    | SignalType::DESTINATION_UP
                    | SignalType::DESTINATION_UP_ACK
                    | SignalType::DESTINATION_UPDATE
                    | SignalType::DESTINATION_DOWN
                    | SignalType::DESTINATION_DOWN_ACK
                    | SignalType::PEER_TERMINATION
            ),
            (Terminating, _) => signal == SignalType::PEER_TERMINATION_ACK,
            _ => false,
        }
    }

    fn handle_peer_init(&mut self, now: Instant, payload: &[u8]) -> NetworkResult<Option<Vec<u8>>> {
        // First pass with just the baseline TLVs declared, to learn which
        // extensions the peer offers before the per-extension parser for
        // this signal can be built.
        let mut negotiation_parser = SignalParser::new();
        negotiation_parser.allow(
            TlvType::EXTENSIONS_SUPPORTED,
            TlvConstraint::range(0, u16::MAX as usize, false),
        );
        negotiation_parser.allow(TlvType::HEARTBEAT_INTERVAL, TlvConstraint::fixed(2, true));
        negotiation_parser.allow(TlvType::PEER_TYPE, TlvConstraint::range(0, 80, false));
        negotiation_parser.parse(payload)?;
        let peer_ids = extract_extension_ids(&negotiation_parser, payload);
        self.negotiated = self.registry.negotiate(&peer_ids);
        self.rebuild_parsers();

        self.parser_for(SignalType::PEER_INITIALIZATION).parse(payload)?;
        let parser = self
            .parsers
            .get(&SignalType::PEER_INITIALIZATION)
            .expect("just populated by parser_for");
        let heartbeat_value = parser
            .first(TlvType::HEARTBEAT_INTERVAL)
            .expect("mandatory, validated by parser");
        let heartbeat_ms = u16::from_be_bytes(
            parser
                .bytes(payload, heartbeat_value)
                .try_into()
                .expect("2-byte tlv, validated by parser"),
        );
        self.remote_heartbeat_interval = Duration::from_millis(heartbeat_ms as u64);

        self.state = SessionState::InSession;
        self.peer_init_deadline = None;
        self.next_heartbeat_at = now + self.config.heartbeat_interval();

        let mut buf = Vec::new();
        let mut writer = Writer::new(&mut buf);
        writer.begin_signal(SignalType::PEER_INITIALIZATION_ACK)?;
        writer.add_tlv(TlvType::STATUS, &[StatusCode::Success as u8])?;
        writer.add_tlv(
            TlvType::HEARTBEAT_INTERVAL,
            &(self.config.heartbeat_interval_ms as u16).to_be_bytes(),
        )?;
        writer.add_tlv(TlvType::EXTENSIONS_SUPPORTED, &encode_extension_ids(&self.local_extension_ids()))?;
        self.registry.dispatch_emit(
            &self.negotiated,
            self.role,
            SignalType::PEER_INITIALIZATION_ACK,
            &mut writer,
            self.store.as_ref(),
            &self.net,
            None,
        )?;
        writer.finish_signal()?;
        Ok(Some(buf))
    }

    fn handle_peer_init_ack(&mut self, now: Instant, payload: &[u8]) -> NetworkResult<Option<Vec<u8>>> {
        let mut negotiation_parser = SignalParser::new();
        negotiation_parser.allow(
            TlvType::EXTENSIONS_SUPPORTED,
            TlvConstraint::range(0, u16::MAX as usize, false),
        );
        negotiation_parser.allow(TlvType::STATUS, TlvConstraint::fixed(1, true));
        negotiation_parser.allow(TlvType::HEARTBEAT_INTERVAL, TlvConstraint::fixed(2, true));
        negotiation_parser.allow(TlvType::PEER_TYPE, TlvConstraint::range(0, 80, false));
        negotiation_parser.parse(payload)?;

        let status_value = negotiation_parser
            .first(TlvType::STATUS)
            .expect("mandatory, validated by parser");
        let status_byte = negotiation_parser.bytes(payload, status_value)[0];
        if let Ok(status) = StatusCode::try_from(status_byte) {
            if status != StatusCode::Success {
                self.state = SessionState::Terminated;
                return Err(NetworkError::PeerRejected(status));
            }
        }

        let peer_ids = extract_extension_ids(&negotiation_parser, payload);
        self.negotiated = self.registry.negotiate(&peer_ids);
        self.rebuild_parsers();

        let heartbeat_value = negotiation_parser
            .first(TlvType::HEARTBEAT_INTERVAL)
            .expect("mandatory, validated by parser");
        let heartbeat_ms = u16::from_be_bytes(
            negotiation_parser
                .bytes(payload, heartbeat_value)
                .try_into()
                .expect("2-byte tlv, validated by parser"),
        );
        self.remote_heartbeat_interval = Duration::from_millis(heartbeat_ms as u64);

        self.state = SessionState::InSession;
        self.peer_init_deadline = None;
        self.next_heartbeat_at = now + self.config.heartbeat_interval();
        Ok(None)
    }

    fn handle_destination_up(&mut self, payload: &[u8]) -> NetworkResult<Option<Vec<u8>>> {
        self.parser_for(SignalType::DESTINATION_UP).parse(payload)?;
        let parser = self
            .parsers
            .get(&SignalType::DESTINATION_UP)
            .expect("just populated by parser_for");
        let mac = parser.mac(payload, TlvType::MAC_ADDRESS)?;

        let outcome = self.registry.dispatch_process(
            &self.negotiated,
            self.role,
            SignalType::DESTINATION_UP,
            payload,
            parser,
            self.store.as_ref(),
            &self.net,
            Some(mac),
        );

        let status = outcome.err().unwrap_or(StatusCode::Success);
        self.build_destination_up_ack(mac, status)
    }

    fn build_destination_up_ack(&self, mac: MacAddr, status: StatusCode) -> NetworkResult<Option<Vec<u8>>> {
        let mut buf = Vec::new();
        let mut writer = Writer::new(&mut buf);
        writer.begin_signal(SignalType::DESTINATION_UP_ACK)?;
        writer.add_tlv(TlvType::MAC_ADDRESS, mac.as_bytes())?;
        writer.add_tlv(TlvType::STATUS, &[status as u8])?;
        writer.finish_signal()?;
        Ok(Some(buf))
    }

    fn handle_destination_up_ack(&mut self, payload: &[u8]) -> NetworkResult<Option<Vec<u8>>> {
        self.parser_for(SignalType::DESTINATION_UP_ACK).parse(payload)?;
        let parser = self
            .parsers
            .get(&SignalType::DESTINATION_UP_ACK)
            .expect("just populated by parser_for");
        let mac = parser.mac(payload, TlvType::MAC_ADDRESS)?;
        self.neighbors.mark_up_acked(mac);
        Ok(None)
    }

    fn handle_destination_down(&mut self, payload: &[u8]) -> NetworkResult<Option<Vec<u8>>> {
        self.parser_for(SignalType::DESTINATION_DOWN).parse(payload)?;
        let parser = self
            .parsers
            .get(&SignalType::DESTINATION_DOWN)
            .expect("just populated by parser_for");
        let mac = parser.mac(payload, TlvType::MAC_ADDRESS)?;
        self.neighbors.remove(mac);
        self.cleanup_neighbor(mac);

        let mut buf = Vec::new();
        let mut writer = Writer::new(&mut buf);
        writer.begin_signal(SignalType::DESTINATION_DOWN_ACK)?;
        writer.add_tlv(TlvType::MAC_ADDRESS, mac.as_bytes())?;
        writer.add_tlv(TlvType::STATUS, &[StatusCode::Success as u8])?;
        writer.finish_signal()?;
        Ok(Some(buf))
    }

    fn handle_destination_down_ack(&mut self, payload: &[u8]) -> NetworkResult<Option<Vec<u8>>> {
        self.parser_for(SignalType::DESTINATION_DOWN_ACK).parse(payload)?;
        let parser = self
            .parsers
            .get(&SignalType::DESTINATION_DOWN_ACK)
            .expect("just populated by parser_for");
        let mac = parser.mac(payload, TlvType::MAC_ADDRESS)?;
        self.neighbors.mark_down_acked_and_remove(mac);
        Ok(None)
    }

    fn handle_peer_termination(&mut self) -> NetworkResult<Option<Vec<u8>>> {
        self.state = SessionState::Terminating;
        self.drain_neighbors();
        let mut buf = Vec::new();
        let mut writer = Writer::new(&mut buf);
        writer.begin_signal(SignalType::PEER_TERMINATION_ACK)?;
        writer.finish_signal()?;
        self.state = SessionState::Terminated;
        Ok(Some(buf))
    }

    /// Build an outgoing Destination Up signal for `mac`, announcing it to
    /// the peer and arming its ack timer.
    pub fn announce_destination_up(&mut self, now: Instant, mac: MacAddr) -> NetworkResult<Vec<u8>> {
        let mut buf = Vec::new();
        let mut writer = Writer::new(&mut buf);
        writer.begin_signal(SignalType::DESTINATION_UP)?;
        writer.add_tlv(TlvType::MAC_ADDRESS, mac.as_bytes())?;
        self.registry.dispatch_emit(
            &self.negotiated,
            self.role,
            SignalType::DESTINATION_UP,
            &mut writer,
            self.store.as_ref(),
            &self.net,
            Some(mac),
        )?;
        writer.finish_signal()?;
        self.neighbors
            .mark_up_sent(mac, self.config.heartbeat_ack_timeout(), now);
        Ok(buf)
    }

    /// Build an outgoing Destination Down signal for `mac`.
    pub fn announce_destination_down(&mut self, now: Instant, mac: MacAddr) -> NetworkResult<Vec<u8>> {
        let mut buf = Vec::new();
        let mut writer = Writer::new(&mut buf);
        writer.begin_signal(SignalType::DESTINATION_DOWN)?;
        writer.add_tlv(TlvType::MAC_ADDRESS, mac.as_bytes())?;
        writer.finish_signal()?;
        self.neighbors
            .mark_down_sent(mac, self.config.heartbeat_ack_timeout(), now);
        Ok(buf)
    }

    /// True if a heartbeat is due to be sent as of `now`.
    pub fn heartbeat_due(&self, now: Instant) -> bool {
        self.state == SessionState::InSession && now >= self.next_heartbeat_at
    }

    pub fn build_heartbeat(&mut self, now: Instant) -> NetworkResult<Vec<u8>> {
        self.next_heartbeat_at = now + self.config.heartbeat_interval();
        let mut buf = Vec::new();
        let mut writer = Writer::new(&mut buf);
        writer.begin_signal(SignalType::HEARTBEAT)?;
        writer.finish_signal()?;
        Ok(buf)
    }

    /// Check every timeout this session tracks, returning the first one
    /// that fired. The caller tears the session down on any `Some`.
    ///
    /// A per-neighbor ack timeout does not fire this way — §4.5 scopes that
    /// timeout to the one destination it was armed for, not the session, so
    /// it's handled inline below by dropping just that neighbor.
    pub fn check_timeouts(&mut self, now: Instant) -> Option<SessionEnd> {
        if let Some(deadline) = self.peer_init_deadline {
            if now >= deadline {
                self.state = SessionState::Terminated;
                return Some(SessionEnd::PeerInitTimeout);
            }
        }
        if let Some(deadline) = self.terminate_deadline {
            if now >= deadline {
                self.drain_neighbors();
                self.state = SessionState::Terminated;
                return Some(SessionEnd::TerminatedLocally);
            }
        }
        if self.state == SessionState::InSession {
            // The peer is presumed unreachable, not merely slow with one
            // destination: §4.6(b)'s liveness window is 2x the interval the
            // *peer* advertised, not this side's own — two different
            // sessions can run different heartbeat intervals.
            let remote_timeout = self.remote_heartbeat_interval * 2;
            if now.duration_since(self.last_received_at) >= remote_timeout {
                self.drain_neighbors();
                self.state = SessionState::Terminated;
                return Some(SessionEnd::HeartbeatTimeout);
            }

            // One destination's ack never arrived: that destination alone is
            // declared lost, the session otherwise stays up.
            for mac in self.neighbors.timed_out(now) {
                self.neighbors.remove(mac);
                self.cleanup_neighbor(mac);
            }
        }
        None
    }
}

fn encode_extension_ids(ids: &[ExtensionId]) -> Vec<u8> {
    ids.iter().flat_map(|id| id.0.to_be_bytes()).collect()
}

fn extract_extension_ids(parser: &SignalParser, payload: &[u8]) -> Vec<ExtensionId> {
    let Some(value) = parser.first(TlvType::EXTENSIONS_SUPPORTED) else {
        return Vec::new();
    };
    let bytes = parser.bytes(payload, value);
    bytes
        .chunks_exact(2)
        .map(|chunk| ExtensionId(u16::from_be_bytes([chunk[0], chunk[1]])))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlep_types::layer2::InMemoryLayer2Store;
    use dlep_extensions::base::BaseExtension;

    fn registry() -> Arc<ExtensionRegistry> {
        let mut registry = ExtensionRegistry::new();
        registry.register(Arc::new(BaseExtension));
        Arc::new(registry)
    }

    fn store() -> Arc<dyn Layer2Store> {
        Arc::new(InMemoryLayer2Store::new())
    }

    #[test]
    fn router_session_reaches_in_session_after_peer_init_ack() {
        let now = Instant::now();
        let mut router = Session::new(
            Role::Router,
            SessionConfig::default(),
            registry(),
            store(),
            L2NetworkId("wlan0".into()),
            now,
        );
        let mut radio = Session::new(
            Role::Radio,
            SessionConfig::default(),
            registry(),
            store(),
            L2NetworkId("wlan0".into()),
            now,
        );

        let init = router.build_peer_init().unwrap();
        let (signal, payload, _) = dlep_codec::unframe_signal(&init).unwrap();
        let ack = radio.receive(now, signal, payload).unwrap().unwrap();
        assert_eq!(radio.state(), SessionState::InSession);

        let (ack_signal, ack_payload, _) = dlep_codec::unframe_signal(&ack).unwrap();
        router.receive(now, ack_signal, ack_payload).unwrap();
        assert_eq!(router.state(), SessionState::InSession);
    }

    #[test]
    fn destination_up_round_trips_to_ack() {
        let now = Instant::now();
        let mac = MacAddr::new([1, 2, 3, 4, 5, 6]);
        let mut radio = Session::new(
            Role::Radio,
            SessionConfig::default(),
            registry(),
            store(),
            L2NetworkId("wlan0".into()),
            now,
        );
        radio.state = SessionState::InSession;

        let signal = radio.announce_destination_up(now, mac).unwrap();
        assert_eq!(radio.neighbors().get(mac).unwrap().state, dlep_types::neighbor::NeighborState::UpSent);

        let mut router = Session::new(
            Role::Router,
            SessionConfig::default(),
            registry(),
            store(),
            L2NetworkId("wlan0".into()),
            now,
        );
        router.state = SessionState::InSession;
        let (signal_type, payload, _) = dlep_codec::unframe_signal(&signal).unwrap();
        let ack = router.receive(now, signal_type, payload).unwrap().unwrap();

        let (ack_type, ack_payload, _) = dlep_codec::unframe_signal(&ack).unwrap();
        radio.receive(now, ack_type, ack_payload).unwrap();
        assert_eq!(radio.neighbors().get(mac).unwrap().state, dlep_types::neighbor::NeighborState::UpAcked);
    }

    #[test]
    fn peer_init_timeout_fires_after_deadline() {
        let now = Instant::now();
        let mut radio = Session::new(
            Role::Radio,
            SessionConfig::default(),
            registry(),
            store(),
            L2NetworkId("wlan0".into()),
            now,
        );
        assert!(radio.check_timeouts(now).is_none());
        let later = now + PEER_INIT_TIMEOUT;
        assert_eq!(radio.check_timeouts(later), Some(SessionEnd::PeerInitTimeout));
    }

    #[test]
    fn signal_outside_state_machine_gets_a_peer_termination_reply() {
        let now = Instant::now();
        let mac = MacAddr::new([1, 2, 3, 4, 5, 6]);
        let mut radio = Session::new(
            Role::Radio,
            SessionConfig::default(),
            registry(),
            store(),
            L2NetworkId("wlan0".into()),
            now,
        );
        // Still WaitingPeerInit: a Destination Up is illegal here.
        let mut buf = Vec::new();
        let mut writer = Writer::new(&mut buf);
        writer.begin_signal(SignalType::DESTINATION_UP).unwrap();
        writer.add_tlv(TlvType::MAC_ADDRESS, mac.as_bytes()).unwrap();
        writer.finish_signal().unwrap();
        let (signal, payload, _) = dlep_codec::unframe_signal(&buf).unwrap();

        let reply = radio.receive(now, signal, payload).unwrap().unwrap();
        assert_eq!(radio.state(), SessionState::Terminating);
        let (reply_signal, _, _) = dlep_codec::unframe_signal(&reply).unwrap();
        assert_eq!(reply_signal, SignalType::PEER_TERMINATION);
    }

    #[test]
    fn unrecognized_signal_terminates_with_unknown_signal_status() {
        let now = Instant::now();
        let mut radio = Session::new(
            Role::Radio,
            SessionConfig::default(),
            registry(),
            store(),
            L2NetworkId("wlan0".into()),
            now,
        );
        let mut buf = Vec::new();
        let mut writer = Writer::new(&mut buf);
        writer.begin_signal(SignalType(0xFFFE)).unwrap();
        writer.finish_signal().unwrap();
        let (signal, payload, _) = dlep_codec::unframe_signal(&buf).unwrap();

        let reply = radio.receive(now, signal, payload).unwrap().unwrap();
        let (_, reply_payload, _) = dlep_codec::unframe_signal(&reply).unwrap();
        assert_eq!(reply_payload[reply_payload.len() - 1], StatusCode::UnknownSignal as u8);
        assert_eq!(radio.state(), SessionState::Terminating);
    }

    #[test]
    fn terminating_session_times_out_if_no_ack_arrives() {
        let now = Instant::now();
        let mut radio = Session::new(
            Role::Radio,
            SessionConfig::default(),
            registry(),
            store(),
            L2NetworkId("wlan0".into()),
            now,
        );
        radio.terminate_with(now, StatusCode::InvalidTlv).unwrap();
        assert!(radio.check_timeouts(now).is_none());
        assert_eq!(
            radio.check_timeouts(now + PEER_INIT_TIMEOUT),
            Some(SessionEnd::TerminatedLocally)
        );
    }

    #[test]
    fn missing_mandatory_tlv_in_peer_init_terminates_with_invalid_tlv_status() {
        let now = Instant::now();
        let mut radio = Session::new(
            Role::Radio,
            SessionConfig::default(),
            registry(),
            store(),
            L2NetworkId("wlan0".into()),
            now,
        );
        // Peer Initialization with no TLVs at all: HEARTBEAT_INTERVAL is mandatory.
        let mut buf = Vec::new();
        let mut writer = Writer::new(&mut buf);
        writer.begin_signal(SignalType::PEER_INITIALIZATION).unwrap();
        writer.finish_signal().unwrap();
        let (signal, payload, _) = dlep_codec::unframe_signal(&buf).unwrap();

        let reply = radio.receive(now, signal, payload).unwrap().unwrap();
        let (reply_signal, reply_payload, _) = dlep_codec::unframe_signal(&reply).unwrap();
        assert_eq!(reply_signal, SignalType::PEER_TERMINATION);
        assert_eq!(reply_payload[reply_payload.len() - 1], StatusCode::InvalidTlv as u8);
        assert_eq!(radio.state(), SessionState::Terminating);
    }
}
