//! The `Extension` trait: the unit of pluggable DLEP behavior.
//!
//! Grounded on `dlep_extension.c`'s per-extension `process_radio` /
//! `process_router` / `add_radio_tlvs` / `add_router_tlvs` callback
//! quartet. The C code attaches these as raw function pointers per role;
//! here a single trait carries both roles and the caller passes its own
//! [`Role`](dlep_types::role::Role) so an extension's process/emit logic
//! can share code between radio and router sides where the original let
//! two statically-typed callbacks drift out of sync.

use dlep_types::layer2::{L2NetworkId, Layer2Store};
use dlep_types::mac::MacAddr;
use dlep_types::role::Role;
use dlep_types::signal::SignalType;

use dlep_codec::{CodecResult, SignalParser, TlvConstraint, Writer};

/// A 16-bit extension identifier, carried in the Extensions Supported TLV
/// during peer negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExtensionId(pub u16);

impl ExtensionId {
    /// The always-present baseline extension (peer type, heartbeat interval,
    /// and the other mandatory session-init fields).
    pub const BASE: ExtensionId = ExtensionId(0);
    /// The worked metrics extension (current/max data rate, latency).
    pub const METRICS: ExtensionId = ExtensionId(1);
}

/// Result of an extension processing a received signal's TLVs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The extension consumed what it needed; the session can proceed.
    Ok,
    /// The extension found nothing relevant to it in this signal; not an
    /// error, just a no-op for this particular extension.
    Deferred,
    /// The extension rejects the signal outright; the session must answer
    /// with this status rather than continuing to the next extension.
    Fail(dlep_types::status::StatusCode),
}

/// One pluggable unit of DLEP behavior: a TLV vocabulary plus the logic to
/// consume it from received signals and contribute it to outgoing ones.
///
/// Implementations must be stateless with respect to any particular
/// session — all session-scoped state (negotiated metrics, timers) lives in
/// `dlep-network::session::Session`; an `Extension` only ever reads from and
/// writes to the `Layer2Store` handed to it, scoped by network id and MAC.
pub trait Extension: Send + Sync {
    fn id(&self) -> ExtensionId;

    fn name(&self) -> &'static str;

    /// TLVs this extension contributes to `signal`, with their length
    /// constraints. The session's parser for `signal` is built by folding
    /// this over every negotiated extension before the first signal of
    /// that type is parsed.
    fn declare_tlvs(&self, signal: SignalType) -> Vec<(dlep_types::tlv::TlvType, TlvConstraint)>;

    /// Consume this extension's TLVs from an already-validated signal.
    ///
    /// `mac` is the signal's subject destination, if it has one (absent for
    /// peer-scoped signals like Peer Update). `net` and `store` are the
    /// layer-2 database scope the session operates against.
    #[allow(clippy::too_many_arguments)]
    fn process(
        &self,
        role: Role,
        signal: SignalType,
        payload: &[u8],
        parser: &SignalParser,
        store: &dyn Layer2Store,
        net: &L2NetworkId,
        mac: Option<MacAddr>,
    ) -> DispatchOutcome;

    /// Contribute this extension's TLVs to an outgoing signal.
    #[allow(clippy::too_many_arguments)]
    fn emit(
        &self,
        role: Role,
        signal: SignalType,
        writer: &mut Writer<'_>,
        store: &dyn Layer2Store,
        net: &L2NetworkId,
        mac: Option<MacAddr>,
    ) -> CodecResult<()>;

    /// Clear whatever layer-2 state this extension owns for `mac` on `net`.
    /// Called once a destination goes down, its ack times out, or the
    /// session carrying it ends, so a mediator never leaves a stale value
    /// behind. Default no-op: most extensions have nothing `remove_neighbor`
    /// scoped to clear.
    fn cleanup_neighbor(&self, _store: &dyn Layer2Store, _net: &L2NetworkId, _mac: MacAddr) {}
}
