//! The always-registered baseline extension.
//!
//! Declares the mandatory baseline TLVs for the signals spec §6 fixes, so
//! every session's parser rejects baseline signals missing them regardless
//! of which optional extensions are negotiated. It does not itself read or
//! write layer-2 state — `dlep-network::session` handles peer type and
//! heartbeat interval directly, since they govern the session state
//! machine rather than any extension's data model. Grounded on
//! `dlep_extension_init`'s always-first entry in the extension tree.

use dlep_types::layer2::{L2NetworkId, Layer2Store};
use dlep_types::mac::MacAddr;
use dlep_types::role::Role;
use dlep_types::signal::SignalType;
use dlep_types::tlv::TlvType;

use dlep_codec::{CodecResult, SignalParser, TlvConstraint, Writer};

use crate::extension::{DispatchOutcome, Extension, ExtensionId};

pub struct BaseExtension;

impl Extension for BaseExtension {
    fn id(&self) -> ExtensionId {
        ExtensionId::BASE
    }

    fn name(&self) -> &'static str {
        "base"
    }

    fn declare_tlvs(&self, signal: SignalType) -> Vec<(TlvType, TlvConstraint)> {
        match signal {
            SignalType::PEER_INITIALIZATION => vec![
                (TlvType::HEARTBEAT_INTERVAL, TlvConstraint::fixed(2, true)),
                (TlvType::EXTENSIONS_SUPPORTED, TlvConstraint::range(0, u16::MAX as usize, false)),
                (TlvType::PEER_TYPE, TlvConstraint::range(0, 80, false)),
            ],
            SignalType::PEER_INITIALIZATION_ACK => vec![
                (TlvType::STATUS, TlvConstraint::fixed(1, true)),
                (TlvType::HEARTBEAT_INTERVAL, TlvConstraint::fixed(2, true)),
                (TlvType::EXTENSIONS_SUPPORTED, TlvConstraint::range(0, u16::MAX as usize, false)),
                (TlvType::PEER_TYPE, TlvConstraint::range(0, 80, false)),
            ],
            SignalType::PEER_TERMINATION | SignalType::PEER_TERMINATION_ACK => {
                vec![(TlvType::STATUS, TlvConstraint::fixed(1, false))]
            }
            SignalType::DESTINATION_UP
            | SignalType::DESTINATION_UP_ACK
            | SignalType::DESTINATION_DOWN
            | SignalType::DESTINATION_DOWN_ACK
            | SignalType::DESTINATION_UPDATE => vec![
                (TlvType::MAC_ADDRESS, TlvConstraint::fixed(6, true)),
                (TlvType::STATUS, TlvConstraint::fixed(1, false)),
            ],
            _ => Vec::new(),
        }
    }

    fn process(
        &self,
        _role: Role,
        _signal: SignalType,
        _payload: &[u8],
        _parser: &SignalParser,
        _store: &dyn Layer2Store,
        _net: &L2NetworkId,
        _mac: Option<MacAddr>,
    ) -> DispatchOutcome {
        DispatchOutcome::Deferred
    }

    fn emit(
        &self,
        _role: Role,
        _signal: SignalType,
        _writer: &mut Writer<'_>,
        _store: &dyn Layer2Store,
        _net: &L2NetworkId,
        _mac: Option<MacAddr>,
    ) -> CodecResult<()> {
        Ok(())
    }
}
