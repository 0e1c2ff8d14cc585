//! Extension registry and negotiation/dispatch.
//!
//! Mirrors `dlep_extension_add`'s idempotent-by-id registration and
//! `dlep_extension_get_ids`'s insertion-ordered id list, adapted to the
//! teacher's `ActorRegistry` shape (`libs/actors/src/registry.rs`): a
//! `HashMap` keyed lookup plus a stable ordered list, built once at startup
//! and read many times per session — so plain `Vec`/`HashMap` stand in for
//! the teacher's `Arc<RwLock<_>>`, since extensions are frozen before any
//! session exists (spec §5).

use std::collections::HashMap;
use std::sync::Arc;

use dlep_types::layer2::{L2NetworkId, Layer2Store};
use dlep_types::mac::MacAddr;
use dlep_types::role::Role;
use dlep_types::signal::SignalType;
use dlep_types::status::StatusCode;

use dlep_codec::{CodecResult, SignalParser, Writer};

use crate::extension::{DispatchOutcome, Extension, ExtensionId};

/// The set of extensions a daemon instance knows about, fixed at startup.
#[derive(Default)]
pub struct ExtensionRegistry {
    order: Vec<ExtensionId>,
    by_id: HashMap<ExtensionId, Arc<dyn Extension>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `extension`. A second registration under the same id is a
    /// no-op, keeping the first registrant — matching `dlep_extension_add`'s
    /// `avl_is_node_added` guard.
    pub fn register(&mut self, extension: Arc<dyn Extension>) {
        let id = extension.id();
        if self.by_id.contains_key(&id) {
            tracing::debug!(extension = extension.name(), ?id, "extension already registered, ignoring");
            return;
        }
        tracing::info!(extension = extension.name(), ?id, "registered extension");
        self.order.push(id);
        self.by_id.insert(id, extension);
    }

    /// Every registered extension's id, in registration order.
    pub fn ids(&self) -> &[ExtensionId] {
        &self.order
    }

    pub fn get(&self, id: ExtensionId) -> Option<&Arc<dyn Extension>> {
        self.by_id.get(&id)
    }

    /// Intersect the locally-registered extension ids with the set the
    /// peer advertised in its Extensions Supported TLV, preserving this
    /// registry's order. This is the negotiated extension set both sides
    /// of a session now use.
    pub fn negotiate(&self, peer_ids: &[ExtensionId]) -> Vec<ExtensionId> {
        self.order
            .iter()
            .copied()
            .filter(|id| peer_ids.contains(id))
            .collect()
    }

    /// Fold every negotiated extension's TLV declarations for `signal` into
    /// `parser`, so it validates exactly the TLVs this peer pair agreed on.
    pub fn configure_parser(
        &self,
        negotiated: &[ExtensionId],
        signal: SignalType,
        parser: &mut SignalParser,
    ) {
        for id in negotiated {
            let Some(extension) = self.get(*id) else {
                continue;
            };
            for (tlv_type, constraint) in extension.declare_tlvs(signal) {
                parser.allow(tlv_type, constraint);
            }
        }
    }

    /// Run every negotiated extension's `process` over a received signal.
    ///
    /// Extensions run in registration order; the first `Fail` short-circuits
    /// and is returned to the caller as the status to answer with. A
    /// `Deferred` from one extension does not prevent a later extension
    /// from handling the same signal — each extension looks only for the
    /// TLVs it declared.
    #[allow(clippy::too_many_arguments)]
    pub fn dispatch_process(
        &self,
        negotiated: &[ExtensionId],
        role: Role,
        signal: SignalType,
        payload: &[u8],
        parser: &SignalParser,
        store: &dyn Layer2Store,
        net: &L2NetworkId,
        mac: Option<MacAddr>,
    ) -> Result<(), StatusCode> {
        for id in negotiated {
            let Some(extension) = self.get(*id) else {
                continue;
            };
            match extension.process(role, signal, payload, parser, store, net, mac) {
                DispatchOutcome::Ok | DispatchOutcome::Deferred => continue,
                DispatchOutcome::Fail(status) => return Err(status),
            }
        }
        Ok(())
    }

    /// Run every negotiated extension's `emit` over an outgoing signal, in
    /// registration order.
    #[allow(clippy::too_many_arguments)]
    pub fn dispatch_emit(
        &self,
        negotiated: &[ExtensionId],
        role: Role,
        signal: SignalType,
        writer: &mut Writer<'_>,
        store: &dyn Layer2Store,
        net: &L2NetworkId,
        mac: Option<MacAddr>,
    ) -> CodecResult<()> {
        for id in negotiated {
            let Some(extension) = self.get(*id) else {
                continue;
            };
            extension.emit(role, signal, writer, store, net, mac)?;
        }
        Ok(())
    }

    /// Run every negotiated extension's `cleanup_neighbor` for `mac`, e.g.
    /// once a destination goes down, its ack times out, or the session ends.
    pub fn dispatch_cleanup_neighbor(
        &self,
        negotiated: &[ExtensionId],
        store: &dyn Layer2Store,
        net: &L2NetworkId,
        mac: MacAddr,
    ) {
        for id in negotiated {
            let Some(extension) = self.get(*id) else {
                continue;
            };
            extension.cleanup_neighbor(store, net, mac);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::BaseExtension;
    use crate::metrics::MetricsExtension;

    #[test]
    fn register_is_idempotent_per_id() {
        let mut registry = ExtensionRegistry::new();
        registry.register(Arc::new(BaseExtension));
        registry.register(Arc::new(BaseExtension));
        assert_eq!(registry.ids(), &[ExtensionId::BASE]);
    }

    #[test]
    fn negotiate_intersects_and_preserves_local_order() {
        let mut registry = ExtensionRegistry::new();
        registry.register(Arc::new(BaseExtension));
        registry.register(Arc::new(MetricsExtension));

        let peer_ids = vec![ExtensionId::METRICS, ExtensionId(99)];
        let negotiated = registry.negotiate(&peer_ids);
        assert_eq!(negotiated, vec![ExtensionId::METRICS]);
    }
}

#[cfg(test)]
mod negotiate_properties {
    use super::*;
    use crate::base::BaseExtension;
    use crate::metrics::MetricsExtension;
    use proptest::prelude::*;

    fn fixed_registry() -> ExtensionRegistry {
        let mut registry = ExtensionRegistry::new();
        registry.register(Arc::new(BaseExtension));
        registry.register(Arc::new(MetricsExtension));
        registry
    }

    proptest! {
        /// Whatever the peer advertises, negotiated ids are always a subset of
        /// this side's own registered ids, in this side's registration order —
        /// an unrecognized or duplicated peer id can never introduce an id this
        /// registry doesn't itself carry, or reorder the locally-fixed list.
        #[test]
        fn negotiated_is_always_a_local_subset_in_local_order(
            peer_ids in prop::collection::vec(0u16..10, 0..10)
        ) {
            let registry = fixed_registry();
            let peer_ids: Vec<ExtensionId> = peer_ids.into_iter().map(ExtensionId).collect();
            let negotiated = registry.negotiate(&peer_ids);

            prop_assert!(negotiated.iter().all(|id| registry.ids().contains(id)));
            let local_positions: Vec<usize> = negotiated
                .iter()
                .map(|id| registry.ids().iter().position(|local| local == id).unwrap())
                .collect();
            prop_assert!(local_positions.windows(2).all(|w| w[0] < w[1]));
        }

        /// A peer that advertises every id this registry has negotiates to
        /// the registry's full id list, unchanged.
        #[test]
        fn advertising_everything_negotiates_to_the_full_local_set(
            extra in prop::collection::vec(100u16..200, 0..5)
        ) {
            let registry = fixed_registry();
            let mut peer_ids = registry.ids().to_vec();
            peer_ids.extend(extra.into_iter().map(ExtensionId));
            prop_assert_eq!(registry.negotiate(&peer_ids), registry.ids().to_vec());
        }
    }
}
