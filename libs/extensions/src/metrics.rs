//! The worked metrics extension: current/max data rate and latency.
//!
//! Grounded on `dlep_extension_router_process_destination` and
//! `dlep_extension_radio_write_destination` in `dlep_extension.c`: the
//! radio side writes locally-known link metrics into outgoing destination
//! signals (falling back to the network's configured default when no
//! neighbor-specific value is known, via `oonf_layer2_has_value`/
//! `oonf_layer2_set_value`), and the router side writes whatever it
//! receives straight into its local layer-2 database.

use byteorder::{BigEndian, ByteOrder};

use dlep_types::layer2::{L2Attribute, L2NetworkId, Layer2Store, Origin};
use dlep_types::mac::MacAddr;
use dlep_types::role::Role;
use dlep_types::signal::SignalType;
use dlep_types::tlv::TlvType;

use dlep_codec::{CodecResult, SignalParser, TlvConstraint, Writer};

use crate::extension::{DispatchOutcome, Extension, ExtensionId};

/// Stamp used for every value this extension writes into a `Layer2Store`,
/// so `remove_neighbor` can clear exactly this extension's contribution.
pub const ORIGIN: Origin = Origin(1);

pub const CURRENT_DATARATE_TX: TlvType = TlvType(600);
pub const CURRENT_DATARATE_RX: TlvType = TlvType(601);
pub const MAX_DATARATE_TX: TlvType = TlvType(602);
pub const MAX_DATARATE_RX: TlvType = TlvType(603);
pub const LATENCY: TlvType = TlvType(604);

const METRIC_TLVS: &[(TlvType, L2Attribute)] = &[
    (CURRENT_DATARATE_TX, L2Attribute::CURRENT_DATARATE_TX),
    (CURRENT_DATARATE_RX, L2Attribute::CURRENT_DATARATE_RX),
    (MAX_DATARATE_TX, L2Attribute::MAX_DATARATE_TX),
    (MAX_DATARATE_RX, L2Attribute::MAX_DATARATE_RX),
    (LATENCY, L2Attribute::LATENCY),
];

pub struct MetricsExtension;

impl Extension for MetricsExtension {
    fn id(&self) -> ExtensionId {
        ExtensionId::METRICS
    }

    fn name(&self) -> &'static str {
        "metrics"
    }

    fn declare_tlvs(&self, signal: SignalType) -> Vec<(TlvType, TlvConstraint)> {
        match signal {
            SignalType::DESTINATION_UP | SignalType::DESTINATION_UPDATE => METRIC_TLVS
                .iter()
                .map(|(tlv, _)| (*tlv, TlvConstraint::fixed(4, false)))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn process(
        &self,
        role: Role,
        signal: SignalType,
        payload: &[u8],
        parser: &SignalParser,
        store: &dyn Layer2Store,
        net: &L2NetworkId,
        mac: Option<MacAddr>,
    ) -> DispatchOutcome {
        if !matches!(
            signal,
            SignalType::DESTINATION_UP | SignalType::DESTINATION_UPDATE
        ) {
            return DispatchOutcome::Deferred;
        }
        // Only the router side consumes metrics off the wire; the radio
        // side is their source of truth and writes them in `emit` instead.
        if role.is_radio() {
            return DispatchOutcome::Deferred;
        }
        let Some(mac) = mac else {
            return DispatchOutcome::Deferred;
        };

        let mut handled_any = false;
        for (tlv_type, attribute) in METRIC_TLVS {
            if let Some(value) = parser.first(*tlv_type) {
                let bytes = parser.bytes(payload, value);
                let parsed = BigEndian::read_u32(bytes) as i64;
                store.set_neighbor_attribute(net, mac, *attribute, parsed, ORIGIN);
                handled_any = true;
            }
        }
        if handled_any {
            DispatchOutcome::Ok
        } else {
            DispatchOutcome::Deferred
        }
    }

    fn emit(
        &self,
        role: Role,
        signal: SignalType,
        writer: &mut Writer<'_>,
        store: &dyn Layer2Store,
        net: &L2NetworkId,
        mac: Option<MacAddr>,
    ) -> CodecResult<()> {
        if !role.is_radio()
            || !matches!(
                signal,
                SignalType::DESTINATION_UP | SignalType::DESTINATION_UPDATE
            )
        {
            return Ok(());
        }
        let Some(mac) = mac else {
            return Ok(());
        };

        for (tlv_type, attribute) in METRIC_TLVS {
            let value = store
                .get_neighbor_attribute(net, mac, *attribute)
                .or_else(|| store.network_default_attribute(net, *attribute));
            if let Some(value) = value {
                let mut bytes = [0u8; 4];
                BigEndian::write_u32(&mut bytes, value as u32);
                writer.add_tlv(*tlv_type, &bytes)?;
            }
        }
        Ok(())
    }

    fn cleanup_neighbor(&self, store: &dyn Layer2Store, net: &L2NetworkId, mac: MacAddr) {
        store.remove_neighbor(net, mac, ORIGIN);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlep_codec::SignalParser;
    use dlep_types::layer2::InMemoryLayer2Store;

    fn mac() -> MacAddr {
        MacAddr::new([1, 2, 3, 4, 5, 6])
    }

    #[test]
    fn router_process_writes_received_metric_into_store() {
        let ext = MetricsExtension;
        let store = InMemoryLayer2Store::new();
        let net = L2NetworkId("wlan0".into());

        let mut payload = Vec::new();
        dlep_codec::write_tlv(&mut payload, LATENCY, &50u32.to_be_bytes()).unwrap();

        let mut parser = SignalParser::new();
        for (tlv, constraint) in ext.declare_tlvs(SignalType::DESTINATION_UP) {
            parser.allow(tlv, constraint);
        }
        parser.parse(&payload).unwrap();

        let outcome = ext.process(
            Role::Router,
            SignalType::DESTINATION_UP,
            &payload,
            &parser,
            &store,
            &net,
            Some(mac()),
        );
        assert_eq!(outcome, DispatchOutcome::Ok);
        assert_eq!(
            store.get_neighbor_attribute(&net, mac(), L2Attribute::LATENCY),
            Some(50)
        );
    }

    #[test]
    fn radio_emit_falls_back_to_network_default() {
        let ext = MetricsExtension;
        let store = InMemoryLayer2Store::new();
        let net = L2NetworkId("wlan0".into());
        store.set_network_default(&net, L2Attribute::MAX_DATARATE_TX, 54_000_000);

        let mut buf = Vec::new();
        let mut writer = Writer::new(&mut buf);
        writer.begin_signal(SignalType::DESTINATION_UP).unwrap();
        ext.emit(
            Role::Radio,
            SignalType::DESTINATION_UP,
            &mut writer,
            &store,
            &net,
            Some(mac()),
        )
        .unwrap();
        writer.finish_signal().unwrap();

        let (_, payload, _) = dlep_codec::unframe_signal(&buf).unwrap();
        let tlvs: Vec<_> = dlep_codec::iter_tlvs(payload).collect::<CodecResult<_>>().unwrap();
        assert!(tlvs.iter().any(|t| t.tlv_type == MAX_DATARATE_TX));
    }

    #[test]
    fn cleanup_neighbor_clears_only_this_extensions_origin() {
        let ext = MetricsExtension;
        let store = InMemoryLayer2Store::new();
        let net = L2NetworkId("wlan0".into());
        store.set_neighbor_attribute(&net, mac(), L2Attribute::LATENCY, 50, ORIGIN);
        store.set_neighbor_attribute(&net, mac(), L2Attribute::LATENCY, 99, dlep_types::layer2::Origin(7));

        ext.cleanup_neighbor(&store, &net, mac());

        assert_eq!(
            store.get_neighbor_attribute(&net, mac(), L2Attribute::LATENCY),
            Some(99)
        );
    }

    #[test]
    fn router_never_emits_metrics() {
        let ext = MetricsExtension;
        let store = InMemoryLayer2Store::new();
        let net = L2NetworkId("wlan0".into());
        store.set_network_default(&net, L2Attribute::MAX_DATARATE_TX, 1);

        let mut buf = Vec::new();
        let mut writer = Writer::new(&mut buf);
        writer.begin_signal(SignalType::DESTINATION_UP).unwrap();
        ext.emit(
            Role::Router,
            SignalType::DESTINATION_UP,
            &mut writer,
            &store,
            &net,
            Some(mac()),
        )
        .unwrap();
        writer.finish_signal().unwrap();

        let (_, payload, _) = dlep_codec::unframe_signal(&buf).unwrap();
        assert!(payload.is_empty());
    }
}
