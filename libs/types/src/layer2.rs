//! Layer-2 data model: the information the L2 mediator (C8) reads from and
//! writes to the layer-2 database on behalf of a session.
//!
//! Modeled as a trait, `Layer2Store`, so the mediator can be grounded against
//! an in-memory reference implementation here and swapped for a real
//! netlink/OONF-style backing store without touching mediator logic.

use std::collections::HashMap;

use crate::mac::MacAddr;

/// A layer-2 attribute key (current data rate, max data rate, latency, loss,
/// ...). Extensions own the concrete key set; this crate only carries the
/// value representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct L2Attribute(pub u32);

impl L2Attribute {
    pub const CURRENT_DATARATE_TX: L2Attribute = L2Attribute(1);
    pub const CURRENT_DATARATE_RX: L2Attribute = L2Attribute(2);
    pub const MAX_DATARATE_TX: L2Attribute = L2Attribute(3);
    pub const MAX_DATARATE_RX: L2Attribute = L2Attribute(4);
    pub const LATENCY: L2Attribute = L2Attribute(5);
    pub const RESOURCES: L2Attribute = L2Attribute(6);
}

/// Identifies the layer-2 network (interface) a neighbor entry belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct L2NetworkId(pub String);

/// Marks which component last wrote a value, mirroring OONF's `origin`
/// concept: a mediator only overwrites values it itself stamped, so it never
/// clobbers data written by an unrelated plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Origin(pub u32);

/// Read/write access to the layer-2 database backing one network.
///
/// A session's L2 mediator (C8) uses this to push DLEP-learned neighbor
/// metrics in, and to read locally-known interface defaults out when
/// composing outgoing signals. Implementations must be safe to call from a
/// single-threaded, non-reentrant context — the mediator never calls back
/// into itself.
pub trait Layer2Store: Send + Sync {
    /// Set an attribute for the neighbor `mac` on network `net`, stamped
    /// with `origin`. Creates the neighbor entry if absent.
    fn set_neighbor_attribute(
        &self,
        net: &L2NetworkId,
        mac: MacAddr,
        attr: L2Attribute,
        value: i64,
        origin: Origin,
    );

    /// Read back a previously-set attribute, if any.
    fn get_neighbor_attribute(
        &self,
        net: &L2NetworkId,
        mac: MacAddr,
        attr: L2Attribute,
    ) -> Option<i64>;

    /// Remove every attribute this `origin` stamped for `mac` on `net`.
    /// Called when a destination goes down or a session ends.
    fn remove_neighbor(&self, net: &L2NetworkId, mac: MacAddr, origin: Origin);

    /// Default value for `attr` on the network itself (e.g. an interface's
    /// configured max data rate), read when composing a Peer Update that
    /// lacks a neighbor-specific override.
    fn network_default_attribute(&self, net: &L2NetworkId, attr: L2Attribute) -> Option<i64>;
}

#[derive(Debug, Default)]
struct NeighborRecord {
    attributes: HashMap<(L2Attribute, Origin), i64>,
}

/// Reference `Layer2Store` backed by in-process hash maps. Suitable for
/// tests and for running the daemon without a real layer-2 backend attached.
#[derive(Debug, Default)]
pub struct InMemoryLayer2Store {
    neighbors: std::sync::Mutex<HashMap<(String, MacAddr), NeighborRecord>>,
    network_defaults: std::sync::Mutex<HashMap<(String, L2Attribute), i64>>,
}

impl InMemoryLayer2Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a network-level default, e.g. an interface's configured max
    /// data rate, ahead of any session activity.
    pub fn set_network_default(&self, net: &L2NetworkId, attr: L2Attribute, value: i64) {
        self.network_defaults
            .lock()
            .expect("layer2 store mutex poisoned")
            .insert((net.0.clone(), attr), value);
    }
}

impl Layer2Store for InMemoryLayer2Store {
    fn set_neighbor_attribute(
        &self,
        net: &L2NetworkId,
        mac: MacAddr,
        attr: L2Attribute,
        value: i64,
        origin: Origin,
    ) {
        let mut neighbors = self.neighbors.lock().expect("layer2 store mutex poisoned");
        neighbors
            .entry((net.0.clone(), mac))
            .or_default()
            .attributes
            .insert((attr, origin), value);
    }

    fn get_neighbor_attribute(
        &self,
        net: &L2NetworkId,
        mac: MacAddr,
        attr: L2Attribute,
    ) -> Option<i64> {
        let neighbors = self.neighbors.lock().expect("layer2 store mutex poisoned");
        let record = neighbors.get(&(net.0.clone(), mac))?;
        record
            .attributes
            .iter()
            .find(|((a, _), _)| *a == attr)
            .map(|(_, value)| *value)
    }

    fn remove_neighbor(&self, net: &L2NetworkId, mac: MacAddr, origin: Origin) {
        let mut neighbors = self.neighbors.lock().expect("layer2 store mutex poisoned");
        if let Some(record) = neighbors.get_mut(&(net.0.clone(), mac)) {
            record.attributes.retain(|(_, o), _| *o != origin);
        }
    }

    fn network_default_attribute(&self, net: &L2NetworkId, attr: L2Attribute) -> Option<i64> {
        self.network_defaults
            .lock()
            .expect("layer2 store mutex poisoned")
            .get(&(net.0.clone(), attr))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mac(b: u8) -> MacAddr {
        MacAddr::new([0, 0, 0, 0, 0, b])
    }

    #[test]
    fn set_and_get_round_trips() {
        let store = InMemoryLayer2Store::new();
        let net = L2NetworkId("wlan0".into());
        store.set_neighbor_attribute(&net, mac(1), L2Attribute::LATENCY, 42, Origin(7));
        assert_eq!(
            store.get_neighbor_attribute(&net, mac(1), L2Attribute::LATENCY),
            Some(42)
        );
    }

    #[test]
    fn remove_neighbor_only_clears_matching_origin() {
        let store = InMemoryLayer2Store::new();
        let net = L2NetworkId("wlan0".into());
        store.set_neighbor_attribute(&net, mac(1), L2Attribute::LATENCY, 1, Origin(1));
        store.set_neighbor_attribute(&net, mac(1), L2Attribute::LATENCY, 2, Origin(2));
        store.remove_neighbor(&net, mac(1), Origin(1));
        // Origin 2's write should survive; querying by attribute alone still
        // finds it since only one origin remains.
        assert_eq!(
            store.get_neighbor_attribute(&net, mac(1), L2Attribute::LATENCY),
            Some(2)
        );
    }

    #[test]
    fn network_default_is_independent_of_neighbor_state() {
        let store = InMemoryLayer2Store::new();
        let net = L2NetworkId("wlan0".into());
        store.set_network_default(&net, L2Attribute::MAX_DATARATE_TX, 54_000_000);
        assert_eq!(
            store.network_default_attribute(&net, L2Attribute::MAX_DATARATE_TX),
            Some(54_000_000)
        );
    }
}
