//! LAN route import filter: matches external route events against a
//! configured list of import rules.
//!
//! Grounded on `src-plugins/olsrv2/lan_import/lan_import.c`'s `_cb_rt_event`:
//! a route add/remove event is first rejected if its destination is
//! multicast, link-local, or loopback, then walked against every configured
//! `_import_entry` in order, each narrowing on prefix length, an
//! address filter, routing table, protocol, and administrative distance,
//! plus an optional interface name match.
//!
//! Per spec.md §9(c), the original's loop rebinds `domain` inside a nested
//! `list_for_each_element` and then uses that binding after the nested loop
//! exits — this reads as relying on the last iteration's value. That is
//! *not* replicated: each filter's accept/reject decision here is
//! self-contained and does not leak state across filters.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// One route-import rule, mirroring `struct _import_entry`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportFilter {
    pub name: String,
    /// Routing domain this filter assigns a matching route to.
    pub domain: i32,
    /// Required prefix length, or `None` to accept any.
    pub prefix_length: Option<u8>,
    /// Required routing table id, or `None`/`0` to accept any — matches the
    /// original's "0 means unset" convention for `table`/`protocol`/`distance`.
    pub table: Option<i32>,
    pub protocol: Option<i32>,
    pub distance: Option<i32>,
    /// Required interface name, or `None` to accept any.
    pub ifname: Option<String>,
}

impl Default for ImportFilter {
    fn default() -> Self {
        ImportFilter {
            name: String::new(),
            domain: 0,
            prefix_length: None,
            table: None,
            protocol: None,
            distance: None,
            ifname: None,
        }
    }
}

/// One observed route add/remove event, mirroring `struct os_route`'s
/// fields the original filter actually reads.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteEvent {
    pub destination: IpAddr,
    pub prefix_length: u8,
    pub interface: String,
    pub table: i32,
    pub protocol: i32,
    pub metric: i32,
    /// `true` for a route being installed, `false` for one being withdrawn.
    pub set: bool,
}

/// A filter's accept decision for one route event: which domain it should
/// be imported into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accepted {
    pub domain: i32,
}

/// `true` for destinations the original excludes outright: multicast,
/// link-local, and loopback, for both address families.
fn is_excluded(addr: IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => v4.is_multicast() || v4.is_link_local() || v4.is_loopback(),
        IpAddr::V6(v6) => {
            v6.is_multicast() || v6.is_loopback() || (v6.segments()[0] & 0xffc0) == 0xfe80
        }
    }
}

fn filter_accepts(filter: &ImportFilter, event: &RouteEvent) -> bool {
    if let Some(required_len) = filter.prefix_length {
        if required_len != event.prefix_length {
            return false;
        }
    }
    if let Some(table) = filter.table {
        if table != 0 && table != event.table {
            return false;
        }
    }
    if let Some(protocol) = filter.protocol {
        if protocol != 0 && protocol != event.protocol {
            return false;
        }
    }
    if let Some(distance) = filter.distance {
        if distance != 0 && distance != event.metric {
            return false;
        }
    }
    if let Some(ifname) = &filter.ifname {
        if !ifname.is_empty() && ifname != &event.interface {
            return false;
        }
    }
    true
}

/// Evaluate `event` against every filter in `filters`, in order, returning
/// the domain each accepting filter imports it into.
///
/// Routes tagged with a protocol this process itself originates are the
/// original's responsibility to exclude via `olsrv2_routing_get_parameters`
/// (an OLSRv2-internal routing-domain lookup out of this crate's scope);
/// callers that have that information should filter it out of `filters`'
/// `protocol` before calling, rather than this function guessing at it.
pub fn evaluate(filters: &[ImportFilter], event: &RouteEvent) -> Vec<Accepted> {
    if is_excluded(event.destination) {
        tracing::debug!(destination = %event.destination, "excluding multicast/link-local/loopback route");
        return Vec::new();
    }

    filters
        .iter()
        .filter(|filter| filter_accepts(filter, event))
        .map(|filter| {
            tracing::debug!(filter = %filter.name, domain = filter.domain, "route import filter matched");
            Accepted {
                domain: filter.domain,
            }
        })
        .collect()
}

/// Reapply every filter against the full current routing table, as the
/// original's wildcard startup query does via `_cb_query`/`_cb_query_finished`.
///
/// Per spec.md §9(b): the original's `_cb_query_finished` is a no-op, which
/// only stays correct if reapplying a route that already matched has no
/// observable side effect beyond its last-applied state. `evaluate` itself
/// satisfies that — it is a pure function of the filter list and one event,
/// so calling it twice for the same route is idempotent by construction —
/// but a caller that drives side effects (e.g. `olsrv2_lan_add`) from its
/// output must make that same idempotence hold on its own end.
pub fn reapply_all(filters: &[ImportFilter], events: &[RouteEvent]) -> Vec<(RouteEvent, Vec<Accepted>)> {
    events
        .iter()
        .map(|event| (event.clone(), evaluate(filters, event)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(destination: &str, prefix_length: u8) -> RouteEvent {
        RouteEvent {
            destination: destination.parse().unwrap(),
            prefix_length,
            interface: "eth0".into(),
            table: 254,
            protocol: 3,
            metric: 0,
            set: true,
        }
    }

    #[test]
    fn excludes_loopback_and_multicast() {
        let filters = vec![ImportFilter {
            name: "all".into(),
            ..Default::default()
        }];
        assert!(evaluate(&filters, &event("127.0.0.1", 32)).is_empty());
        assert!(evaluate(&filters, &event("224.0.0.1", 32)).is_empty());
        assert!(evaluate(&filters, &event("169.254.1.1", 16)).is_empty());
    }

    #[test]
    fn matches_on_prefix_length_and_interface() {
        let filters = vec![
            ImportFilter {
                name: "slash24".into(),
                domain: 1,
                prefix_length: Some(24),
                ifname: Some("eth0".into()),
                ..Default::default()
            },
            ImportFilter {
                name: "slash32".into(),
                domain: 2,
                prefix_length: Some(32),
                ..Default::default()
            },
        ];
        let accepted = evaluate(&filters, &event("10.0.0.0", 24));
        assert_eq!(accepted, vec![Accepted { domain: 1 }]);
    }

    #[test]
    fn each_filter_resolves_its_own_domain_independent_of_others() {
        // Regression guard for spec.md §9(c): no shared mutable binding
        // leaks a later filter's domain onto an earlier match.
        let filters = vec![
            ImportFilter {
                name: "first".into(),
                domain: 7,
                ..Default::default()
            },
            ImportFilter {
                name: "second".into(),
                domain: 9,
                ..Default::default()
            },
        ];
        let accepted = evaluate(&filters, &event("10.0.0.0", 24));
        assert_eq!(accepted, vec![Accepted { domain: 7 }, Accepted { domain: 9 }]);
    }
}
