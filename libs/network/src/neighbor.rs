//! Local-neighbor table: per-session tracking of destinations this side has
//! announced or been told about, grounded on `dlep_local_neighbor` and the
//! `local_neighbor_tree` field of `dlep_session` in `dlep_session.h`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use dlep_types::mac::MacAddr;
use dlep_types::neighbor::NeighborState;

/// One entry in a session's local-neighbor table.
#[derive(Debug, Clone)]
pub struct LocalNeighbor {
    pub state: NeighborState,
    /// Deadline for the peer to ack the signal that moved this neighbor
    /// into its current state, if one is outstanding. `None` once acked.
    pub ack_deadline: Option<Instant>,
}

/// Tracks every destination a session has sent lifecycle signals about.
///
/// One table per session (not per interface) — a radio interface serving
/// two router peers keeps each peer's acked/unacked view independently,
/// since one peer acking Destination Up for a MAC says nothing about
/// whether the other peer has.
#[derive(Debug, Default)]
pub struct LocalNeighborTable {
    entries: HashMap<MacAddr, LocalNeighbor>,
}

impl LocalNeighborTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, mac: MacAddr) -> Option<&LocalNeighbor> {
        self.entries.get(&mac)
    }

    /// Record that Destination Up was just sent for `mac`, arming its ack
    /// timer.
    pub fn mark_up_sent(&mut self, mac: MacAddr, ack_timeout: Duration, now: Instant) {
        self.entries.insert(
            mac,
            LocalNeighbor {
                state: NeighborState::UpSent,
                ack_deadline: Some(now + ack_timeout),
            },
        );
    }

    /// Record that Destination Up was acked; clears the ack timer.
    pub fn mark_up_acked(&mut self, mac: MacAddr) {
        if let Some(entry) = self.entries.get_mut(&mac) {
            entry.state = NeighborState::UpAcked;
            entry.ack_deadline = None;
        }
    }

    pub fn mark_down_sent(&mut self, mac: MacAddr, ack_timeout: Duration, now: Instant) {
        if let Some(entry) = self.entries.get_mut(&mac) {
            entry.state = NeighborState::DownSent;
            entry.ack_deadline = Some(now + ack_timeout);
        }
    }

    /// Record that Destination Down was acked and garbage-collect the
    /// entry immediately — nothing further is tracked for a down-acked
    /// neighbor (spec §4.5: `DownAcked --GC--> (removed)`).
    pub fn mark_down_acked_and_remove(&mut self, mac: MacAddr) {
        self.entries.remove(&mac);
    }

    pub fn remove(&mut self, mac: MacAddr) {
        self.entries.remove(&mac);
    }

    /// Remove every tracked neighbor, returning their MACs so the caller can
    /// clear whatever else (L2 state, typically) keys off them. Used when a
    /// session ends and every neighbor it was tracking is gone with it.
    pub fn drain(&mut self) -> Vec<MacAddr> {
        self.entries.drain().map(|(mac, _)| mac).collect()
    }

    /// MACs whose ack timer has expired as of `now`. The caller (the
    /// session) decides what "declared lost" means for each — typically
    /// dropping the entry and, for the radio side, ending the whole session
    /// since the peer is no longer reliably receiving signals.
    pub fn timed_out(&self, now: Instant) -> Vec<MacAddr> {
        self.entries
            .iter()
            .filter_map(|(mac, entry)| match entry.ack_deadline {
                Some(deadline) if deadline <= now => Some(*mac),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mac(b: u8) -> MacAddr {
        MacAddr::new([0, 0, 0, 0, 0, b])
    }

    #[test]
    fn up_sent_then_acked_clears_deadline() {
        let mut table = LocalNeighborTable::new();
        let now = Instant::now();
        table.mark_up_sent(mac(1), Duration::from_secs(1), now);
        assert_eq!(table.get(mac(1)).unwrap().state, NeighborState::UpSent);
        table.mark_up_acked(mac(1));
        let entry = table.get(mac(1)).unwrap();
        assert_eq!(entry.state, NeighborState::UpAcked);
        assert!(entry.ack_deadline.is_none());
    }

    #[test]
    fn down_acked_removes_the_entry() {
        let mut table = LocalNeighborTable::new();
        let now = Instant::now();
        table.mark_up_sent(mac(1), Duration::from_secs(1), now);
        table.mark_up_acked(mac(1));
        table.mark_down_sent(mac(1), Duration::from_secs(1), now);
        table.mark_down_acked_and_remove(mac(1));
        assert!(table.get(mac(1)).is_none());
    }

    #[test]
    fn drain_empties_the_table_and_returns_every_mac() {
        let mut table = LocalNeighborTable::new();
        let now = Instant::now();
        table.mark_up_sent(mac(1), Duration::from_secs(1), now);
        table.mark_up_sent(mac(2), Duration::from_secs(1), now);
        table.mark_up_acked(mac(2));

        let mut drained = table.drain();
        drained.sort();
        assert_eq!(drained, vec![mac(1), mac(2)]);
        assert!(table.is_empty());
    }

    #[test]
    fn timed_out_reports_expired_deadlines_only() {
        let mut table = LocalNeighborTable::new();
        let now = Instant::now();
        table.mark_up_sent(mac(1), Duration::from_millis(10), now);
        table.mark_up_sent(mac(2), Duration::from_secs(60), now);

        let later = now + Duration::from_millis(20);
        assert_eq!(table.timed_out(later), vec![mac(1)]);
    }
}
