//! Local-neighbor lifecycle state (spec §4.5).

/// Lifecycle state of one local neighbor entry.
///
/// ```text
/// Idle --send DestUp--> UpSent --ack--> UpAcked
/// UpAcked --send DestDown--> DownSent --ack--> DownAcked --GC--> (removed)
/// any --ack_timeout--> declared lost, entry removed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NeighborState {
    Idle,
    UpSent,
    UpAcked,
    DownSent,
    DownAcked,
}

impl NeighborState {
    /// True while this neighbor has an outstanding ack timer armed
    /// (invariant 4 in spec §3: exactly one outstanding timer in these states).
    pub fn awaits_ack(self) -> bool {
        matches!(self, NeighborState::UpSent | NeighborState::DownSent)
    }
}
