//! DLEP interface controller, session state machine, and local-neighbor
//! table.
//!
//! Layered bottom-up: [`neighbor`] is the per-session destination table
//! (C5), [`session`] is the per-peer protocol state machine built on top of
//! it (C6), [`discovery`] filters and frames the UDP probe/offer exchange
//! that precedes a session, and [`interface`] (C7) owns one network
//! interface's UDP socket and TCP session map, tying the other three
//! together the way the teacher's `libs/network` crate sits above its
//! `transports` module.
//!
//! This crate has no `tokio` I/O of its own beyond the timer types `Instant`
//! and `Duration` pull in — every method here is synchronous, taking
//! `now: Instant` and returning plain data or events for the caller to act
//! on. The `dlep-daemon` binary is the only place actual sockets exist;
//! matches spec §5's single-threaded cooperative model, where suspension
//! points are the event loop's `.await`s, never mid-callback.

pub mod discovery;
pub mod error;
pub mod interface;
pub mod neighbor;
pub mod session;

pub use discovery::DiscoveryFilter;
pub use error::{NetworkError, NetworkResult};
pub use interface::{Interface, InterfaceEvent};
pub use neighbor::{LocalNeighbor, LocalNeighborTable};
pub use session::{Session, SessionEnd, SessionState};
