//! Pure data structures shared by the DLEP codec, extension registry, and
//! session engine.
//!
//! This crate holds no protocol logic — it defines the identifiers, small
//! value types, and the layer-2 data model that the other crates operate on.
//! Mirrors the "pure data structures" role `libs/types` plays relative to
//! `libs/codec` in the teacher repo.

pub mod error;
pub mod mac;
pub mod role;
pub mod signal;
pub mod status;
pub mod tlv;
pub mod neighbor;
pub mod layer2;

pub use error::{TypesError, TypesResult};
pub use mac::MacAddr;
pub use role::Role;
pub use signal::SignalType;
pub use status::StatusCode;
pub use tlv::TlvType;
pub use neighbor::NeighborState;
pub use layer2::{InMemoryLayer2Store, L2Attribute, L2NetworkId, Layer2Store, Origin};
