//! Extension registry and dispatch for the DLEP session engine.
//!
//! An `Extension` (see [`extension`]) owns a slice of the TLV vocabulary and
//! the logic to consume/produce it; the [`ExtensionRegistry`] holds the set
//! a daemon instance was built with, negotiates which ids a session pair
//! shares, and dispatches process/emit calls to them in registration order.
//! This crate depends only on `dlep-types` and `dlep-codec` — never on
//! `dlep-network` — so the session engine can depend on extensions without
//! creating a cycle.

pub mod base;
pub mod error;
pub mod extension;
pub mod metrics;
pub mod registry;

pub use error::{ExtensionError, ExtensionResult};
pub use extension::{DispatchOutcome, Extension, ExtensionId};
pub use registry::ExtensionRegistry;
