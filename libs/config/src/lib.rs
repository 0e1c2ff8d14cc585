//! Per-interface DLEP session configuration schema and TOML loading.
//!
//! Follows the teacher's `libs/config` shape: plain `serde`-derived structs
//! with `Default` impls matching the protocol's own fixed defaults, loaded
//! from TOML via a single `load_from_file` entry point that layers
//! cross-field validation on top of `serde`'s structural checks.

pub mod error;
pub mod interface;
pub mod loader;
pub mod session;

pub use error::{ConfigError, ConfigResult};
pub use interface::{DaemonConfig, InterfaceConfig};
pub use loader::load_from_file;
pub use session::SessionConfig;
