//! Crate-wide error type for `dlep-extensions`.

use thiserror::Error;

use dlep_types::status::StatusCode;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtensionError {
    #[error("extension {0} rejected the signal: {1}")]
    Rejected(u16, StatusCode),

    #[error("codec error while dispatching to extension {0}: {1}")]
    Codec(u16, dlep_codec::CodecError),
}

pub type ExtensionResult<T> = std::result::Result<T, ExtensionError>;
