//! Crate-wide error type for `dlep-types`.

use thiserror::Error;

/// Errors raised while constructing or validating a pure data type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid MAC address: {0}")]
    InvalidMac(String),

    #[error("unknown status code: {0}")]
    UnknownStatusCode(u8),
}

pub type TypesResult<T> = std::result::Result<T, TypesError>;
