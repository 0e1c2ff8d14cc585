//! Crate-wide error type for `dlep-network`.
//!
//! Shaped like the teacher's `TransportError`
//! (`libs/network/src/error.rs`): one enum, `thiserror`-derived, with
//! constructor helpers for the common cases instead of call sites building
//! variants by hand.

use thiserror::Error;

use dlep_codec::CodecError;
use dlep_types::status::StatusCode;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("wire codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("signal {signal} is not valid in session state {state}")]
    UnexpectedSignal { signal: u16, state: &'static str },

    #[error("peer rejected the signal with status {0}")]
    PeerRejected(StatusCode),

    #[error("peer initialization timed out after {0:?}")]
    PeerInitTimeout(std::time::Duration),

    #[error("peer heartbeat timed out after {0:?}")]
    HeartbeatTimeout(std::time::Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("io error: {0}")]
    Io(String),
}

impl NetworkError {
    pub fn unexpected_signal(signal: dlep_types::signal::SignalType, state: &'static str) -> Self {
        NetworkError::UnexpectedSignal {
            signal: signal.0,
            state,
        }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        NetworkError::Transport(msg.into())
    }
}

impl From<std::io::Error> for NetworkError {
    fn from(e: std::io::Error) -> Self {
        NetworkError::Io(e.to_string())
    }
}

pub type NetworkResult<T> = std::result::Result<T, NetworkError>;
