//! Status codes carried in the `PeerTermination` signal's Status TLV.
//!
//! Concrete values fixed per DESIGN.md Open Question (a); spec §6 names the
//! symbolic set only.

use num_enum::{IntoPrimitive, TryFromPrimitive};

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum StatusCode {
    Success = 0,
    UnknownSignal = 1,
    UnexpectedSignal = 2,
    InvalidTlv = 3,
    InvalidTlvValue = 4,
    Timeout = 5,
    Shutdown = 6,
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StatusCode::Success => "Success",
            StatusCode::UnknownSignal => "UnknownSignal",
            StatusCode::UnexpectedSignal => "UnexpectedSignal",
            StatusCode::InvalidTlv => "InvalidTLV",
            StatusCode::InvalidTlvValue => "InvalidTLVValue",
            StatusCode::Timeout => "Timeout",
            StatusCode::Shutdown => "Shutdown",
        };
        write!(f, "{name}")
    }
}
