//! Crate-wide error type for `dlep-codec`.
//!
//! Named after the original parser's `dlep_parser_error` enum
//! (`DLEP_NEW_PARSER_*`), flattened into a `thiserror` enum in the teacher's
//! idiom instead of a C integer return code.

use thiserror::Error;

use dlep_types::tlv::TlvType;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("signal header incomplete: need {needed} bytes, have {have}")]
    IncompleteHeader { needed: usize, have: usize },

    #[error("signal body incomplete: need {needed} bytes, have {have}")]
    IncompleteSignal { needed: usize, have: usize },

    #[error("tlv header incomplete at offset {offset}")]
    IncompleteTlv { offset: usize },

    #[error("tlv {tlv} value incomplete at offset {offset}: need {needed} bytes, have {have}")]
    IncompleteTlvValue {
        tlv: TlvType,
        offset: usize,
        needed: usize,
        have: usize,
    },

    #[error("tlv {0} is not recognized by this session")]
    UnsupportedTlv(TlvType),

    #[error("tlv {tlv} length {actual} outside allowed range [{min}, {max}]")]
    IllegalTlvLength {
        tlv: TlvType,
        actual: usize,
        min: usize,
        max: usize,
    },

    #[error("missing mandatory tlv {0}")]
    MissingMandatory(TlvType),

    #[error("tlv {0} may not repeat in this signal")]
    DuplicateTlv(TlvType),

    #[error("value {value} exceeds the {limit}-byte wire limit for this field")]
    ValueTooLarge { value: usize, limit: usize },

    #[error("writer has no signal in progress")]
    NoSignalInProgress,

    #[error("internal codec error: {0}")]
    Internal(String),
}

pub type CodecResult<T> = std::result::Result<T, CodecError>;
