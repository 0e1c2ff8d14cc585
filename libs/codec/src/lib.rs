//! DLEP wire codec: signal framing, TLV iteration, per-signal parsing, and
//! the TLV writer.
//!
//! Layered the way the teacher's `libs/network::protocol` module is: a
//! framing layer (`frame`) independent of payload contents, a raw TLV
//! walker (`tlv`) the parser and writer both build on, a validating parser
//! (`parser`) that a session configures per signal type, and a writer
//! (`writer`) with explicit begin/add/finish/abort steps instead of a
//! single all-at-once serializer — matching how a session composes a
//! signal incrementally as extensions contribute TLVs to it.

pub mod error;
pub mod frame;
pub mod parser;
pub mod tlv;
pub mod writer;

pub use error::{CodecError, CodecResult};
pub use frame::{
    decode_header, encode_header, frame_signal, prime_udp_buffer, strip_udp_prefix, unframe_signal, SignalHeader,
};
pub use parser::{SignalParser, TlvConstraint};
pub use tlv::{iter_tlvs, write_tlv, RawTlv};
pub use writer::Writer;
