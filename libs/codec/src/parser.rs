//! Per-signal TLV parser state.
//!
//! Grounded on `dlep_session.h`'s `dlep_session_parser`: a signal's allowed
//! TLVs are declared ahead of time (`allowed_tlvs`, an AVL tree there; a
//! `HashMap` here), and parsing a signal fills a `values` array linked by
//! index (`dlep_parser_value::tlv_next`) rather than by pointer, so the
//! vector can grow without invalidating earlier entries. [`ParsedValue`]
//! records an offset and length into the original payload instead of owning
//! bytes, keeping the whole parse zero-copy.

use std::collections::HashMap;

use dlep_types::mac::MacAddr;
use dlep_types::tlv::TlvType;

use crate::error::{CodecError, CodecResult};
use crate::tlv::iter_tlvs;

/// Length bounds, mandatoriness, and cardinality for one TLV type within a
/// signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvConstraint {
    pub min_len: usize,
    pub max_len: usize,
    pub mandatory: bool,
    /// Whether this TLV type may legally appear more than once in the same
    /// signal. `false` by default — a second occurrence of a non-repeatable
    /// TLV is the `DuplicateTlv` error.
    pub repeatable: bool,
}

impl TlvConstraint {
    pub const fn fixed(len: usize, mandatory: bool) -> Self {
        TlvConstraint {
            min_len: len,
            max_len: len,
            mandatory,
            repeatable: false,
        }
    }

    pub const fn range(min_len: usize, max_len: usize, mandatory: bool) -> Self {
        TlvConstraint {
            min_len,
            max_len,
            mandatory,
            repeatable: false,
        }
    }

    /// Mark this constraint as allowing its TLV to repeat within one signal.
    pub const fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }
}

/// One parsed TLV value: where it lives in the payload, and the index of
/// the next value of the same type (or `None` if it's the last).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedValue {
    pub tlv_type: TlvType,
    pub offset: usize,
    pub length: usize,
    next: Option<usize>,
}

/// Parses signal payloads against a declared set of allowed TLVs.
///
/// One `SignalParser` is built per signal type a session expects to
/// receive (the extension registry supplies the allowed-TLV table when it
/// attaches to a session; see `dlep-extensions`). Reused across every
/// signal of that type the session parses, clearing its value chain each
/// call.
#[derive(Debug, Default)]
pub struct SignalParser {
    allowed: HashMap<TlvType, TlvConstraint>,
    values: Vec<ParsedValue>,
    heads: HashMap<TlvType, usize>,
    tails: HashMap<TlvType, usize>,
}

impl SignalParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that `tlv_type` is legal within signals this parser handles,
    /// under `constraint`. Idempotent: re-declaring the same type overwrites
    /// its constraint, matching `dlep_extension_add`'s upsert behavior.
    pub fn allow(&mut self, tlv_type: TlvType, constraint: TlvConstraint) {
        self.allowed.insert(tlv_type, constraint);
    }

    /// Parse `payload`, replacing any value chain from a previous call.
    ///
    /// Fails closed: an unrecognized TLV, an out-of-range length, or a
    /// missing mandatory TLV all reject the whole signal rather than
    /// parsing what they can — per spec, a session that cannot fully
    /// validate a signal cannot safely act on part of it.
    pub fn parse(&mut self, payload: &[u8]) -> CodecResult<()> {
        self.values.clear();
        self.heads.clear();
        self.tails.clear();

        for raw in iter_tlvs(payload) {
            let raw = raw?;
            let constraint = self
                .allowed
                .get(&raw.tlv_type)
                .ok_or(CodecError::UnsupportedTlv(raw.tlv_type))?;
            if raw.value.len() < constraint.min_len || raw.value.len() > constraint.max_len {
                return Err(CodecError::IllegalTlvLength {
                    tlv: raw.tlv_type,
                    actual: raw.value.len(),
                    min: constraint.min_len,
                    max: constraint.max_len,
                });
            }
            if !constraint.repeatable && self.tails.contains_key(&raw.tlv_type) {
                return Err(CodecError::DuplicateTlv(raw.tlv_type));
            }

            let index = self.values.len();
            self.values.push(ParsedValue {
                tlv_type: raw.tlv_type,
                offset: raw.offset,
                length: raw.value.len(),
                next: None,
            });
            match self.tails.get(&raw.tlv_type).copied() {
                Some(tail) => {
                    self.values[tail].next = Some(index);
                }
                None => {
                    self.heads.insert(raw.tlv_type, index);
                }
            }
            self.tails.insert(raw.tlv_type, index);
        }

        for (tlv_type, constraint) in &self.allowed {
            if constraint.mandatory && !self.heads.contains_key(tlv_type) {
                return Err(CodecError::MissingMandatory(*tlv_type));
            }
        }
        Ok(())
    }

    /// First parsed value of `tlv_type`, if the signal carried one.
    pub fn first(&self, tlv_type: TlvType) -> Option<&ParsedValue> {
        self.heads.get(&tlv_type).map(|&i| &self.values[i])
    }

    /// The value of the same type following `value`, if the TLV repeated.
    pub fn next(&self, value: &ParsedValue) -> Option<&ParsedValue> {
        value.next.map(|i| &self.values[i])
    }

    /// Slice `value` out of the original payload it was parsed from.
    pub fn bytes<'a>(&self, payload: &'a [u8], value: &ParsedValue) -> &'a [u8] {
        &payload[value.offset..value.offset + value.length]
    }

    /// Convenience for the common case of a single mandatory MAC-Address
    /// TLV identifying the signal's subject destination.
    pub fn mac(&self, payload: &[u8], tlv_type: TlvType) -> CodecResult<MacAddr> {
        let value = self
            .first(tlv_type)
            .ok_or(CodecError::MissingMandatory(tlv_type))?;
        MacAddr::from_slice(self.bytes(payload, value))
            .map_err(|e| CodecError::Internal(e.to_string()))
    }
}
