//! Raw TLV iteration over a signal's payload.
//!
//! A TLV on the wire is `{u16 type, u16 length, value}`. This module only
//! walks that structure; it does not know which types are mandatory or
//! bounds-check value lengths against per-extension rules — that's
//! [`crate::parser`]'s job. Kept separate because the writer (`crate::writer`)
//! and a handful of call sites (subject-MAC extraction) just need to walk
//! TLVs without a session's parser state in hand.

use byteorder::{BigEndian, ReadBytesExt};
use std::io::Cursor;

use dlep_types::tlv::TlvType;

use crate::error::{CodecError, CodecResult};

pub const TLV_HEADER_SIZE: usize = 4;

/// One TLV as it appears on the wire: a type tag and a borrowed value slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTlv<'a> {
    pub tlv_type: TlvType,
    pub value: &'a [u8],
    /// Byte offset of `value` within the signal payload this TLV was read
    /// from, recorded so the parser can build zero-copy value chains that
    /// stay valid even as the payload buffer is later decoded.
    pub offset: usize,
}

/// Iterate the TLVs in a signal's payload in wire order.
///
/// Stops and yields `Err` on the first malformed TLV (truncated header or a
/// length that runs past the end of `payload`) rather than silently
/// returning a partial list — an incomplete TLV chain is always a protocol
/// error, never a "read more later" condition, since `payload` is already
/// the full signal body.
pub fn iter_tlvs(payload: &[u8]) -> TlvIter<'_> {
    TlvIter { payload, pos: 0 }
}

pub struct TlvIter<'a> {
    payload: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for TlvIter<'a> {
    type Item = CodecResult<RawTlv<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos == self.payload.len() {
            return None;
        }
        if self.payload.len() - self.pos < TLV_HEADER_SIZE {
            self.pos = self.payload.len();
            return Some(Err(CodecError::IncompleteTlv { offset: self.pos }));
        }
        let header = &self.payload[self.pos..self.pos + TLV_HEADER_SIZE];
        let mut cursor = Cursor::new(header);
        let raw_type = cursor.read_u16::<BigEndian>().expect("4-byte slice");
        let length = cursor.read_u16::<BigEndian>().expect("4-byte slice") as usize;
        let value_start = self.pos + TLV_HEADER_SIZE;
        let value_end = value_start + length;
        if value_end > self.payload.len() {
            let tlv = TlvType(raw_type);
            self.pos = self.payload.len();
            return Some(Err(CodecError::IncompleteTlvValue {
                tlv,
                offset: value_start,
                needed: length,
                have: self.payload.len() - value_start,
            }));
        }
        let tlv = RawTlv {
            tlv_type: TlvType(raw_type),
            value: &self.payload[value_start..value_end],
            offset: value_start,
        };
        self.pos = value_end;
        Some(Ok(tlv))
    }
}

/// Append one TLV to `out`. Used directly by [`crate::writer::Writer`]; kept
/// free-standing so tests can build payloads without going through the
/// begin/add/finish discipline.
pub fn write_tlv(out: &mut Vec<u8>, tlv_type: TlvType, value: &[u8]) -> CodecResult<()> {
    use byteorder::WriteBytesExt;
    let length: u16 = value
        .len()
        .try_into()
        .map_err(|_| CodecError::ValueTooLarge {
            value: value.len(),
            limit: u16::MAX as usize,
        })?;
    out.write_u16::<BigEndian>(tlv_type.0)
        .map_err(|e| CodecError::Internal(e.to_string()))?;
    out.write_u16::<BigEndian>(length)
        .map_err(|e| CodecError::Internal(e.to_string()))?;
    out.extend_from_slice(value);
    Ok(())
}
