//! Signal framing: the `{u16 signal_type, u16 length, payload}` wire header
//! DLEP wraps every signal in, plus the 4-byte magic prefix UDP discovery
//! datagrams carry ahead of it.
//!
//! Mirrors the teacher's `WireFormat`/`to_bytes`/`from_bytes` split in
//! `protocol/envelope.rs`: constants for the wire shape, a `Cursor`-driven
//! reader, and a `byteorder`-driven writer. Grounded on `dlep_interface.c`'s
//! `udp_out` buffer, which is primed with the `"DLEP"` prefix before each
//! discovery datagram and stripped back off on receipt.

use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use dlep_types::signal::SignalType;

use crate::error::{CodecError, CodecResult};

/// Prefix every UDP discovery datagram carries ahead of its signal.
pub const UDP_MAGIC: &[u8; 4] = b"DLEP";

/// Size in bytes of the `{signal_type, length}` header.
pub const HEADER_SIZE: usize = 4;

/// A decoded signal header: the type tag and the length of the TLV payload
/// that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalHeader {
    pub signal_type: SignalType,
    pub length: u16,
}

/// Decode a signal header from the front of `buf`.
///
/// Returns `IncompleteHeader` rather than panicking when `buf` is shorter
/// than `HEADER_SIZE` — callers hold partial TCP reads across poll wakeups
/// and must be able to tell "not enough yet" from "malformed".
pub fn decode_header(buf: &[u8]) -> CodecResult<SignalHeader> {
    if buf.len() < HEADER_SIZE {
        return Err(CodecError::IncompleteHeader {
            needed: HEADER_SIZE,
            have: buf.len(),
        });
    }
    let mut cursor = Cursor::new(buf);
    let signal_type = cursor
        .read_u16::<BigEndian>()
        .map_err(|e| CodecError::Internal(e.to_string()))?;
    let length = cursor
        .read_u16::<BigEndian>()
        .map_err(|e| CodecError::Internal(e.to_string()))?;
    Ok(SignalHeader {
        signal_type: SignalType(signal_type),
        length,
    })
}

/// Write a signal header.
pub fn encode_header(out: &mut Vec<u8>, header: SignalHeader) -> CodecResult<()> {
    out.write_u16::<BigEndian>(header.signal_type.0)
        .map_err(|e| CodecError::Internal(e.to_string()))?;
    out.write_u16::<BigEndian>(header.length)
        .map_err(|e| CodecError::Internal(e.to_string()))?;
    Ok(())
}

/// Split one complete signal (header + payload) off the front of `buf`.
///
/// Returns the signal type, the TLV payload slice, and the total number of
/// bytes consumed so the caller can advance its read buffer. Returns
/// `IncompleteSignal` if `buf` holds a full header but not yet the whole
/// payload — this is the normal case on a TCP session stream and is not an
/// error the caller should log, just a signal to keep reading.
pub fn unframe_signal(buf: &[u8]) -> CodecResult<(SignalType, &[u8], usize)> {
    let header = decode_header(buf)?;
    let body_start = HEADER_SIZE;
    let body_end = body_start + header.length as usize;
    if buf.len() < body_end {
        return Err(CodecError::IncompleteSignal {
            needed: body_end,
            have: buf.len(),
        });
    }
    Ok((header.signal_type, &buf[body_start..body_end], body_end))
}

/// Append a complete signal (header + pre-built TLV payload) to `out`.
pub fn frame_signal(out: &mut Vec<u8>, signal_type: SignalType, payload: &[u8]) -> CodecResult<()> {
    let length: u16 = payload
        .len()
        .try_into()
        .map_err(|_| CodecError::ValueTooLarge {
            value: payload.len(),
            limit: u16::MAX as usize,
        })?;
    encode_header(
        out,
        SignalHeader {
            signal_type,
            length,
        },
    )?;
    out.extend_from_slice(payload);
    Ok(())
}

/// Strip the UDP discovery prefix off a received datagram, verifying it
/// matches `UDP_MAGIC`.
pub fn strip_udp_prefix(buf: &[u8]) -> CodecResult<&[u8]> {
    if buf.len() < UDP_MAGIC.len() || &buf[..UDP_MAGIC.len()] != UDP_MAGIC {
        return Err(CodecError::Internal(
            "datagram missing DLEP discovery prefix".into(),
        ));
    }
    Ok(&buf[UDP_MAGIC.len()..])
}

/// Prime an outbound UDP buffer with the discovery prefix.
pub fn prime_udp_buffer(out: &mut Vec<u8>) {
    out.extend_from_slice(UDP_MAGIC);
}
