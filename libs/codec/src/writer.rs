//! TLV writer: begin/add/finish discipline over an outbound buffer.
//!
//! Mirrors `dlep_writer`'s `signal_start_ptr` bookmarking in
//! `dlep_session.h`: `begin_signal` remembers where the header goes,
//! `add_tlv` appends TLVs blind to the eventual signal length, and
//! `finish_signal` backpatches the length once every TLV is in. `abort`
//! rolls the buffer back to the bookmark, discarding a signal an extension
//! decided not to emit after all (e.g. because it had nothing to report).

use byteorder::{BigEndian, WriteBytesExt};

use dlep_types::signal::SignalType;
use dlep_types::tlv::TlvType;

use crate::error::{CodecError, CodecResult};
use crate::frame::HEADER_SIZE;
use crate::tlv::write_tlv;

/// Builds one signal's wire bytes into a caller-owned buffer.
///
/// A `Writer` wraps the buffer by reference so a session can reuse a single
/// outbound `Vec<u8>` across many signals without reallocating.
pub struct Writer<'a> {
    out: &'a mut Vec<u8>,
    signal_start: Option<usize>,
}

impl<'a> Writer<'a> {
    pub fn new(out: &'a mut Vec<u8>) -> Self {
        Writer {
            out,
            signal_start: None,
        }
    }

    /// Reserve space for the signal header and remember where it starts.
    /// Returns `Internal` if a signal is already in progress.
    pub fn begin_signal(&mut self, signal_type: SignalType) -> CodecResult<()> {
        if self.signal_start.is_some() {
            return Err(CodecError::Internal(
                "begin_signal called while a signal is already open".into(),
            ));
        }
        self.signal_start = Some(self.out.len());
        self.out
            .write_u16::<BigEndian>(signal_type.0)
            .map_err(|e| CodecError::Internal(e.to_string()))?;
        // Length placeholder, backpatched by `finish_signal`.
        self.out
            .write_u16::<BigEndian>(0)
            .map_err(|e| CodecError::Internal(e.to_string()))?;
        Ok(())
    }

    /// Append one TLV to the signal currently in progress.
    pub fn add_tlv(&mut self, tlv_type: TlvType, value: &[u8]) -> CodecResult<()> {
        if self.signal_start.is_none() {
            return Err(CodecError::NoSignalInProgress);
        }
        write_tlv(self.out, tlv_type, value)
    }

    /// Backpatch the signal's length and close it out.
    pub fn finish_signal(&mut self) -> CodecResult<()> {
        let start = self.signal_start.take().ok_or(CodecError::NoSignalInProgress)?;
        let body_len = self.out.len() - start - HEADER_SIZE;
        let length: u16 = body_len.try_into().map_err(|_| CodecError::ValueTooLarge {
            value: body_len,
            limit: u16::MAX as usize,
        })?;
        let length_bytes = length.to_be_bytes();
        self.out[start + 2..start + HEADER_SIZE].copy_from_slice(&length_bytes);
        Ok(())
    }

    /// Discard the signal currently in progress, truncating the buffer back
    /// to where `begin_signal` found it.
    pub fn abort_signal(&mut self) {
        if let Some(start) = self.signal_start.take() {
            self.out.truncate(start);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::unframe_signal;

    #[test]
    fn writes_a_well_formed_signal() {
        let mut buf = Vec::new();
        let mut writer = Writer::new(&mut buf);
        writer.begin_signal(SignalType::PEER_OFFER).unwrap();
        writer.add_tlv(TlvType::STATUS, &[0]).unwrap();
        writer.add_tlv(TlvType::PORT, &[0, 80]).unwrap();
        writer.finish_signal().unwrap();

        let (signal_type, payload, consumed) = unframe_signal(&buf).unwrap();
        assert_eq!(signal_type, SignalType::PEER_OFFER);
        assert_eq!(consumed, buf.len());
        assert_eq!(payload.len(), 8 + 8);
    }

    #[test]
    fn abort_rolls_back_to_before_begin() {
        let mut buf = vec![0xAA];
        let mut writer = Writer::new(&mut buf);
        writer.begin_signal(SignalType::HEARTBEAT).unwrap();
        writer.add_tlv(TlvType::STATUS, &[0]).unwrap();
        writer.abort_signal();
        assert_eq!(buf, vec![0xAA]);
    }

    #[test]
    fn add_tlv_without_begin_is_an_error() {
        let mut buf = Vec::new();
        let mut writer = Writer::new(&mut buf);
        assert!(writer.add_tlv(TlvType::STATUS, &[0]).is_err());
    }

    #[test]
    fn multiple_signals_append_to_the_same_buffer() {
        let mut buf = Vec::new();
        {
            let mut writer = Writer::new(&mut buf);
            writer.begin_signal(SignalType::HEARTBEAT).unwrap();
            writer.finish_signal().unwrap();
        }
        {
            let mut writer = Writer::new(&mut buf);
            writer.begin_signal(SignalType::HEARTBEAT).unwrap();
            writer.finish_signal().unwrap();
        }
        let (_, _, first_len) = unframe_signal(&buf).unwrap();
        let (second_type, _, _) = unframe_signal(&buf[first_len..]).unwrap();
        assert_eq!(second_type, SignalType::HEARTBEAT);
    }
}
