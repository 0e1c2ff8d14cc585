//! MAC address type used to key local neighbors and as the subject of
//! destination-scoped signals.

use crate::error::{TypesError, TypesResult};
use std::fmt;
use std::str::FromStr;

/// A 6-byte IEEE 802 MAC address.
///
/// Carried in the wire-level MAC-Address TLV (`TlvType::MAC_ADDRESS`) and used
/// as the key of the local-neighbor table (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddr([u8; 6]);

impl MacAddr {
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    pub fn from_slice(bytes: &[u8]) -> TypesResult<Self> {
        if bytes.len() != 6 {
            return Err(TypesError::InvalidMac(format!(
                "expected 6 bytes, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 6];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl FromStr for MacAddr {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(TypesError::InvalidMac(s.to_string()));
        }
        let mut arr = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            arr[i] = u8::from_str_radix(part, 16)
                .map_err(|_| TypesError::InvalidMac(s.to_string()))?;
        }
        Ok(Self(arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_display_and_parse() {
        let mac = MacAddr::new([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
        let text = mac.to_string();
        assert_eq!(text, "02:00:00:00:00:01");
        assert_eq!(mac, text.parse().unwrap());
    }

    #[test]
    fn rejects_short_byte_slices() {
        assert!(MacAddr::from_slice(&[1, 2, 3]).is_err());
    }
}
