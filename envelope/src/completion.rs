//! Completion records written into the shared region for async calls.
//!
//! The service writes a little-endian `u32` payload length at the handle's
//! offset, followed by the payload. Typed operations use a 32-byte payload:
//! result word, padding, then the three response slots.

use crate::descriptor::ResultRecord;
use crate::error::LayoutError;
use crate::layout::take;

/// Size of the length prefix in front of every completion payload.
pub const COMPLETION_PREFIX_SIZE: usize = 4;

/// Size of a typed completion payload.
pub const COMPLETION_RECORD_SIZE: usize = 32;

/// Typed view of a completion payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompletionRecord {
    pub result: ResultRecord,
    pub arg1: u64,
    pub arg2: u64,
    pub arg3: u64,
}

impl CompletionRecord {
    pub fn to_bytes(&self) -> [u8; COMPLETION_RECORD_SIZE] {
        let mut out = [0u8; COMPLETION_RECORD_SIZE];
        out[0..4].copy_from_slice(&self.result.into_bits().to_le_bytes());
        out[8..16].copy_from_slice(&self.arg1.to_le_bytes());
        out[16..24].copy_from_slice(&self.arg2.to_le_bytes());
        out[24..32].copy_from_slice(&self.arg3.to_le_bytes());
        out
    }

    /// Decode the leading record; trailing payload bytes are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LayoutError> {
        if bytes.len() < COMPLETION_RECORD_SIZE {
            return Err(LayoutError::Truncated {
                expected: COMPLETION_RECORD_SIZE,
                actual: bytes.len(),
            });
        }

        Ok(Self {
            result: ResultRecord::from_bits(u32::from_le_bytes(take(bytes, 0))),
            arg1: u64::from_le_bytes(take(bytes, 8)),
            arg2: u64::from_le_bytes(take(bytes, 16)),
            arg3: u64::from_le_bytes(take(bytes, 24)),
        })
    }

    /// Prefix and payload as the service lays them out in the region.
    pub fn to_framed_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(COMPLETION_PREFIX_SIZE + COMPLETION_RECORD_SIZE);
        out.extend_from_slice(&(COMPLETION_RECORD_SIZE as u32).to_le_bytes());
        out.extend_from_slice(&self.to_bytes());
        out
    }
}
