//! The 100-byte call envelope.

use crate::descriptor::{CallDescriptor, ResultRecord};
use crate::error::LayoutError;

/// Total size of the packed envelope.
pub const ENVELOPE_SIZE: usize = 100;

pub(crate) const CALL_OFFSET: usize = 0;
pub(crate) const RESULT_OFFSET: usize = 4;
pub(crate) const PADDING_OFFSET: usize = 8;
pub(crate) const ARG1_OFFSET: usize = 12;
pub(crate) const ARG2_OFFSET: usize = 20;
pub(crate) const ARG3_OFFSET: usize = 28;
pub(crate) const EXT_ARGS_OFFSET: usize = 36;
pub(crate) const EXT_ARG_SIZE: usize = 16;

/// Fixed-layout buffer exchanged with the service on every trap.
///
/// The in-memory form is an ordinary Rust struct; [`Envelope::to_bytes`] and
/// [`Envelope::from_bytes`] produce and consume the packed little-endian wire
/// form. `Default` is the zeroed envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Envelope {
    pub call: CallDescriptor,
    pub result: ResultRecord,
    pub padding: u32,
    pub arg1: u64,
    pub arg2: u64,
    pub arg3: u64,
    pub ext_args: [u128; 4],
}

impl Envelope {
    pub fn new(call: CallDescriptor) -> Self {
        Self {
            call,
            ..Self::default()
        }
    }

    /// Zero every field in place.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn to_bytes(&self) -> [u8; ENVELOPE_SIZE] {
        let mut out = [0u8; ENVELOPE_SIZE];
        put(&mut out, CALL_OFFSET, &self.call.into_bits().to_le_bytes());
        put(&mut out, RESULT_OFFSET, &self.result.into_bits().to_le_bytes());
        put(&mut out, PADDING_OFFSET, &self.padding.to_le_bytes());
        put(&mut out, ARG1_OFFSET, &self.arg1.to_le_bytes());
        put(&mut out, ARG2_OFFSET, &self.arg2.to_le_bytes());
        put(&mut out, ARG3_OFFSET, &self.arg3.to_le_bytes());
        for (index, ext) in self.ext_args.iter().enumerate() {
            put(
                &mut out,
                EXT_ARGS_OFFSET + index * EXT_ARG_SIZE,
                &ext.to_le_bytes(),
            );
        }
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LayoutError> {
        if bytes.len() != ENVELOPE_SIZE {
            return Err(LayoutError::WrongSize {
                expected: ENVELOPE_SIZE,
                actual: bytes.len(),
            });
        }

        let mut ext_args = [0u128; 4];
        for (index, ext) in ext_args.iter_mut().enumerate() {
            *ext = u128::from_le_bytes(take(bytes, EXT_ARGS_OFFSET + index * EXT_ARG_SIZE));
        }

        Ok(Self {
            call: CallDescriptor::from_bits(u32::from_le_bytes(take(bytes, CALL_OFFSET))),
            result: ResultRecord::from_bits(u32::from_le_bytes(take(bytes, RESULT_OFFSET))),
            padding: u32::from_le_bytes(take(bytes, PADDING_OFFSET)),
            arg1: u64::from_le_bytes(take(bytes, ARG1_OFFSET)),
            arg2: u64::from_le_bytes(take(bytes, ARG2_OFFSET)),
            arg3: u64::from_le_bytes(take(bytes, ARG3_OFFSET)),
            ext_args,
        })
    }
}

fn put(out: &mut [u8], offset: usize, bytes: &[u8]) {
    out[offset..offset + bytes.len()].copy_from_slice(bytes);
}

// Callers have already checked the length.
pub(crate) fn take<const N: usize>(bytes: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[offset..offset + N]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_types::{ErrorCode, ErrorSource, OperationId};

    #[test]
    fn test_default_is_all_zero() {
        assert_eq!(Envelope::default().to_bytes(), [0u8; ENVELOPE_SIZE]);
    }

    #[test]
    fn test_field_offsets() {
        let mut envelope = Envelope::new(CallDescriptor::for_operation(OperationId::OpenProcess));
        envelope.arg1 = 0x1122_3344_5566_7788;
        envelope.ext_args[3] = 0xaa;
        let bytes = envelope.to_bytes();

        assert_eq!(bytes[0], 3);
        assert_eq!(bytes[12], 0x88);
        assert_eq!(bytes[19], 0x11);
        assert_eq!(bytes[84], 0xaa);
        assert!(bytes[85..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_bytes_roundtrip_keeps_result() {
        let mut envelope = Envelope::default();
        envelope.result = ResultRecord::from_parts(
            OperationId::KillProcess,
            ErrorSource::Nt,
            ErrorCode::NotAllowed,
        );
        envelope.arg3 = u64::MAX;
        envelope.ext_args[1] = u128::MAX;

        let decoded = Envelope::from_bytes(&envelope.to_bytes()).unwrap();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn test_from_bytes_rejects_wrong_size() {
        let err = Envelope::from_bytes(&[0u8; 99]).unwrap_err();
        assert_eq!(
            err,
            LayoutError::WrongSize {
                expected: 100,
                actual: 99
            }
        );
    }

    #[test]
    fn test_clear_zeroes_everything() {
        let mut envelope = Envelope::new(CallDescriptor::for_operation(OperationId::Status).with_is_fast(true));
        envelope.arg2 = 7;
        envelope.clear();
        assert_eq!(envelope, Envelope::default());
    }
}
