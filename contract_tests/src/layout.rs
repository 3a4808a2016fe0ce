//! Envelope and completion record layout contract tests
//!
//! These tests pin every field offset of the 100-byte envelope and of the
//! 32-byte completion record.

// ===== Layout Constants =====
pub const ENVELOPE_BYTES: usize = 100;
pub const COMPLETION_RECORD_BYTES: usize = 32;
pub const COMPLETION_PREFIX_BYTES: usize = 4;

pub const OFFSET_CALL: usize = 0;
pub const OFFSET_RESULT: usize = 4;
pub const OFFSET_PAD: usize = 8;
pub const OFFSET_ARG1: usize = 12;
pub const OFFSET_ARG2: usize = 20;
pub const OFFSET_ARG3: usize = 28;
pub const OFFSET_EXT_ARGS: [usize; 4] = [36, 52, 68, 84];

// ===== Contract Tests =====

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use call_types::{ErrorCode, ErrorSource, OperationId};
    use envelope::{
        CallDescriptor, CompletionRecord, Envelope, ResultRecord, COMPLETION_PREFIX_SIZE,
        COMPLETION_RECORD_SIZE, ENVELOPE_SIZE,
    };

    #[test]
    fn test_sizes() {
        assert_eq!(ENVELOPE_SIZE, ENVELOPE_BYTES);
        assert_eq!(COMPLETION_RECORD_SIZE, COMPLETION_RECORD_BYTES);
        assert_eq!(COMPLETION_PREFIX_SIZE, COMPLETION_PREFIX_BYTES);
    }

    #[test]
    fn test_each_field_lands_at_its_offset() {
        let envelope = Envelope {
            call: CallDescriptor::from_bits(0x1111_1111),
            result: ResultRecord::from_bits(0x2222_2222),
            padding: 0x3333_3333,
            arg1: 0x4444_4444_4444_4444,
            arg2: 0x5555_5555_5555_5555,
            arg3: 0x6666_6666_6666_6666,
            ext_args: [
                0x7777_7777_7777_7777_7777_7777_7777_7777,
                0x8888_8888_8888_8888_8888_8888_8888_8888,
                0x9999_9999_9999_9999_9999_9999_9999_9999,
                0xaaaa_aaaa_aaaa_aaaa_aaaa_aaaa_aaaa_aaaa,
            ],
        };
        let bytes = envelope.to_bytes();

        assert_eq!(u32_at(&bytes, OFFSET_CALL), 0x1111_1111);
        assert_eq!(u32_at(&bytes, OFFSET_RESULT), 0x2222_2222);
        assert_eq!(u32_at(&bytes, OFFSET_PAD), 0x3333_3333);
        assert_eq!(u64_at(&bytes, OFFSET_ARG1), 0x4444_4444_4444_4444);
        assert_eq!(u64_at(&bytes, OFFSET_ARG2), 0x5555_5555_5555_5555);
        assert_eq!(u64_at(&bytes, OFFSET_ARG3), 0x6666_6666_6666_6666);
        for (index, offset) in OFFSET_EXT_ARGS.iter().enumerate() {
            assert_eq!(u128_at(&bytes, *offset), envelope.ext_args[index]);
        }
    }

    #[test]
    fn test_little_endian_golden_bytes() {
        let mut envelope = Envelope::new(CallDescriptor::for_operation(OperationId::Authorize));
        envelope.arg1 = 0x0102_0304_0506_0708;
        let bytes = envelope.to_bytes();

        assert_eq!(&bytes[0..4], &[0x01, 0x00, 0x00, 0x00]);
        assert_eq!(
            &bytes[12..20],
            &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]
        );
    }

    #[test]
    fn test_descriptor_bit_positions() {
        let bits = |call: CallDescriptor| call.into_bits();
        let base = CallDescriptor::default();
        assert_eq!(bits(base.with_is_fast(true)), 1 << 16);
        assert_eq!(bits(base.with_ignore_result(true)), 1 << 17);
        assert_eq!(bits(base.with_yield_execution(true)), 1 << 18);
        assert_eq!(bits(base.with_is_async(true)), 1 << 19);
        assert_eq!(bits(base.with_extended_args_present(true)), 1 << 20);
        assert_eq!(bits(CallDescriptor::for_operation(OperationId::CancelAsyncCall)), 29);
    }

    #[test]
    fn test_result_bit_positions() {
        let record = ResultRecord::from_parts(OperationId::SetTokenField, ErrorSource::Hx, ErrorCode::Ok);
        assert_eq!(record.into_bits(), 26 | (2 << 16) | (1 << 18));

        let record = ResultRecord::from_parts(
            OperationId::Status,
            ErrorSource::Nt,
            ErrorCode::InvalidParams,
        );
        assert_eq!(record.into_bits(), 2 | (5 << 18));
    }

    #[test]
    fn test_completion_record_offsets() {
        let record = CompletionRecord {
            result: ResultRecord::from_bits(0xdead_beef),
            arg1: 1,
            arg2: 2,
            arg3: 3,
        };
        let bytes = record.to_bytes();
        assert_eq!(u32_at(&bytes, 0), 0xdead_beef);
        assert_eq!(u32_at(&bytes, 4), 0);
        assert_eq!(u64_at(&bytes, 8), 1);
        assert_eq!(u64_at(&bytes, 16), 2);
        assert_eq!(u64_at(&bytes, 24), 3);

        let framed = record.to_framed_bytes();
        assert_eq!(u32_at(&framed, 0), COMPLETION_RECORD_BYTES as u32);
        assert_eq!(&framed[COMPLETION_PREFIX_BYTES..], &bytes[..]);
    }
}
