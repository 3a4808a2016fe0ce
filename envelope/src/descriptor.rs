//! Call descriptor and result record words.
//!
//! Both are 32-bit packed words. The raw bits are stored as written, so a
//! word from the service with unexpected bits is still representable and
//! round-trips unchanged.

use bitfield_struct::bitfield;
use call_types::{ErrorCode, ErrorSource, OperationId};

/// Call descriptor: bits 0-15 operation, 16 fast, 17 ignore-result,
/// 18 yield-execution, 19 async, 20 extended-args-present, 21-31 reserved.
#[bitfield(u32)]
#[derive(PartialEq, Eq, Hash)]
pub struct CallDescriptor {
    /// Raw operation id. Kept unparsed so foreign ids survive.
    #[bits(16)]
    pub operation_bits: u16,
    pub is_fast: bool,
    pub ignore_result: bool,
    pub yield_execution: bool,
    pub is_async: bool,
    pub extended_args_present: bool,
    #[bits(11)]
    pub reserved: u16,
}

impl CallDescriptor {
    pub const fn for_operation(operation: OperationId) -> Self {
        Self::new().with_operation_bits(operation.into_bits())
    }

    pub const fn operation(self) -> Option<OperationId> {
        OperationId::from_bits(self.operation_bits())
    }
}

/// Result record: bits 0-15 echoed operation, 16-17 error source,
/// 18-20 error code, 21-31 reserved.
#[bitfield(u32)]
#[derive(PartialEq, Eq, Hash)]
pub struct ResultRecord {
    #[bits(16)]
    pub operation_bits: u16,
    /// Raw source. Pattern 3 is unassigned, see [`ResultRecord::source`].
    #[bits(2)]
    pub source_bits: u8,
    #[bits(3)]
    pub code: ErrorCode,
    #[bits(11)]
    pub reserved: u16,
}

impl ResultRecord {
    pub const fn from_parts(operation: OperationId, source: ErrorSource, code: ErrorCode) -> Self {
        Self::new()
            .with_operation_bits(operation.into_bits())
            .with_source_bits(source.into_bits())
            .with_code(code)
    }

    /// A protocol-level success for `operation`.
    pub const fn ok(operation: OperationId) -> Self {
        Self::from_parts(operation, ErrorSource::Hx, ErrorCode::Ok)
    }

    pub const fn operation(self) -> Option<OperationId> {
        OperationId::from_bits(self.operation_bits())
    }

    /// `None` when the service wrote the unassigned source pattern.
    pub const fn source(self) -> Option<ErrorSource> {
        ErrorSource::from_bits(self.source_bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_flag_bits() {
        let call = CallDescriptor::for_operation(OperationId::GetProcessField)
            .with_extended_args_present(true);
        assert_eq!(call.into_bits(), 8 | (1 << 20));
        assert!(call.extended_args_present());
        assert!(!call.is_fast());

        let call = call
            .with_is_fast(true)
            .with_is_async(true)
            .with_extended_args_present(false);
        assert_eq!(call.into_bits(), 8 | (1 << 16) | (1 << 19));
    }

    #[test]
    fn test_every_flag_has_its_own_bit() {
        let all = CallDescriptor::default()
            .with_is_fast(true)
            .with_ignore_result(true)
            .with_yield_execution(true)
            .with_is_async(true)
            .with_extended_args_present(true);
        assert_eq!(all.into_bits(), 0b1_1111 << 16);
        assert_eq!(all.operation(), None);
    }

    #[test]
    fn test_descriptor_keeps_foreign_operation_id() {
        let call = CallDescriptor::from_bits(0xffff_0014);
        assert_eq!(call.operation_bits(), 20);
        assert_eq!(call.operation(), None);
        assert!(call.is_fast() && call.is_async());
        assert_eq!(call.reserved(), 0x7ff);
        assert_eq!(call.into_bits(), 0xffff_0014);
    }

    #[test]
    fn test_field_offsets() {
        assert_eq!(CallDescriptor::OPERATION_BITS_BITS, 16);
        assert_eq!(CallDescriptor::IS_FAST_OFFSET, 16);
        assert_eq!(CallDescriptor::EXTENDED_ARGS_PRESENT_OFFSET, 20);
        assert_eq!(CallDescriptor::RESERVED_OFFSET, 21);
        assert_eq!(ResultRecord::SOURCE_BITS_OFFSET, 16);
        assert_eq!(ResultRecord::CODE_OFFSET, 18);
        assert_eq!(ResultRecord::RESERVED_OFFSET, 21);
    }

    #[test]
    fn test_result_record_packing() {
        let record = ResultRecord::from_parts(
            OperationId::OpenProcess,
            ErrorSource::Hv,
            ErrorCode::NotFound,
        );
        assert_eq!(record.into_bits(), 3 | (1 << 16) | (4 << 18));
        assert_eq!(record.operation(), Some(OperationId::OpenProcess));
        assert_eq!(record.source(), Some(ErrorSource::Hv));
        assert_eq!(record.code(), ErrorCode::NotFound);
        assert_eq!(record.reserved(), 0);
    }

    #[test]
    fn test_result_record_ok() {
        let record = ResultRecord::ok(OperationId::Status);
        assert_eq!(record.source(), Some(ErrorSource::Hx));
        assert_eq!(record.code(), ErrorCode::Ok);
    }

    #[test]
    fn test_result_record_keeps_foreign_bits() {
        let record = ResultRecord::from_bits(0xffff_ffff);
        assert_eq!(record.operation(), None);
        assert_eq!(record.source(), None);
        assert_eq!(record.code(), ErrorCode::Unknown);
        assert_eq!(record.reserved(), 0x7ff);
        assert_eq!(record.into_bits(), 0xffff_ffff);
    }
}
