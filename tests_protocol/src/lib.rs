//! Protocol Test Utilities
//!
//! This crate provides shared fixtures for the cross-crate protocol tests in
//! `tests/`.
//!
//! ## Test Philosophy
//!
//! - **Whole path**: requests go through the real encoder, a simulated
//!   service, and the real decoder
//! - **Deterministic failures**: every transport fault comes from a FaultPlan
//! - **No leaks**: every envelope a call acquires is released, on every path

use call_types::{
    DataBuffer, ImpersonationLevel, MapOperation, MemoryPool, MitigationFlags, NotifyObjectKind,
    ObjectHandle, OpenType, OperationId, Permissions, ProcessField, ProcessFieldValue,
    ServiceState, ThreadField, ThreadFieldValue, TokenField, TokenFieldValue, VmOperation,
};
use trap_api::{Request, Response};
use uuid::Uuid;

pub use sim_service::test_utils::Harness;

/// An object address in the kernel half, as the service hands them out.
pub const SAMPLE_OBJECT: ObjectHandle = ObjectHandle::from_raw(0xffff_b28c_4410_2080);

/// One realistic request for `operation`.
pub fn sample_request(operation: OperationId) -> Request {
    let buffer = DataBuffer::new(0x0000_02a1_7f00_0000, 0x100);
    match operation {
        OperationId::Status => Request::Status,
        OperationId::Authorize => Request::Authorize {
            permissions: Permissions::PROCESS_EXECUTIVE | Permissions::MEMORY_VIRTUAL,
            guid: Uuid::from_u128(0x6f1d_2c3b_4a59_4867_9584_a3b2_c1d0_e9f8),
        },
        OperationId::OpenProcess => Request::OpenProcess {
            process_id: 6892,
            open_type: OpenType::Handle,
        },
        OperationId::CloseProcess => Request::CloseProcess {
            process: SAMPLE_OBJECT,
            open_type: OpenType::Handle,
        },
        OperationId::KillProcess => Request::KillProcess {
            process: SAMPLE_OBJECT,
            exit_code: 1,
        },
        OperationId::GetProcessField => Request::GetProcessField {
            process: SAMPLE_OBJECT,
            field: ProcessField::NtPath,
            buffer,
        },
        OperationId::SetProcessField => Request::SetProcessField {
            process: SAMPLE_OBJECT,
            field: ProcessField::Protection,
            value: 0x61,
            buffer: DataBuffer::EMPTY,
        },
        OperationId::ReadWriteVirtualMemory => Request::ReadWriteVirtualMemory {
            process: SAMPLE_OBJECT,
            address: 0x7ff6_1000_0000,
            count: 0x100,
            buffer,
            operation: VmOperation::Read,
        },
        OperationId::ProtectVirtualMemory => Request::ProtectVirtualMemory {
            process: SAMPLE_OBJECT,
            address: 0x7ff6_1000_0000,
            protection: 0x04,
        },
        OperationId::AllocateMemory => Request::AllocateMemory {
            size: 0x2000,
            pool: MemoryPool::NonPaged,
        },
        OperationId::MapMemory => Request::MapMemory {
            memory: SAMPLE_OBJECT,
            map_address: 0x0000_0200_0000_0000,
            operation: MapOperation::Map,
        },
        OperationId::FreeMemory => Request::FreeMemory {
            memory: SAMPLE_OBJECT,
        },
        OperationId::GetProcessThreads => Request::GetProcessThreads {
            process: SAMPLE_OBJECT,
            buffer,
        },
        OperationId::OpenThread => Request::OpenThread {
            thread_id: 7312,
            open_type: OpenType::Hypervisor,
        },
        OperationId::CloseThread => Request::CloseThread {
            thread: SAMPLE_OBJECT,
        },
        OperationId::GetThreadField => Request::GetThreadField {
            thread: SAMPLE_OBJECT,
            field: ThreadField::ActiveImpersonationInfo,
            buffer: DataBuffer::EMPTY,
        },
        OperationId::SetThreadField => Request::SetThreadField {
            thread: SAMPLE_OBJECT,
            field: ThreadField::AdjustedClientToken,
            value: SAMPLE_OBJECT.as_raw(),
            buffer: DataBuffer::EMPTY,
        },
        OperationId::OpenToken => Request::OpenToken {
            token: SAMPLE_OBJECT,
            open_type: OpenType::Hypervisor,
        },
        OperationId::GetTokenField => Request::GetTokenField {
            token: SAMPLE_OBJECT,
            field: TokenField::ImpersonationLevel,
            buffer: DataBuffer::EMPTY,
        },
        OperationId::CloseToken => Request::CloseToken {
            token: SAMPLE_OBJECT,
        },
        OperationId::SetTokenField => Request::SetTokenField {
            token: SAMPLE_OBJECT,
            field: TokenField::IntegrityLevelIndex,
            value: 2,
            buffer: DataBuffer::EMPTY,
        },
        OperationId::RegisterNotification => Request::RegisterNotification {
            kind: NotifyObjectKind::Process,
            event: 0x2f4,
        },
        OperationId::UnregisterNotification => Request::UnregisterNotification {
            registration: SAMPLE_OBJECT,
        },
        OperationId::CancelAsyncCall => Request::CancelAsyncCall { offset: 0x400 },
    }
}

/// One successful response for `operation`, with `seed` mixed into every
/// carried value so concurrent calls can be told apart.
pub fn sample_response(operation: OperationId, seed: u32) -> Response {
    let wide = u64::from(seed);
    match operation {
        OperationId::Status => Response::Status {
            state: ServiceState::Virtualized,
            version: wide,
        },
        OperationId::Authorize => Response::Authorize {
            granted: Permissions::from_bits_retain(wide << 8),
        },
        OperationId::OpenProcess => Response::OpenProcess {
            process: ObjectHandle::from_raw(0xffff_9000_0000_0000 | wide),
        },
        OperationId::CloseProcess => Response::CloseProcess,
        OperationId::KillProcess => Response::KillProcess,
        OperationId::GetProcessField => Response::GetProcessField {
            value: ProcessFieldValue::MitigationFlags(MitigationFlags {
                first: seed,
                second: !seed,
            }),
        },
        OperationId::SetProcessField => Response::SetProcessField,
        OperationId::ReadWriteVirtualMemory => Response::ReadWriteVirtualMemory {
            bytes_processed: wide,
        },
        OperationId::ProtectVirtualMemory => Response::ProtectVirtualMemory {
            old_protection: wide,
            base_address: 0x7ff6_0000_0000 | (wide << 12),
            bytes_processed: 0x1000,
        },
        OperationId::AllocateMemory => Response::AllocateMemory {
            memory: ObjectHandle::from_raw(0xffff_a000_0000_0000 | wide),
            bytes_allocated: 0x2000 + wide,
        },
        OperationId::MapMemory => Response::MapMemory {
            mapped_address: 0x0000_0200_0000_0000 | wide,
        },
        OperationId::FreeMemory => Response::FreeMemory,
        OperationId::GetProcessThreads => Response::GetProcessThreads { count: wide },
        OperationId::OpenThread => Response::OpenThread {
            thread: ObjectHandle::from_raw(0xffff_9100_0000_0000 | wide),
        },
        OperationId::CloseThread => Response::CloseThread,
        OperationId::GetThreadField => Response::GetThreadField {
            value: ThreadFieldValue::AdjustedClientToken(ObjectHandle::from_raw(wide)),
        },
        OperationId::SetThreadField => Response::SetThreadField,
        OperationId::OpenToken => Response::OpenToken {
            token: ObjectHandle::from_raw(0xffff_9200_0000_0000 | wide),
        },
        OperationId::GetTokenField => Response::GetTokenField {
            value: match seed % 2 {
                0 => TokenFieldValue::ImpersonationLevel(ImpersonationLevel::Delegation),
                _ => TokenFieldValue::MandatoryPolicy(seed),
            },
        },
        OperationId::CloseToken => Response::CloseToken,
        OperationId::SetTokenField => Response::SetTokenField,
        OperationId::RegisterNotification => Response::RegisterNotification {
            registration: ObjectHandle::from_raw(0xffff_9300_0000_0000 | wide),
        },
        OperationId::UnregisterNotification => Response::UnregisterNotification,
        OperationId::CancelAsyncCall => Response::CancelAsyncCall,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_match_their_operation() {
        for operation in OperationId::ALL {
            assert_eq!(sample_request(operation).operation(), operation);
            assert_eq!(sample_response(operation, 7).operation(), operation);
        }
    }
}
