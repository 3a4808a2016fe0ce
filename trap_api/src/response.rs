//! Typed responses and their decoding from envelopes and completion records.

use crate::alloc::OwnedEnvelope;
use crate::error::{self, Error};
use call_types::{
    ObjectHandle, OperationId, Permissions, ProcessFieldValue, ServiceState, ThreadFieldValue,
    TokenFieldValue,
};
use envelope::{CompletionRecord, ResultRecord};
use log::warn;

/// Decoded result of a successful call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Status {
        state: ServiceState,
        version: u64,
    },
    Authorize {
        granted: Permissions,
    },
    OpenProcess {
        process: ObjectHandle,
    },
    CloseProcess,
    KillProcess,
    GetProcessField {
        value: ProcessFieldValue,
    },
    SetProcessField,
    ReadWriteVirtualMemory {
        bytes_processed: u64,
    },
    ProtectVirtualMemory {
        old_protection: u64,
        base_address: u64,
        bytes_processed: u64,
    },
    AllocateMemory {
        memory: ObjectHandle,
        bytes_allocated: u64,
    },
    MapMemory {
        mapped_address: u64,
    },
    FreeMemory,
    GetProcessThreads {
        count: u64,
    },
    OpenThread {
        thread: ObjectHandle,
    },
    CloseThread,
    GetThreadField {
        value: ThreadFieldValue,
    },
    SetThreadField,
    OpenToken {
        token: ObjectHandle,
    },
    GetTokenField {
        value: TokenFieldValue,
    },
    CloseToken,
    SetTokenField,
    RegisterNotification {
        registration: ObjectHandle,
    },
    UnregisterNotification,
    CancelAsyncCall,
}

impl Response {
    pub fn operation(&self) -> OperationId {
        match self {
            Response::Status { .. } => OperationId::Status,
            Response::Authorize { .. } => OperationId::Authorize,
            Response::OpenProcess { .. } => OperationId::OpenProcess,
            Response::CloseProcess => OperationId::CloseProcess,
            Response::KillProcess => OperationId::KillProcess,
            Response::GetProcessField { .. } => OperationId::GetProcessField,
            Response::SetProcessField => OperationId::SetProcessField,
            Response::ReadWriteVirtualMemory { .. } => OperationId::ReadWriteVirtualMemory,
            Response::ProtectVirtualMemory { .. } => OperationId::ProtectVirtualMemory,
            Response::AllocateMemory { .. } => OperationId::AllocateMemory,
            Response::MapMemory { .. } => OperationId::MapMemory,
            Response::FreeMemory => OperationId::FreeMemory,
            Response::GetProcessThreads { .. } => OperationId::GetProcessThreads,
            Response::OpenThread { .. } => OperationId::OpenThread,
            Response::CloseThread => OperationId::CloseThread,
            Response::GetThreadField { .. } => OperationId::GetThreadField,
            Response::SetThreadField => OperationId::SetThreadField,
            Response::OpenToken { .. } => OperationId::OpenToken,
            Response::GetTokenField { .. } => OperationId::GetTokenField,
            Response::CloseToken => OperationId::CloseToken,
            Response::SetTokenField => OperationId::SetTokenField,
            Response::RegisterNotification { .. } => OperationId::RegisterNotification,
            Response::UnregisterNotification => OperationId::UnregisterNotification,
            Response::CancelAsyncCall => OperationId::CancelAsyncCall,
        }
    }

    /// Interprets the three response slots as the answer to `operation`.
    pub fn from_slots(operation: OperationId, arg1: u64, arg2: u64, arg3: u64) -> Self {
        match operation {
            OperationId::Status => Response::Status {
                state: ServiceState::from_bits(arg1),
                version: arg2,
            },
            OperationId::Authorize => Response::Authorize {
                granted: Permissions::from_bits_retain(arg1),
            },
            OperationId::OpenProcess => Response::OpenProcess {
                process: ObjectHandle::from_raw(arg1),
            },
            OperationId::CloseProcess => Response::CloseProcess,
            OperationId::KillProcess => Response::KillProcess,
            OperationId::GetProcessField => Response::GetProcessField {
                value: ProcessFieldValue::decode(arg1, arg2),
            },
            OperationId::SetProcessField => Response::SetProcessField,
            OperationId::ReadWriteVirtualMemory => Response::ReadWriteVirtualMemory {
                bytes_processed: arg1,
            },
            OperationId::ProtectVirtualMemory => Response::ProtectVirtualMemory {
                old_protection: arg1,
                base_address: arg2,
                bytes_processed: arg3,
            },
            OperationId::AllocateMemory => Response::AllocateMemory {
                memory: ObjectHandle::from_raw(arg1),
                bytes_allocated: arg2,
            },
            OperationId::MapMemory => Response::MapMemory {
                mapped_address: arg1,
            },
            OperationId::FreeMemory => Response::FreeMemory,
            OperationId::GetProcessThreads => Response::GetProcessThreads { count: arg1 },
            OperationId::OpenThread => Response::OpenThread {
                thread: ObjectHandle::from_raw(arg1),
            },
            OperationId::CloseThread => Response::CloseThread,
            OperationId::GetThreadField => Response::GetThreadField {
                value: ThreadFieldValue::decode(arg1, arg2),
            },
            OperationId::SetThreadField => Response::SetThreadField,
            OperationId::OpenToken => Response::OpenToken {
                token: ObjectHandle::from_raw(arg1),
            },
            OperationId::GetTokenField => Response::GetTokenField {
                value: TokenFieldValue::decode(arg1, arg2),
            },
            OperationId::CloseToken => Response::CloseToken,
            OperationId::SetTokenField => Response::SetTokenField,
            OperationId::RegisterNotification => Response::RegisterNotification {
                registration: ObjectHandle::from_raw(arg1),
            },
            OperationId::UnregisterNotification => Response::UnregisterNotification,
            OperationId::CancelAsyncCall => Response::CancelAsyncCall,
        }
    }

    /// The three response slots a service writes for this response.
    pub fn to_slots(&self) -> [u64; 3] {
        match *self {
            Response::Status { state, version } => [state.into_bits(), version, 0],
            Response::Authorize { granted } => [granted.bits(), 0, 0],
            Response::OpenProcess { process: handle }
            | Response::OpenThread { thread: handle }
            | Response::OpenToken { token: handle }
            | Response::RegisterNotification {
                registration: handle,
            } => [handle.as_raw(), 0, 0],
            Response::GetProcessField { value } => {
                let (tag, raw) = value.encode();
                [tag, raw, 0]
            }
            Response::GetThreadField { value } => {
                let (tag, raw) = value.encode();
                [tag, raw, 0]
            }
            Response::GetTokenField { value } => {
                let (tag, raw) = value.encode();
                [tag, raw, 0]
            }
            Response::ReadWriteVirtualMemory { bytes_processed } => [bytes_processed, 0, 0],
            Response::ProtectVirtualMemory {
                old_protection,
                base_address,
                bytes_processed,
            } => [old_protection, base_address, bytes_processed],
            Response::AllocateMemory {
                memory,
                bytes_allocated,
            } => [memory.as_raw(), bytes_allocated, 0],
            Response::MapMemory { mapped_address } => [mapped_address, 0, 0],
            Response::GetProcessThreads { count } => [count, 0, 0],
            Response::CloseProcess
            | Response::KillProcess
            | Response::SetProcessField
            | Response::FreeMemory
            | Response::CloseThread
            | Response::SetThreadField
            | Response::CloseToken
            | Response::SetTokenField
            | Response::UnregisterNotification
            | Response::CancelAsyncCall => [0; 3],
        }
    }
}

/// Decodes a synchronous answer.
///
/// The envelope is consumed and returned to its allocator on every path.
/// On an error result the argument slots are not read.
pub fn decode(envelope: OwnedEnvelope<'_>, operation: OperationId) -> Result<Response, Error> {
    settle(envelope.result, operation)?;
    Ok(Response::from_slots(
        operation,
        envelope.arg1,
        envelope.arg2,
        envelope.arg3,
    ))
}

/// Decodes a completion record read from the shared region.
pub fn decode_completion(
    record: &CompletionRecord,
    operation: OperationId,
) -> Result<Response, Error> {
    settle(record.result, operation)?;
    Ok(Response::from_slots(
        operation,
        record.arg1,
        record.arg2,
        record.arg3,
    ))
}

fn settle(result: ResultRecord, operation: OperationId) -> Result<(), Error> {
    if result.operation_bits() != operation.into_bits() {
        warn!(
            "result echoes operation {} but {} was requested",
            result.operation_bits(),
            operation
        );
    }
    error::check(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::HeapAllocator;
    use call_types::{
        ErrorCode, ErrorSource, ProcessProtection, ProtectionSigner, ProtectionType, TokenType,
    };

    #[test]
    fn test_open_process_decodes_address() {
        let mut owned = OwnedEnvelope::acquire(&HeapAllocator);
        owned.result = ResultRecord::ok(OperationId::OpenProcess);
        owned.arg1 = 0xffff_c001_2345_6780;

        let response = decode(owned, OperationId::OpenProcess).unwrap();
        assert_eq!(
            response,
            Response::OpenProcess {
                process: ObjectHandle::from_raw(0xffff_c001_2345_6780)
            }
        );
    }

    #[test]
    fn test_error_result_skips_slots() {
        let mut owned = OwnedEnvelope::acquire(&HeapAllocator);
        owned.result = ResultRecord::from_parts(
            OperationId::GetTokenField,
            ErrorSource::Hx,
            ErrorCode::NotAllowed,
        );
        owned.arg1 = 3;

        let err = decode(owned, OperationId::GetTokenField).unwrap_err();
        assert_eq!(err, Error::new(ErrorSource::Hx, ErrorCode::NotAllowed));
    }

    #[test]
    fn test_mismatched_echo_uses_requested_operation() {
        let mut owned = OwnedEnvelope::acquire(&HeapAllocator);
        owned.result = ResultRecord::ok(OperationId::OpenThread);
        owned.arg1 = 7;

        let response = decode(owned, OperationId::AllocateMemory).unwrap();
        assert_eq!(
            response,
            Response::AllocateMemory {
                memory: ObjectHandle::from_raw(7),
                bytes_allocated: 0
            }
        );
    }

    #[test]
    fn test_zeroed_result_is_an_error() {
        let owned = OwnedEnvelope::acquire(&HeapAllocator);
        let err = decode(owned, OperationId::Status).unwrap_err();
        assert_eq!(err, Error::new(ErrorSource::Nt, ErrorCode::Unknown));
    }

    #[test]
    fn test_field_union_by_tag() {
        let protection = ProcessProtection::new()
            .with_protection_type(ProtectionType::Protected)
            .with_signer(ProtectionSigner::WinTcb);
        let response = Response::GetProcessField {
            value: ProcessFieldValue::Protection(protection),
        };
        let [arg1, arg2, arg3] = response.to_slots();
        assert_eq!(
            Response::from_slots(OperationId::GetProcessField, arg1, arg2, arg3),
            response
        );

        let token = Response::from_slots(OperationId::GetTokenField, 3, 1, 0);
        assert_eq!(
            token,
            Response::GetTokenField {
                value: TokenFieldValue::Type(TokenType::Impersonation)
            }
        );
    }

    #[test]
    fn test_completion_record_decode() {
        let record = CompletionRecord {
            result: ResultRecord::ok(OperationId::ProtectVirtualMemory),
            arg1: 0x04,
            arg2: 0x7ff6_0000,
            arg3: 0x1000,
        };
        assert_eq!(
            decode_completion(&record, OperationId::ProtectVirtualMemory).unwrap(),
            Response::ProtectVirtualMemory {
                old_protection: 0x04,
                base_address: 0x7ff6_0000,
                bytes_processed: 0x1000
            }
        );
    }

    #[test]
    fn test_wide_slots_are_kept_whole() {
        assert_eq!(
            Response::from_slots(OperationId::GetProcessThreads, 0x1_0000_0005, 0, 0),
            Response::GetProcessThreads {
                count: 0x1_0000_0005
            }
        );

        let status = Response::from_slots(OperationId::Status, 1, 0x2_0000_0001, 0);
        assert_eq!(status.to_slots()[1], 0x2_0000_0001);

        let protect = Response::from_slots(OperationId::ProtectVirtualMemory, 1 << 40, 0, 0);
        assert_eq!(protect.to_slots(), [1 << 40, 0, 0]);

        let path = Response::from_slots(OperationId::GetProcessField, 1, 0x1_0010, 0);
        assert_eq!(path.to_slots(), [1, 0x1_0010, 0]);
    }

    #[test]
    fn test_every_operation_maps_back() {
        for operation in OperationId::ALL {
            assert_eq!(Response::from_slots(operation, 0, 0, 0).operation(), operation);
        }
    }
}
