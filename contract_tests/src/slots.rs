//! Per-operation slot assignment contract tests
//!
//! Each test encodes one request with distinctive values and checks the
//! raw bytes of every argument slot.

#[cfg(test)]
mod tests {
    use crate::test_helpers::*;
    use call_types::{
        DataBuffer, MapOperation, MemoryPool, NotifyObjectKind, ObjectHandle, OpenType,
        Permissions, ProcessField, ThreadField, TokenField, VmOperation,
    };
    use trap_api::Request;
    use uuid::Uuid;

    const OBJECT: ObjectHandle = ObjectHandle::from_raw(0xffff_a000_0000_1000);
    const BUFFER: DataBuffer = DataBuffer::new(0x0000_7ff0_1234_0000, 0x200);

    fn buffer_slot() -> u128 {
        0x0000_7ff0_1234_0000 | (0x200u128 << 64)
    }

    #[test]
    fn test_status_has_no_arguments() {
        let bytes = encode_bytes(Request::Status);
        verify_scalar_slots(&bytes, [0, 0, 0]);
        verify_extended_slots(&bytes, [0; 4]);
    }

    #[test]
    fn test_authorize_contract() {
        let guid = Uuid::parse_str("00112233-4455-6677-8899-aabbccddeeff").unwrap();
        let bytes = encode_bytes(Request::Authorize {
            permissions: Permissions::PROCESS_EXECUTIVE | Permissions::SECURITY_MANAGE,
            guid,
        });
        verify_scalar_slots(&bytes, [1 | (1 << 28), 0, 0]);
        assert_eq!(
            &bytes[36..52],
            &[
                0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc,
                0xdd, 0xee, 0xff
            ]
        );
    }

    #[test]
    fn test_open_process_contract() {
        let bytes = encode_bytes(Request::OpenProcess {
            process_id: 6892,
            open_type: OpenType::Handle,
        });
        verify_scalar_slots(&bytes, [6892, 0, 0]);
        verify_extended_slots(&bytes, [0; 4]);
    }

    #[test]
    fn test_process_object_contracts() {
        let bytes = encode_bytes(Request::CloseProcess {
            process: OBJECT,
            open_type: OpenType::Hypervisor,
        });
        verify_scalar_slots(&bytes, [OBJECT.as_raw(), 1, 0]);

        let bytes = encode_bytes(Request::KillProcess {
            process: OBJECT,
            exit_code: 0xc000_0005,
        });
        verify_scalar_slots(&bytes, [OBJECT.as_raw(), 0xc000_0005, 0]);

        let bytes = encode_bytes(Request::GetProcessThreads {
            process: OBJECT,
            buffer: BUFFER,
        });
        verify_scalar_slots(&bytes, [OBJECT.as_raw(), BUFFER.address, BUFFER.len]);
        verify_extended_slots(&bytes, [0; 4]);
    }

    #[test]
    fn test_field_accessor_contracts() {
        let bytes = encode_bytes(Request::GetProcessField {
            process: OBJECT,
            field: ProcessField::MitigationFlags,
            buffer: BUFFER,
        });
        verify_scalar_slots(&bytes, [OBJECT.as_raw(), 4, 0]);
        verify_extended_slots(&bytes, [buffer_slot(), 0, 0, 0]);

        let bytes = encode_bytes(Request::SetThreadField {
            thread: OBJECT,
            field: ThreadField::AdjustedClientToken,
            value: 0x77,
            buffer: DataBuffer::EMPTY,
        });
        verify_scalar_slots(&bytes, [OBJECT.as_raw(), 2, 0x77]);
        verify_extended_slots(&bytes, [0; 4]);

        let bytes = encode_bytes(Request::GetTokenField {
            token: OBJECT,
            field: TokenField::EnabledByDefaultPrivileges,
            buffer: BUFFER,
        });
        verify_scalar_slots(&bytes, [OBJECT.as_raw(), 9, 0]);
        verify_extended_slots(&bytes, [buffer_slot(), 0, 0, 0]);
    }

    #[test]
    fn test_thread_and_token_contracts() {
        let bytes = encode_bytes(Request::OpenThread {
            thread_id: 0x1d4c,
            open_type: OpenType::Handle,
        });
        verify_scalar_slots(&bytes, [0x1d4c, 0, 0]);

        let bytes = encode_bytes(Request::OpenToken {
            token: OBJECT,
            open_type: OpenType::Hypervisor,
        });
        verify_scalar_slots(&bytes, [OBJECT.as_raw(), 1, 0]);

        for request in [
            Request::CloseThread { thread: OBJECT },
            Request::CloseToken { token: OBJECT },
            Request::FreeMemory { memory: OBJECT },
            Request::UnregisterNotification {
                registration: OBJECT,
            },
        ] {
            verify_scalar_slots(&encode_bytes(request), [OBJECT.as_raw(), 0, 0]);
        }
    }

    #[test]
    fn test_memory_contracts() {
        let bytes = encode_bytes(Request::AllocateMemory {
            size: 0x4000,
            pool: MemoryPool::NonPaged,
        });
        verify_scalar_slots(&bytes, [0x4000, 0, 0]);

        let bytes = encode_bytes(Request::MapMemory {
            memory: OBJECT,
            map_address: 0x1_0000_0000,
            operation: MapOperation::Unmap,
        });
        verify_scalar_slots(&bytes, [OBJECT.as_raw(), 0x1_0000_0000, 1]);
        verify_extended_slots(&bytes, [0; 4]);

        let bytes = encode_bytes(Request::ProtectVirtualMemory {
            process: OBJECT,
            address: 0x7ff6_0000_0000,
            protection: 0x40,
        });
        verify_scalar_slots(&bytes, [OBJECT.as_raw(), 0x7ff6_0000_0000, 0x40]);

        let bytes = encode_bytes(Request::ReadWriteVirtualMemory {
            process: OBJECT,
            address: 0x7ff6_0000_1000,
            count: 0x200,
            buffer: BUFFER,
            operation: VmOperation::Write,
        });
        verify_scalar_slots(&bytes, [OBJECT.as_raw(), 0x7ff6_0000_1000, 0x200]);
        verify_extended_slots(&bytes, [buffer_slot(), 1, 0, 0]);
    }

    #[test]
    fn test_notification_and_cancel_contracts() {
        let bytes = encode_bytes(Request::RegisterNotification {
            kind: NotifyObjectKind::Token,
            event: 0x3f0,
        });
        verify_scalar_slots(&bytes, [3, 0, 0x3f0]);

        let bytes = encode_bytes(Request::CancelAsyncCall { offset: 0x180 });
        verify_scalar_slots(&bytes, [0x180, 0, 0]);
    }
}
