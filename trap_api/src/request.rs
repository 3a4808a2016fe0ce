//! Typed requests and their envelope encoding.
//!
//! Each variant is the one request shape for its operation, so an operation
//! can never be paired with another operation's arguments.

use crate::catalog::descriptor_for;
use call_types::{
    DataBuffer, MapOperation, MemoryPool, NotifyObjectKind, ObjectHandle, OpenType, OperationId,
    Permissions, ProcessField, ThreadField, TokenField, VmOperation,
};
use envelope::Envelope;
use log::trace;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Status,
    Authorize {
        permissions: Permissions,
        guid: Uuid,
    },
    OpenProcess {
        process_id: u32,
        open_type: OpenType,
    },
    CloseProcess {
        process: ObjectHandle,
        open_type: OpenType,
    },
    KillProcess {
        process: ObjectHandle,
        exit_code: u32,
    },
    GetProcessField {
        process: ObjectHandle,
        field: ProcessField,
        buffer: DataBuffer,
    },
    SetProcessField {
        process: ObjectHandle,
        field: ProcessField,
        value: u64,
        buffer: DataBuffer,
    },
    ReadWriteVirtualMemory {
        process: ObjectHandle,
        address: u64,
        count: u64,
        buffer: DataBuffer,
        operation: VmOperation,
    },
    ProtectVirtualMemory {
        process: ObjectHandle,
        address: u64,
        protection: u32,
    },
    AllocateMemory {
        size: u64,
        pool: MemoryPool,
    },
    MapMemory {
        memory: ObjectHandle,
        map_address: u64,
        operation: MapOperation,
    },
    FreeMemory {
        memory: ObjectHandle,
    },
    GetProcessThreads {
        process: ObjectHandle,
        buffer: DataBuffer,
    },
    OpenThread {
        thread_id: u32,
        open_type: OpenType,
    },
    CloseThread {
        thread: ObjectHandle,
    },
    GetThreadField {
        thread: ObjectHandle,
        field: ThreadField,
        buffer: DataBuffer,
    },
    SetThreadField {
        thread: ObjectHandle,
        field: ThreadField,
        value: u64,
        buffer: DataBuffer,
    },
    OpenToken {
        token: ObjectHandle,
        open_type: OpenType,
    },
    GetTokenField {
        token: ObjectHandle,
        field: TokenField,
        buffer: DataBuffer,
    },
    CloseToken {
        token: ObjectHandle,
    },
    SetTokenField {
        token: ObjectHandle,
        field: TokenField,
        value: u64,
        buffer: DataBuffer,
    },
    RegisterNotification {
        kind: NotifyObjectKind,
        event: u64,
    },
    UnregisterNotification {
        registration: ObjectHandle,
    },
    /// Asks the service to drop the async call whose completion lives at `offset`.
    CancelAsyncCall {
        offset: u64,
    },
}

impl Request {
    pub const fn operation(&self) -> OperationId {
        match self {
            Request::Status => OperationId::Status,
            Request::Authorize { .. } => OperationId::Authorize,
            Request::OpenProcess { .. } => OperationId::OpenProcess,
            Request::CloseProcess { .. } => OperationId::CloseProcess,
            Request::KillProcess { .. } => OperationId::KillProcess,
            Request::GetProcessField { .. } => OperationId::GetProcessField,
            Request::SetProcessField { .. } => OperationId::SetProcessField,
            Request::ReadWriteVirtualMemory { .. } => OperationId::ReadWriteVirtualMemory,
            Request::ProtectVirtualMemory { .. } => OperationId::ProtectVirtualMemory,
            Request::AllocateMemory { .. } => OperationId::AllocateMemory,
            Request::MapMemory { .. } => OperationId::MapMemory,
            Request::FreeMemory { .. } => OperationId::FreeMemory,
            Request::GetProcessThreads { .. } => OperationId::GetProcessThreads,
            Request::OpenThread { .. } => OperationId::OpenThread,
            Request::CloseThread { .. } => OperationId::CloseThread,
            Request::GetThreadField { .. } => OperationId::GetThreadField,
            Request::SetThreadField { .. } => OperationId::SetThreadField,
            Request::OpenToken { .. } => OperationId::OpenToken,
            Request::GetTokenField { .. } => OperationId::GetTokenField,
            Request::CloseToken { .. } => OperationId::CloseToken,
            Request::SetTokenField { .. } => OperationId::SetTokenField,
            Request::RegisterNotification { .. } => OperationId::RegisterNotification,
            Request::UnregisterNotification { .. } => OperationId::UnregisterNotification,
            Request::CancelAsyncCall { .. } => OperationId::CancelAsyncCall,
        }
    }

    /// Writes the descriptor and argument slots into a zeroed envelope.
    pub fn encode(&self, envelope: &mut Envelope) {
        let mut slots = Slots::new(self.operation());

        match *self {
            Request::Status => {}
            Request::Authorize { permissions, guid } => {
                slots.arg1 = permissions.bits();
                slots.ext(0, guid_into_u128(guid));
            }
            Request::OpenProcess {
                process_id,
                open_type,
            } => {
                slots.arg1 = u64::from(process_id);
                slots.arg2 = open_type.into_bits();
            }
            Request::CloseProcess { process, open_type } => {
                slots.arg1 = process.as_raw();
                slots.arg2 = open_type.into_bits();
            }
            Request::KillProcess { process, exit_code } => {
                slots.arg1 = process.as_raw();
                slots.arg2 = u64::from(exit_code);
            }
            Request::GetProcessField {
                process,
                field,
                buffer,
            } => slots.get_field(process, field.into_bits(), buffer),
            Request::SetProcessField {
                process,
                field,
                value,
                buffer,
            } => slots.set_field(process, field.into_bits(), value, buffer),
            Request::ReadWriteVirtualMemory {
                process,
                address,
                count,
                buffer,
                operation,
            } => {
                slots.arg1 = process.as_raw();
                slots.arg2 = address;
                slots.arg3 = count;
                slots.ext(0, buffer.into_u128());
                slots.ext(1, u128::from(operation.into_bits()));
            }
            Request::ProtectVirtualMemory {
                process,
                address,
                protection,
            } => {
                slots.arg1 = process.as_raw();
                slots.arg2 = address;
                slots.arg3 = u64::from(protection);
            }
            Request::AllocateMemory { size, pool } => {
                slots.arg1 = size;
                slots.arg2 = pool.into_bits();
            }
            Request::MapMemory {
                memory,
                map_address,
                operation,
            } => {
                slots.arg1 = memory.as_raw();
                slots.arg2 = map_address;
                slots.arg3 = operation.into_bits();
            }
            Request::FreeMemory { memory } => slots.arg1 = memory.as_raw(),
            Request::GetProcessThreads { process, buffer } => {
                slots.arg1 = process.as_raw();
                slots.arg2 = buffer.address;
                slots.arg3 = buffer.len;
            }
            Request::OpenThread {
                thread_id,
                open_type,
            } => {
                slots.arg1 = u64::from(thread_id);
                slots.arg2 = open_type.into_bits();
            }
            Request::CloseThread { thread } => slots.arg1 = thread.as_raw(),
            Request::GetThreadField {
                thread,
                field,
                buffer,
            } => slots.get_field(thread, field.into_bits(), buffer),
            Request::SetThreadField {
                thread,
                field,
                value,
                buffer,
            } => slots.set_field(thread, field.into_bits(), value, buffer),
            Request::OpenToken { token, open_type } => {
                slots.arg1 = token.as_raw();
                slots.arg2 = open_type.into_bits();
            }
            Request::GetTokenField {
                token,
                field,
                buffer,
            } => slots.get_field(token, field.into_bits(), buffer),
            Request::CloseToken { token } => slots.arg1 = token.as_raw(),
            Request::SetTokenField {
                token,
                field,
                value,
                buffer,
            } => slots.set_field(token, field.into_bits(), value, buffer),
            Request::RegisterNotification { kind, event } => {
                slots.arg1 = kind.into_bits();
                slots.arg2 = 0;
                slots.arg3 = event;
            }
            Request::UnregisterNotification { registration } => {
                slots.arg1 = registration.as_raw();
            }
            Request::CancelAsyncCall { offset } => slots.arg1 = offset,
        }

        slots.write(envelope);
        trace!(
            "encoded {}: call={:#010x} args=[{:#x}, {:#x}, {:#x}]",
            self.operation(),
            envelope.call.into_bits(),
            envelope.arg1,
            envelope.arg2,
            envelope.arg3
        );
    }
}

/// GUID bytes in order: the first eight land in the low half.
pub fn guid_into_u128(guid: Uuid) -> u128 {
    u128::from_le_bytes(*guid.as_bytes())
}

pub fn guid_from_u128(raw: u128) -> Uuid {
    Uuid::from_bytes(raw.to_le_bytes())
}

struct Slots {
    operation: OperationId,
    arg1: u64,
    arg2: u64,
    arg3: u64,
    ext_args: [u128; 4],
}

impl Slots {
    fn new(operation: OperationId) -> Self {
        Self {
            operation,
            arg1: 0,
            arg2: 0,
            arg3: 0,
            ext_args: [0; 4],
        }
    }

    fn ext(&mut self, index: usize, value: u128) {
        debug_assert!(
            descriptor_for(self.operation).extended_args_present(),
            "{} has no extended arguments",
            self.operation
        );
        self.ext_args[index] = value;
    }

    fn get_field(&mut self, object: ObjectHandle, tag: u64, buffer: DataBuffer) {
        self.arg1 = object.as_raw();
        self.arg2 = tag;
        self.ext(0, buffer.into_u128());
    }

    fn set_field(&mut self, object: ObjectHandle, tag: u64, value: u64, buffer: DataBuffer) {
        self.arg1 = object.as_raw();
        self.arg2 = tag;
        self.arg3 = value;
        self.ext(0, buffer.into_u128());
    }

    fn write(self, envelope: &mut Envelope) {
        envelope.call = descriptor_for(self.operation);
        envelope.arg1 = self.arg1;
        envelope.arg2 = self.arg2;
        envelope.arg3 = self.arg3;
        envelope.ext_args = self.ext_args;
    }
}
