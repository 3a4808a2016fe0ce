//! Fixed call descriptor for each operation.

use call_types::OperationId;
use envelope::CallDescriptor;

/// Returns the descriptor every call of `operation` starts from.
///
/// `is_async` is never set here; the async submission path adds it per call.
pub const fn descriptor_for(operation: OperationId) -> CallDescriptor {
    let call = CallDescriptor::for_operation(operation);
    match operation {
        OperationId::Status | OperationId::CancelAsyncCall => call.with_is_fast(true),

        OperationId::Authorize
        | OperationId::GetProcessField
        | OperationId::SetProcessField
        | OperationId::GetThreadField
        | OperationId::SetThreadField
        | OperationId::GetTokenField
        | OperationId::SetTokenField
        | OperationId::ReadWriteVirtualMemory => call.with_extended_args_present(true),

        OperationId::OpenProcess
        | OperationId::CloseProcess
        | OperationId::KillProcess
        | OperationId::ProtectVirtualMemory
        | OperationId::AllocateMemory
        | OperationId::MapMemory
        | OperationId::FreeMemory
        | OperationId::GetProcessThreads
        | OperationId::OpenThread
        | OperationId::CloseThread
        | OperationId::OpenToken
        | OperationId::CloseToken
        | OperationId::RegisterNotification
        | OperationId::UnregisterNotification => call,
    }
}
