//! Operation identifier and catalog contract tests
//!
//! Wire ids and descriptor flags are shared with the service and must not
//! change once published.

use call_types::OperationId;

// ===== Canonical Operation Table =====

/// `(operation, wire id, fast, extended arguments)`
pub const OPERATION_TABLE: [(OperationId, u16, bool, bool); 24] = [
    (OperationId::Authorize, 1, false, true),
    (OperationId::Status, 2, true, false),
    (OperationId::OpenProcess, 3, false, false),
    (OperationId::CloseProcess, 4, false, false),
    (OperationId::KillProcess, 5, false, false),
    (OperationId::GetProcessField, 8, false, true),
    (OperationId::SetProcessField, 9, false, true),
    (OperationId::ReadWriteVirtualMemory, 10, false, true),
    (OperationId::ProtectVirtualMemory, 11, false, false),
    (OperationId::AllocateMemory, 12, false, false),
    (OperationId::MapMemory, 13, false, false),
    (OperationId::FreeMemory, 14, false, false),
    (OperationId::GetProcessThreads, 15, false, false),
    (OperationId::OpenThread, 16, false, false),
    (OperationId::CloseThread, 17, false, false),
    (OperationId::GetThreadField, 21, false, true),
    (OperationId::SetThreadField, 22, false, true),
    (OperationId::OpenToken, 23, false, false),
    (OperationId::GetTokenField, 24, false, true),
    (OperationId::CloseToken, 25, false, false),
    (OperationId::SetTokenField, 26, false, true),
    (OperationId::RegisterNotification, 27, false, false),
    (OperationId::UnregisterNotification, 28, false, false),
    (OperationId::CancelAsyncCall, 29, true, false),
];

/// Ids inside the published range that belong to no operation.
pub const UNASSIGNED_IDS: [u16; 5] = [6, 7, 18, 19, 20];

// ===== Contract Tests =====
