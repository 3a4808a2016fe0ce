//! Operation identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one service operation.
///
/// The discriminants are the 16-bit wire values carried in both the call
/// descriptor and the echoed result record. Gaps in the numbering belong to
/// operations outside this protocol and decode as unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u16)]
pub enum OperationId {
    Authorize = 1,
    Status = 2,
    OpenProcess = 3,
    CloseProcess = 4,
    KillProcess = 5,
    GetProcessField = 8,
    SetProcessField = 9,
    ReadWriteVirtualMemory = 10,
    ProtectVirtualMemory = 11,
    AllocateMemory = 12,
    MapMemory = 13,
    FreeMemory = 14,
    GetProcessThreads = 15,
    OpenThread = 16,
    CloseThread = 17,
    GetThreadField = 21,
    SetThreadField = 22,
    OpenToken = 23,
    GetTokenField = 24,
    CloseToken = 25,
    SetTokenField = 26,
    RegisterNotification = 27,
    UnregisterNotification = 28,
    CancelAsyncCall = 29,
}

impl OperationId {
    /// Every operation, in wire-value order.
    pub const ALL: [OperationId; 24] = [
        OperationId::Authorize,
        OperationId::Status,
        OperationId::OpenProcess,
        OperationId::CloseProcess,
        OperationId::KillProcess,
        OperationId::GetProcessField,
        OperationId::SetProcessField,
        OperationId::ReadWriteVirtualMemory,
        OperationId::ProtectVirtualMemory,
        OperationId::AllocateMemory,
        OperationId::MapMemory,
        OperationId::FreeMemory,
        OperationId::GetProcessThreads,
        OperationId::OpenThread,
        OperationId::CloseThread,
        OperationId::GetThreadField,
        OperationId::SetThreadField,
        OperationId::OpenToken,
        OperationId::GetTokenField,
        OperationId::CloseToken,
        OperationId::SetTokenField,
        OperationId::RegisterNotification,
        OperationId::UnregisterNotification,
        OperationId::CancelAsyncCall,
    ];

    pub const fn into_bits(self) -> u16 {
        self as u16
    }

    /// Decodes a wire value. Returns `None` for ids outside the protocol.
    pub const fn from_bits(bits: u16) -> Option<Self> {
        Some(match bits {
            1 => Self::Authorize,
            2 => Self::Status,
            3 => Self::OpenProcess,
            4 => Self::CloseProcess,
            5 => Self::KillProcess,
            8 => Self::GetProcessField,
            9 => Self::SetProcessField,
            10 => Self::ReadWriteVirtualMemory,
            11 => Self::ProtectVirtualMemory,
            12 => Self::AllocateMemory,
            13 => Self::MapMemory,
            14 => Self::FreeMemory,
            15 => Self::GetProcessThreads,
            16 => Self::OpenThread,
            17 => Self::CloseThread,
            21 => Self::GetThreadField,
            22 => Self::SetThreadField,
            23 => Self::OpenToken,
            24 => Self::GetTokenField,
            25 => Self::CloseToken,
            26 => Self::SetTokenField,
            27 => Self::RegisterNotification,
            28 => Self::UnregisterNotification,
            29 => Self::CancelAsyncCall,
            _ => return None,
        })
    }

    /// Short human-readable name, used in log lines.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Authorize => "authorize",
            Self::Status => "status",
            Self::OpenProcess => "open_process",
            Self::CloseProcess => "close_process",
            Self::KillProcess => "kill_process",
            Self::GetProcessField => "get_process_field",
            Self::SetProcessField => "set_process_field",
            Self::ReadWriteVirtualMemory => "rw_virtual_memory",
            Self::ProtectVirtualMemory => "protect_virtual_memory",
            Self::AllocateMemory => "allocate_memory",
            Self::MapMemory => "map_memory",
            Self::FreeMemory => "free_memory",
            Self::GetProcessThreads => "get_process_threads",
            Self::OpenThread => "open_thread",
            Self::CloseThread => "close_thread",
            Self::GetThreadField => "get_thread_field",
            Self::SetThreadField => "set_thread_field",
            Self::OpenToken => "open_token",
            Self::GetTokenField => "get_token_field",
            Self::CloseToken => "close_token",
            Self::SetTokenField => "set_token_field",
            Self::RegisterNotification => "register_notification",
            Self::UnregisterNotification => "unregister_notification",
            Self::CancelAsyncCall => "cancel_async_call",
        }
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.into_bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_operations_round_trip_bits() {
        for op in OperationId::ALL {
            assert_eq!(OperationId::from_bits(op.into_bits()), Some(op));
        }
    }

    #[test]
    fn test_gaps_are_unknown() {
        for bits in [0u16, 6, 7, 18, 19, 20, 30, u16::MAX] {
            assert_eq!(OperationId::from_bits(bits), None, "bits {}", bits);
        }
    }

    #[test]
    fn test_all_is_sorted_and_unique() {
        let bits: Vec<u16> = OperationId::ALL.iter().map(|op| op.into_bits()).collect();
        let mut sorted = bits.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(bits, sorted);
    }

    #[test]
    fn test_display_includes_wire_value() {
        assert_eq!(OperationId::OpenProcess.to_string(), "open_process(3)");
    }
}
