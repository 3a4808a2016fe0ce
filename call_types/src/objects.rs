//! Object handles and the small request enums that travel in scalar slots.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque object address handed out by the service.
///
/// The client never dereferences it; it is only passed back in later calls
/// (close, field accessors, memory operations).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ObjectHandle(u64);

impl ObjectHandle {
    pub const NULL: ObjectHandle = ObjectHandle(0);

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_raw(self) -> u64 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({:#x})", self.0)
    }
}

/// How an object should be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum OpenType {
    /// Return an OS handle usable by the calling process.
    #[default]
    Handle = 0,
    /// Return a service-side object reference.
    Hypervisor = 1,
}

impl OpenType {
    pub const fn into_bits(self) -> u64 {
        self as u64
    }

    pub const fn from_bits(bits: u64) -> Option<Self> {
        match bits {
            0 => Some(Self::Handle),
            1 => Some(Self::Hypervisor),
            _ => None,
        }
    }
}

/// Pool an allocation is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum MemoryPool {
    #[default]
    NonPaged = 0,
}

impl MemoryPool {
    pub const fn into_bits(self) -> u64 {
        self as u64
    }

    pub const fn from_bits(bits: u64) -> Option<Self> {
        match bits {
            0 => Some(Self::NonPaged),
            _ => None,
        }
    }
}

/// Direction of a map-memory call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum MapOperation {
    #[default]
    Map = 0,
    Unmap = 1,
}

impl MapOperation {
    pub const fn into_bits(self) -> u64 {
        self as u64
    }

    pub const fn from_bits(bits: u64) -> Option<Self> {
        match bits {
            0 => Some(Self::Map),
            1 => Some(Self::Unmap),
            _ => None,
        }
    }
}

/// Direction of a virtual-memory transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum VmOperation {
    #[default]
    Read = 0,
    Write = 1,
}

impl VmOperation {
    pub const fn into_bits(self) -> u64 {
        self as u64
    }

    pub const fn from_bits(bits: u64) -> Option<Self> {
        match bits {
            0 => Some(Self::Read),
            1 => Some(Self::Write),
            _ => None,
        }
    }
}

/// Kind of object a notification registration watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NotifyObjectKind {
    Handle = 0,
    Process = 1,
    Thread = 2,
    Token = 3,
    Memory = 4,
}

impl NotifyObjectKind {
    pub const fn into_bits(self) -> u64 {
        self as u64
    }

    pub const fn from_bits(bits: u64) -> Option<Self> {
        match bits {
            0 => Some(Self::Handle),
            1 => Some(Self::Process),
            2 => Some(Self::Thread),
            3 => Some(Self::Token),
            4 => Some(Self::Memory),
            _ => None,
        }
    }
}

/// What happened to a watched object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ObjectEvent {
    Created = 0,
    Modified = 1,
    Deleted = 2,
}

impl ObjectEvent {
    pub const fn into_bits(self) -> u64 {
        self as u64
    }

    pub const fn from_bits(bits: u64) -> Option<Self> {
        match bits {
            0 => Some(Self::Created),
            1 => Some(Self::Modified),
            2 => Some(Self::Deleted),
            _ => None,
        }
    }
}

/// A caller-owned buffer the service reads from or writes into.
///
/// Only the address and length travel; the client keeps the memory alive
/// for the duration of the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DataBuffer {
    pub address: u64,
    pub len: u64,
}

impl DataBuffer {
    pub const EMPTY: DataBuffer = DataBuffer { address: 0, len: 0 };

    pub const fn new(address: u64, len: u64) -> Self {
        Self { address, len }
    }

    /// Describes a byte slice owned by the caller.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            address: bytes.as_ptr() as u64,
            len: bytes.len() as u64,
        }
    }

    /// Packs into one extended slot: address in the low half, length in the high half.
    pub const fn into_u128(self) -> u128 {
        (self.address as u128) | ((self.len as u128) << 64)
    }

    pub const fn from_u128(raw: u128) -> Self {
        Self {
            address: raw as u64,
            len: (raw >> 64) as u64,
        }
    }
}
