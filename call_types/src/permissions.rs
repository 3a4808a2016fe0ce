//! Credentials carried by `Authorize` and the state reported by `Status`.
//!
//! The protocol only carries these values. Deciding whether a caller deserves
//! a permission is the service's business.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Permission bits requested by, and granted to, a caller.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Permissions: u64 {
        const PROCESS_EXECUTIVE = 1 << 0;
        const PROCESS_MEMORY    = 1 << 1;
        const PROCESS_CONTROL   = 1 << 2;
        const PROCESS_SECURITY  = 1 << 3;

        const THREAD_EXECUTIVE  = 1 << 4;
        const THREAD_CONTROL    = 1 << 5;
        const THREAD_SECURITY   = 1 << 6;

        const MEMORY_VIRTUAL    = 1 << 8;
        const MEMORY_PHYSICAL   = 1 << 9;
        const MEMORY_ALLOCATION = 1 << 10;
        const MEMORY_PROTECT    = 1 << 11;
        const MEMORY_ISOLATE    = 1 << 12;

        const CPU_MSR_READ      = 1 << 18;
        const CPU_MSR_WRITE     = 1 << 19;
        const CPU_SEGMENTATION  = 1 << 20;
        const CPU_CONTROL       = 1 << 21;

        const SECURITY_CREATE   = 1 << 27;
        const SECURITY_MANAGE   = 1 << 28;
        const SECURITY_DELETE   = 1 << 29;
    }
}

/// Service state reported by the `Status` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ServiceState {
    #[default]
    Unknown,
    Virtualized,
    Devirtualized,
}

impl ServiceState {
    pub const fn into_bits(self) -> u64 {
        match self {
            ServiceState::Unknown => 0,
            ServiceState::Virtualized => 1,
            ServiceState::Devirtualized => 2,
        }
    }

    pub const fn from_bits(bits: u64) -> Self {
        match bits {
            1 => ServiceState::Virtualized,
            2 => ServiceState::Devirtualized,
            _ => ServiceState::Unknown,
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceState::Unknown => write!(f, "Unknown"),
            ServiceState::Virtualized => write!(f, "Virtualized"),
            ServiceState::Devirtualized => write!(f, "Devirtualized"),
        }
    }
}
