//! Result status vocabulary: where an error came from and what it was.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Layer that produced a result code. Two bits on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ErrorSource {
    /// Forwarded from the underlying operating system.
    Nt = 0,
    /// Produced by the hypervisor layer underneath the service.
    Hv = 1,
    /// Produced by the protocol layer itself.
    Hx = 2,
}

impl ErrorSource {
    pub const ALL: [ErrorSource; 3] = [ErrorSource::Nt, ErrorSource::Hv, ErrorSource::Hx];

    pub const fn into_bits(self) -> u8 {
        self as u8
    }

    /// Decodes the two wire bits. The fourth bit pattern (`3`) is not assigned.
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Nt),
            1 => Some(Self::Hv),
            2 => Some(Self::Hx),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSource::Nt => write!(f, "nt"),
            ErrorSource::Hv => write!(f, "hv"),
            ErrorSource::Hx => write!(f, "hx"),
        }
    }
}

/// Result code. Three bits on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ErrorCode {
    Unknown = 0,
    Ok = 1,
    NotAllowed = 2,
    NotLoaded = 3,
    NotFound = 4,
    InvalidParams = 5,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 6] = [
        ErrorCode::Unknown,
        ErrorCode::Ok,
        ErrorCode::NotAllowed,
        ErrorCode::NotLoaded,
        ErrorCode::NotFound,
        ErrorCode::InvalidParams,
    ];

    pub const fn into_bits(self) -> u8 {
        self as u8
    }

    /// Decodes the three wire bits; unassigned patterns read as `Unknown`.
    pub const fn from_bits(bits: u8) -> Self {
        match bits {
            1 => Self::Ok,
            2 => Self::NotAllowed,
            3 => Self::NotLoaded,
            4 => Self::NotFound,
            5 => Self::InvalidParams,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorCode::Unknown => "unknown",
            ErrorCode::Ok => "ok",
            ErrorCode::NotAllowed => "not allowed",
            ErrorCode::NotLoaded => "not loaded",
            ErrorCode::NotFound => "not found",
            ErrorCode::InvalidParams => "invalid parameters",
        };
        f.write_str(text)
    }
}
