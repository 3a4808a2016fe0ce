//! Field accessor tags and the values they select.
//!
//! `Get*Field` responses carry the echoed tag in one scalar slot and a 64-bit
//! union in another; the tag decides how the union is read. Each value type
//! here knows how to decode itself from `(tag, raw)` and encode back. A raw
//! value too wide for the field it is tagged as decodes as `Unknown` rather
//! than being cut down.

use crate::ObjectHandle;
use bitfield_struct::bitfield;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Process fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ProcessField {
    NtPath = 1,
    Protection = 2,
    Signers = 3,
    MitigationFlags = 4,
    Token = 5,
}

impl ProcessField {
    pub const fn into_bits(self) -> u64 {
        self as u64
    }

    pub const fn from_bits(bits: u64) -> Option<Self> {
        match bits {
            1 => Some(Self::NtPath),
            2 => Some(Self::Protection),
            3 => Some(Self::Signers),
            4 => Some(Self::MitigationFlags),
            5 => Some(Self::Token),
            _ => None,
        }
    }
}

/// Protection class in the low three bits of [`ProcessProtection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ProtectionType {
    #[default]
    None = 0,
    Light = 1,
    Protected = 2,
    Max = 3,
}

impl ProtectionType {
    /// Unassigned patterns read as `None`.
    pub const fn from_bits(bits: u8) -> Self {
        match bits {
            1 => Self::Light,
            2 => Self::Protected,
            3 => Self::Max,
            _ => Self::None,
        }
    }

    pub const fn into_bits(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ProtectionSigner {
    #[default]
    None = 0,
    Authenticode = 1,
    CodeGen = 2,
    AntiMalware = 3,
    Lsa = 4,
    Windows = 5,
    WinTcb = 6,
    Max = 7,
}

impl ProtectionSigner {
    /// Unassigned patterns read as `None`.
    pub const fn from_bits(bits: u8) -> Self {
        match bits {
            1 => Self::Authenticode,
            2 => Self::CodeGen,
            3 => Self::AntiMalware,
            4 => Self::Lsa,
            5 => Self::Windows,
            6 => Self::WinTcb,
            7 => Self::Max,
            _ => Self::None,
        }
    }

    pub const fn into_bits(self) -> u8 {
        self as u8
    }
}

/// Packed protection byte: type in bits 0-2, audit in bit 3, signer in bits 4-7.
///
/// The raw byte is kept, so a signer pattern outside [`ProtectionSigner`]
/// still encodes back unchanged.
#[bitfield(u8)]
#[derive(PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessProtection {
    #[bits(3)]
    pub protection_type: ProtectionType,
    pub audit: bool,
    #[bits(4)]
    pub signer: ProtectionSigner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ProcessSignatureLevel {
    #[default]
    Unchecked = 0,
    Unsigned = 1,
    Enterprise = 2,
    Custom = 3,
    Authenticode = 4,
    Custom2 = 5,
    Store = 6,
    AntiMalware = 7,
    Microsoft = 8,
    Custom4 = 9,
    Custom5 = 10,
    DynamicCodeGen = 11,
    Windows = 12,
    WindowsPpl = 13,
    WindowsTcb = 14,
    Custom6 = 15,
}

impl ProcessSignatureLevel {
    /// Unassigned patterns read as `Unchecked`.
    pub const fn from_bits(bits: u8) -> Self {
        match bits {
            1 => Self::Unsigned,
            2 => Self::Enterprise,
            3 => Self::Custom,
            4 => Self::Authenticode,
            5 => Self::Custom2,
            6 => Self::Store,
            7 => Self::AntiMalware,
            8 => Self::Microsoft,
            9 => Self::Custom4,
            10 => Self::Custom5,
            11 => Self::DynamicCodeGen,
            12 => Self::Windows,
            13 => Self::WindowsPpl,
            14 => Self::WindowsTcb,
            15 => Self::Custom6,
            _ => Self::Unchecked,
        }
    }

    pub const fn into_bits(self) -> u8 {
        self as u8
    }
}

/// Signature levels of the process image (low byte) and of its mapped
/// sections (high byte).
#[bitfield(u16)]
#[derive(PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessSigners {
    #[bits(8)]
    pub level: ProcessSignatureLevel,
    #[bits(8)]
    pub section_level: ProcessSignatureLevel,
}

/// The two mitigation flag words, low word first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MitigationFlags {
    pub first: u32,
    pub second: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessFieldValue {
    /// Length in bytes of the NT path; the path itself lands in the caller's buffer.
    NtPath { byte_length: u16 },
    Protection(ProcessProtection),
    Signers(ProcessSigners),
    MitigationFlags(MitigationFlags),
    Token(ObjectHandle),
    Unknown { tag: u64, raw: u64 },
}

impl ProcessFieldValue {
    pub fn decode(tag: u64, raw: u64) -> Self {
        match ProcessField::from_bits(tag) {
            Some(ProcessField::NtPath) => match u16::try_from(raw) {
                Ok(byte_length) => Self::NtPath { byte_length },
                Err(_) => Self::Unknown { tag, raw },
            },
            Some(ProcessField::Protection) => match u8::try_from(raw) {
                Ok(bits) => Self::Protection(ProcessProtection::from_bits(bits)),
                Err(_) => Self::Unknown { tag, raw },
            },
            Some(ProcessField::Signers) => match u16::try_from(raw) {
                Ok(bits) => Self::Signers(ProcessSigners::from_bits(bits)),
                Err(_) => Self::Unknown { tag, raw },
            },
            Some(ProcessField::MitigationFlags) => Self::MitigationFlags(MitigationFlags {
                first: raw as u32,
                second: (raw >> 32) as u32,
            }),
            Some(ProcessField::Token) => Self::Token(ObjectHandle::from_raw(raw)),
            None => Self::Unknown { tag, raw },
        }
    }

    /// Returns `(tag, raw)` as the service would place them in the slots.
    pub fn encode(self) -> (u64, u64) {
        match self {
            Self::NtPath { byte_length } => (ProcessField::NtPath.into_bits(), byte_length as u64),
            Self::Protection(p) => (ProcessField::Protection.into_bits(), p.into_bits() as u64),
            Self::Signers(s) => (ProcessField::Signers.into_bits(), s.into_bits() as u64),
            Self::MitigationFlags(m) => (
                ProcessField::MitigationFlags.into_bits(),
                m.first as u64 | ((m.second as u64) << 32),
            ),
            Self::Token(t) => (ProcessField::Token.into_bits(), t.as_raw()),
            Self::Unknown { tag, raw } => (tag, raw),
        }
    }

    pub fn field(&self) -> Option<ProcessField> {
        ProcessField::from_bits(self.encode().0)
    }
}

// ---------------------------------------------------------------------------
// Thread fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ThreadField {
    ActiveImpersonationInfo = 1,
    AdjustedClientToken = 2,
}

impl ThreadField {
    pub const fn into_bits(self) -> u64 {
        self as u64
    }

    pub const fn from_bits(bits: u64) -> Option<Self> {
        match bits {
            1 => Some(Self::ActiveImpersonationInfo),
            2 => Some(Self::AdjustedClientToken),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreadFieldValue {
    ActiveImpersonationInfo(bool),
    AdjustedClientToken(ObjectHandle),
    Unknown { tag: u64, raw: u64 },
}

impl ThreadFieldValue {
    pub fn decode(tag: u64, raw: u64) -> Self {
        match ThreadField::from_bits(tag) {
            Some(ThreadField::ActiveImpersonationInfo) => Self::ActiveImpersonationInfo(raw != 0),
            Some(ThreadField::AdjustedClientToken) => {
                Self::AdjustedClientToken(ObjectHandle::from_raw(raw))
            }
            None => Self::Unknown { tag, raw },
        }
    }

    pub fn encode(self) -> (u64, u64) {
        match self {
            Self::ActiveImpersonationInfo(active) => {
                (ThreadField::ActiveImpersonationInfo.into_bits(), active as u64)
            }
            Self::AdjustedClientToken(token) => {
                (ThreadField::AdjustedClientToken.into_bits(), token.as_raw())
            }
            Self::Unknown { tag, raw } => (tag, raw),
        }
    }

    pub fn field(&self) -> Option<ThreadField> {
        ThreadField::from_bits(self.encode().0)
    }
}

// ---------------------------------------------------------------------------
// Token fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TokenField {
    SourceName = 1,
    AccountName = 2,
    Type = 3,
    IntegrityLevelIndex = 4,
    MandatoryPolicy = 5,
    ImpersonationLevel = 6,
    PresentPrivileges = 7,
    EnabledPrivileges = 8,
    EnabledByDefaultPrivileges = 9,
}

impl TokenField {
    pub const fn into_bits(self) -> u64 {
        self as u64
    }

    pub const fn from_bits(bits: u64) -> Option<Self> {
        match bits {
            1 => Some(Self::SourceName),
            2 => Some(Self::AccountName),
            3 => Some(Self::Type),
            4 => Some(Self::IntegrityLevelIndex),
            5 => Some(Self::MandatoryPolicy),
            6 => Some(Self::ImpersonationLevel),
            7 => Some(Self::PresentPrivileges),
            8 => Some(Self::EnabledPrivileges),
            9 => Some(Self::EnabledByDefaultPrivileges),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    Primary,
    Impersonation,
}

impl TokenType {
    pub const fn into_bits(self) -> u64 {
        match self {
            TokenType::Primary => 0,
            TokenType::Impersonation => 1,
        }
    }

    pub const fn from_bits(bits: u64) -> Option<Self> {
        match bits {
            0 => Some(TokenType::Primary),
            1 => Some(TokenType::Impersonation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImpersonationLevel {
    Anonymous,
    Identification,
    Impersonation,
    Delegation,
}

impl ImpersonationLevel {
    pub const fn into_bits(self) -> u64 {
        match self {
            ImpersonationLevel::Anonymous => 0,
            ImpersonationLevel::Identification => 1,
            ImpersonationLevel::Impersonation => 2,
            ImpersonationLevel::Delegation => 3,
        }
    }

    pub const fn from_bits(bits: u64) -> Option<Self> {
        match bits {
            0 => Some(ImpersonationLevel::Anonymous),
            1 => Some(ImpersonationLevel::Identification),
            2 => Some(ImpersonationLevel::Impersonation),
            3 => Some(ImpersonationLevel::Delegation),
            _ => None,
        }
    }
}

bitflags! {
    /// Token privilege mask. Bits 0-1 and 37-63 are reserved.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TokenPrivileges: u64 {
        const CREATE_TOKEN = 1 << 2;
        const ASSIGN_PRIMARY_TOKEN = 1 << 3;
        const LOCK_MEMORY = 1 << 4;
        const INCREASE_QUOTA = 1 << 5;
        const MACHINE_ACCOUNT = 1 << 6;
        const TCB = 1 << 7;
        const SECURITY = 1 << 8;
        const TAKE_OWNERSHIP = 1 << 9;
        const LOAD_DRIVER = 1 << 10;
        const SYSTEM_PROFILE = 1 << 11;
        const SYSTEMTIME = 1 << 12;
        const PROFILE_SINGLE_PROCESS = 1 << 13;
        const INCREASE_BASE_PRIORITY = 1 << 14;
        const CREATE_PAGEFILE = 1 << 15;
        const CREATE_PERMANENT = 1 << 16;
        const BACKUP = 1 << 17;
        const RESTORE = 1 << 18;
        const SHUTDOWN = 1 << 19;
        const DEBUG = 1 << 20;
        const AUDIT = 1 << 21;
        const SYSTEM_ENVIRONMENT = 1 << 22;
        const CHANGE_NOTIFY = 1 << 23;
        const REMOTE_SHUTDOWN = 1 << 24;
        const UNDOCK = 1 << 25;
        const SYNC_AGENT = 1 << 26;
        const ENABLE_DELEGATION = 1 << 27;
        const MANAGE_VOLUME = 1 << 28;
        const IMPERSONATE = 1 << 29;
        const CREATE_GLOBAL = 1 << 30;
        const TRUSTED_CRED_MAN_ACCESS = 1 << 31;
        const RELABEL = 1 << 32;
        const INCREASE_WORKING_SET = 1 << 33;
        const TIME_ZONE = 1 << 34;
        const CREATE_SYMBOLIC_LINK = 1 << 35;
        const DELEGATE_SESSION_USER_IMPERSONATE = 1 << 36;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenFieldValue {
    SourceName([u8; 8]),
    AccountName { byte_length: u16 },
    Type(TokenType),
    IntegrityLevelIndex(u32),
    MandatoryPolicy(u32),
    ImpersonationLevel(ImpersonationLevel),
    PresentPrivileges(TokenPrivileges),
    EnabledPrivileges(TokenPrivileges),
    EnabledByDefaultPrivileges(TokenPrivileges),
    Unknown { tag: u64, raw: u64 },
}

impl TokenFieldValue {
    pub fn decode(tag: u64, raw: u64) -> Self {
        let field = match TokenField::from_bits(tag) {
            Some(field) => field,
            None => return Self::Unknown { tag, raw },
        };
        match field {
            TokenField::SourceName => Self::SourceName(raw.to_le_bytes()),
            TokenField::AccountName => match u16::try_from(raw) {
                Ok(byte_length) => Self::AccountName { byte_length },
                Err(_) => Self::Unknown { tag, raw },
            },
            TokenField::Type => match TokenType::from_bits(raw) {
                Some(kind) => Self::Type(kind),
                None => Self::Unknown { tag, raw },
            },
            TokenField::IntegrityLevelIndex => match u32::try_from(raw) {
                Ok(index) => Self::IntegrityLevelIndex(index),
                Err(_) => Self::Unknown { tag, raw },
            },
            TokenField::MandatoryPolicy => match u32::try_from(raw) {
                Ok(policy) => Self::MandatoryPolicy(policy),
                Err(_) => Self::Unknown { tag, raw },
            },
            TokenField::ImpersonationLevel => match ImpersonationLevel::from_bits(raw) {
                Some(level) => Self::ImpersonationLevel(level),
                None => Self::Unknown { tag, raw },
            },
            TokenField::PresentPrivileges => {
                Self::PresentPrivileges(TokenPrivileges::from_bits_retain(raw))
            }
            TokenField::EnabledPrivileges => {
                Self::EnabledPrivileges(TokenPrivileges::from_bits_retain(raw))
            }
            TokenField::EnabledByDefaultPrivileges => {
                Self::EnabledByDefaultPrivileges(TokenPrivileges::from_bits_retain(raw))
            }
        }
    }

    pub fn encode(self) -> (u64, u64) {
        match self {
            Self::SourceName(name) => (TokenField::SourceName.into_bits(), u64::from_le_bytes(name)),
            Self::AccountName { byte_length } => {
                (TokenField::AccountName.into_bits(), byte_length as u64)
            }
            Self::Type(kind) => (TokenField::Type.into_bits(), kind.into_bits()),
            Self::IntegrityLevelIndex(index) => {
                (TokenField::IntegrityLevelIndex.into_bits(), index as u64)
            }
            Self::MandatoryPolicy(policy) => (TokenField::MandatoryPolicy.into_bits(), policy as u64),
            Self::ImpersonationLevel(level) => {
                (TokenField::ImpersonationLevel.into_bits(), level.into_bits())
            }
            Self::PresentPrivileges(p) => (TokenField::PresentPrivileges.into_bits(), p.bits()),
            Self::EnabledPrivileges(p) => (TokenField::EnabledPrivileges.into_bits(), p.bits()),
            Self::EnabledByDefaultPrivileges(p) => {
                (TokenField::EnabledByDefaultPrivileges.into_bits(), p.bits())
            }
            Self::Unknown { tag, raw } => (tag, raw),
        }
    }

    pub fn field(&self) -> Option<TokenField> {
        TokenField::from_bits(self.encode().0)
    }
}
