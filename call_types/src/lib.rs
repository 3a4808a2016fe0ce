//! # Call Types
//!
//! This crate defines the vocabulary shared by every layer of the trap-call
//! protocol: operation identifiers, error sources and codes, object handles,
//! and the typed field tags/values carried by the field accessor operations.
//!
//! ## Philosophy
//!
//! - **Wire values are explicit**: every enum that crosses the boundary has a
//!   documented `into_bits`/`from_bits` pair; nothing depends on `repr` layout.
//! - **Unknown is a value, not a panic**: data written by the service is
//!   decoded into `Unknown`-style variants when it carries an unexpected tag.
//! - **Handles are opaque**: object addresses returned by the service are
//!   never dereferenced on the client side.
//!
//! ## Key Types
//!
//! - [`OperationId`]: Identifies one of the service operations
//! - [`ErrorSource`] / [`ErrorCode`]: The two halves of a protocol result
//! - [`ObjectHandle`]: Opaque object address handed out by the service
//! - [`ProcessField`], [`ThreadField`], [`TokenField`]: Field accessor tags

pub mod fields;
pub mod objects;
pub mod operation;
pub mod permissions;
pub mod status;

pub use fields::{
    ImpersonationLevel, MitigationFlags, ProcessField, ProcessFieldValue, ProcessProtection,
    ProcessSignatureLevel, ProcessSigners, ProtectionSigner, ProtectionType, ThreadField,
    ThreadFieldValue, TokenField, TokenFieldValue, TokenPrivileges, TokenType,
};
pub use objects::{
    DataBuffer, MapOperation, MemoryPool, NotifyObjectKind, ObjectEvent, ObjectHandle, OpenType,
    VmOperation,
};
pub use operation::OperationId;
pub use permissions::{Permissions, ServiceState};
pub use status::{ErrorCode, ErrorSource};
