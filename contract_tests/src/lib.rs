//! # Wire Contract Tests
//!
//! This crate provides "golden" tests for the trap-call wire contract to
//! ensure it doesn't drift accidentally over time.
//!
//! ## Philosophy
//!
//! - **Explicit over implicit**: offsets, ids and slot assignments are
//!   written out as literal tables
//! - **Bytes, not structs**: every check reads the encoded bytes, so a
//!   refactor of the Rust types cannot silently move a field
//!
//! ## Structure
//!
//! - `layout`: envelope and completion record byte offsets
//! - `operations`: operation wire ids and catalog flags
//! - `slots`: which request field lands in which slot, per operation

pub mod layout;
pub mod operations;
pub mod slots;

/// Common test helpers for contract validation
pub mod test_helpers {
    use envelope::{Envelope, ENVELOPE_SIZE};
    use trap_api::Request;

    /// Encodes a request and returns the packed bytes.
    pub fn encode_bytes(request: Request) -> [u8; ENVELOPE_SIZE] {
        let mut envelope = Envelope::default();
        request.encode(&mut envelope);
        envelope.to_bytes()
    }

    pub fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        let mut word = [0u8; 4];
        word.copy_from_slice(&bytes[offset..offset + 4]);
        u32::from_le_bytes(word)
    }

    pub fn u64_at(bytes: &[u8], offset: usize) -> u64 {
        let mut word = [0u8; 8];
        word.copy_from_slice(&bytes[offset..offset + 8]);
        u64::from_le_bytes(word)
    }

    pub fn u128_at(bytes: &[u8], offset: usize) -> u128 {
        let mut word = [0u8; 16];
        word.copy_from_slice(&bytes[offset..offset + 16]);
        u128::from_le_bytes(word)
    }

    /// Verifies the three scalar slots of an encoded envelope
    pub fn verify_scalar_slots(bytes: &[u8], expected: [u64; 3]) {
        let actual = [u64_at(bytes, 12), u64_at(bytes, 20), u64_at(bytes, 28)];
        assert_eq!(
            actual, expected,
            "Scalar slots changed: expected {:#x?}, got {:#x?}",
            expected, actual
        );
    }

    /// Verifies the four extended slots of an encoded envelope
    pub fn verify_extended_slots(bytes: &[u8], expected: [u128; 4]) {
        let actual = [
            u128_at(bytes, 36),
            u128_at(bytes, 52),
            u128_at(bytes, 68),
            u128_at(bytes, 84),
        ];
        assert_eq!(
            actual, expected,
            "Extended slots changed: expected {:#x?}, got {:#x?}",
            expected, actual
        );
    }
}
