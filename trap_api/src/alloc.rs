//! Envelope allocation and the scoped ownership guard.

use envelope::Envelope;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Source of envelopes for individual calls.
///
/// `acquire` must hand out an envelope the caller owns exclusively; the
/// guard zeroes it before use. Every acquired envelope comes back through
/// `release` exactly once.
pub trait EnvelopeAllocator: Send + Sync {
    fn acquire(&self) -> Box<Envelope>;
    fn release(&self, envelope: Box<Envelope>);
}

/// Plain heap allocation.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapAllocator;

impl EnvelopeAllocator for HeapAllocator {
    fn acquire(&self) -> Box<Envelope> {
        Box::default()
    }

    fn release(&self, envelope: Box<Envelope>) {
        drop(envelope);
    }
}

const HELD: &str = "envelope is only taken in drop";

/// An envelope owned by one call, returned to its allocator on drop.
///
/// The box is `Some` for the guard's whole life; `Drop` takes it.
pub struct OwnedEnvelope<'a> {
    envelope: Option<Box<Envelope>>,
    allocator: &'a dyn EnvelopeAllocator,
}

impl<'a> OwnedEnvelope<'a> {
    /// Acquires a zeroed envelope.
    pub fn acquire(allocator: &'a dyn EnvelopeAllocator) -> Self {
        let mut envelope = allocator.acquire();
        envelope.clear();
        Self {
            envelope: Some(envelope),
            allocator,
        }
    }
}

impl Deref for OwnedEnvelope<'_> {
    type Target = Envelope;

    fn deref(&self) -> &Envelope {
        self.envelope.as_deref().expect(HELD)
    }
}

impl DerefMut for OwnedEnvelope<'_> {
    fn deref_mut(&mut self) -> &mut Envelope {
        self.envelope.as_deref_mut().expect(HELD)
    }
}

impl fmt::Debug for OwnedEnvelope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnedEnvelope").field(&**self).finish()
    }
}

impl Drop for OwnedEnvelope<'_> {
    fn drop(&mut self) {
        if let Some(envelope) = self.envelope.take() {
            self.allocator.release(envelope);
        }
    }
}
