//! Envelope allocator that counts acquisitions and releases.

use envelope::Envelope;
use std::sync::atomic::{AtomicUsize, Ordering};
use trap_api::EnvelopeAllocator;

#[derive(Debug, Default)]
pub struct CountingAllocator {
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl CountingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Envelopes handed out and not yet returned.
    pub fn outstanding(&self) -> usize {
        self.acquired().saturating_sub(self.released())
    }
}

impl EnvelopeAllocator for CountingAllocator {
    fn acquire(&self) -> Box<Envelope> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Box::default()
    }

    fn release(&self, envelope: Box<Envelope>) {
        self.released.fetch_add(1, Ordering::SeqCst);
        drop(envelope);
    }
}
