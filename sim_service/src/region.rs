//! In-memory stand-in for the shared completion region.

use std::sync::Mutex;
use trap_api::{AsyncHandle, RegionError, SharedRegion};

/// A byte window that pretends to live at `base`.
#[derive(Debug)]
pub struct InMemoryRegion {
    base: u64,
    bytes: Mutex<Vec<u8>>,
}

impl InMemoryRegion {
    pub fn new(base: u64, len: usize) -> Self {
        Self {
            base,
            bytes: Mutex::new(vec![0; len]),
        }
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn write(&self, address: u64, data: &[u8]) -> Result<(), RegionError> {
        let mut bytes = self.lock();
        let range = self.range(address, data.len(), bytes.len())?;
        bytes[range].copy_from_slice(data);
        Ok(())
    }

    /// Writes the length prefix and payload where `handle` expects them.
    pub fn write_completion(&self, handle: &AsyncHandle, payload: &[u8]) -> Result<(), RegionError> {
        let mut framed = Vec::with_capacity(4 + payload.len());
        framed.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        framed.extend_from_slice(payload);
        self.write(handle.address(), &framed)
    }

    fn range(
        &self,
        address: u64,
        len: usize,
        window: usize,
    ) -> Result<std::ops::Range<usize>, RegionError> {
        let out_of_bounds = RegionError::OutOfBounds { address, len };
        let start = address
            .checked_sub(self.base)
            .and_then(|start| usize::try_from(start).ok())
            .ok_or_else(|| out_of_bounds.clone())?;
        let end = start.checked_add(len).ok_or_else(|| out_of_bounds.clone())?;
        if end > window {
            return Err(out_of_bounds);
        }
        Ok(start..end)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<u8>> {
        self.bytes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SharedRegion for InMemoryRegion {
    fn read(&self, address: u64, buf: &mut [u8]) -> Result<(), RegionError> {
        let bytes = self.lock();
        let range = self.range(address, buf.len(), bytes.len())?;
        buf.copy_from_slice(&bytes[range]);
        Ok(())
    }
}
