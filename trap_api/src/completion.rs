//! Async completion: handles, signals, the shared region, and the reader.
//!
//! For an async call the service acknowledges the submission, later writes a
//! length-prefixed completion payload at `base + offset` in the shared region,
//! and then sets the handle's signal. Callers give each in-flight call its own
//! offset; nothing here checks that offsets are disjoint.

use crate::response::{decode_completion, Response};
use call_types::OperationId;
use envelope::{CompletionRecord, LayoutError, COMPLETION_PREFIX_SIZE};
use log::{debug, warn};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Event the service sets once a completion is in place.
pub trait CompletionSignal: Send + Sync {
    /// Blocks until signaled. There is no timeout.
    fn wait(&self);
    fn is_signaled(&self) -> bool;
    fn signal(&self);
    /// Clears the signal so it can be waited on again.
    fn reset(&self);
}

/// Read access to the region the service writes completions into.
pub trait SharedRegion: Send + Sync {
    fn read(&self, address: u64, buf: &mut [u8]) -> Result<(), RegionError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    #[error("No shared region is attached")]
    Unmapped,

    #[error("Read of {len} bytes at {address:#x} falls outside the shared region")]
    OutOfBounds { address: u64, len: usize },
}

/// Errors from waiting on or reading an async completion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("Service returned an error: {0}")]
    Service(#[from] crate::error::Error),

    #[error("Shared region access failed: {0}")]
    Region(#[from] RegionError),

    #[error("Completion payload of {len} bytes exceeds the {max} byte limit")]
    Oversized { len: u32, max: u32 },

    #[error("Completion payload of {len} bytes is shorter than the {expected} byte record")]
    Truncated { len: usize, expected: usize },

    #[error("Call was cancelled")]
    Cancelled,

    #[error("Notification names unknown object kind {kind} or event {event}")]
    UnknownNotification { kind: u64, event: u64 },
}

/// Everything the service needs to complete one async call.
#[derive(Clone)]
pub struct AsyncHandle {
    signal: Arc<dyn CompletionSignal>,
    base: u64,
    offset: u64,
}

impl AsyncHandle {
    pub fn new(signal: Arc<dyn CompletionSignal>, base: u64, offset: u64) -> Self {
        Self {
            signal,
            base,
            offset,
        }
    }

    pub fn signal(&self) -> &dyn CompletionSignal {
        self.signal.as_ref()
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Absolute address of the length prefix.
    pub fn address(&self) -> u64 {
        self.base.wrapping_add(self.offset)
    }
}

impl fmt::Debug for AsyncHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncHandle")
            .field("base", &format_args!("{:#x}", self.base))
            .field("offset", &format_args!("{:#x}", self.offset))
            .field("signaled", &self.signal.is_signaled())
            .finish()
    }
}

/// Reads completions out of a shared region.
pub struct CompletionReader<'r> {
    region: &'r dyn SharedRegion,
    max_len: u32,
}

impl<'r> CompletionReader<'r> {
    pub fn new(region: &'r dyn SharedRegion, max_len: u32) -> Self {
        Self { region, max_len }
    }

    /// Returns the raw payload bytes that follow the length prefix.
    pub fn read_payload(&self, handle: &AsyncHandle) -> Result<Vec<u8>, CompletionError> {
        let address = handle.address();

        let mut prefix = [0u8; COMPLETION_PREFIX_SIZE];
        self.region.read(address, &mut prefix)?;
        let len = u32::from_le_bytes(prefix);
        if len > self.max_len {
            warn!(
                "completion at {:#x} claims {} bytes, limit is {}",
                address, len, self.max_len
            );
            return Err(CompletionError::Oversized {
                len,
                max: self.max_len,
            });
        }

        let mut payload = vec![0u8; len as usize];
        self.region
            .read(address.wrapping_add(COMPLETION_PREFIX_SIZE as u64), &mut payload)?;
        debug!("read {} byte completion at {:#x}", len, address);
        Ok(payload)
    }

    pub fn read_record(&self, handle: &AsyncHandle) -> Result<CompletionRecord, CompletionError> {
        let payload = self.read_payload(handle)?;
        CompletionRecord::from_bytes(&payload).map_err(|err| {
            warn!("malformed completion at {:#x}: {}", handle.address(), err);
            match err {
                LayoutError::Truncated { expected, actual }
                | LayoutError::WrongSize { expected, actual } => CompletionError::Truncated {
                    len: actual,
                    expected,
                },
            }
        })
    }

    /// Reads and decodes the completion for `operation`.
    pub fn read_response(
        &self,
        handle: &AsyncHandle,
        operation: OperationId,
    ) -> Result<Response, CompletionError> {
        let record = self.read_record(handle)?;
        Ok(decode_completion(&record, operation)?)
    }
}

/// Reads straight from the calling process's address space.
#[derive(Debug)]
pub struct MappedRegion {
    base: u64,
    len: u64,
}

impl MappedRegion {
    /// # Safety
    ///
    /// `base..base + len` must stay mapped and readable for as long as this
    /// value exists, and the service must finish writing a completion before
    /// it sets the matching signal.
    pub unsafe fn new(base: u64, len: u64) -> Self {
        Self { base, len }
    }

    fn contains(&self, address: u64, len: usize) -> bool {
        let end = match address.checked_add(len as u64) {
            Some(end) => end,
            None => return false,
        };
        match self.base.checked_add(self.len) {
            Some(limit) => address >= self.base && end <= limit,
            None => false,
        }
    }
}

impl SharedRegion for MappedRegion {
    fn read(&self, address: u64, buf: &mut [u8]) -> Result<(), RegionError> {
        if !self.contains(address, buf.len()) {
            return Err(RegionError::OutOfBounds {
                address,
                len: buf.len(),
            });
        }
        let source = address as *const u8;
        for (index, byte) in buf.iter_mut().enumerate() {
            // SAFETY: the range was checked against the window `new` promised is mapped.
            *byte = unsafe { std::ptr::read_volatile(source.add(index)) };
        }
        Ok(())
    }
}
