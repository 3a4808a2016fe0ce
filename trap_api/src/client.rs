//! Trap client: synchronous calls and async submissions over a [`TrapInvoker`].

use crate::alloc::{EnvelopeAllocator, HeapAllocator, OwnedEnvelope};
use crate::completion::{
    AsyncHandle, CompletionError, CompletionReader, CompletionSignal, RegionError, SharedRegion,
};
use crate::config::{self, ProtocolConfig};
use crate::error::{self, Error};
use crate::request::Request;
use crate::response::{decode, Response};
use crate::trap::{SubmitOutcome, TrapInvoker};
use call_types::OperationId;
use log::{debug, warn};
use std::fmt;
use std::sync::Arc;

/// Issues requests to the service.
///
/// The client holds no per-call state; one instance can be shared by
/// threads as long as concurrent async calls use disjoint offsets.
pub struct TrapClient<I: TrapInvoker> {
    invoker: I,
    allocator: Arc<dyn EnvelopeAllocator>,
    region: Option<Arc<dyn SharedRegion>>,
    config: ProtocolConfig,
}

impl<I: TrapInvoker> TrapClient<I> {
    /// Heap-allocated envelopes, the process-wide config, and no shared region.
    pub fn new(invoker: I) -> Self {
        Self {
            invoker,
            allocator: Arc::new(HeapAllocator),
            region: None,
            config: config::current().clone(),
        }
    }

    pub fn with_allocator(mut self, allocator: Arc<dyn EnvelopeAllocator>) -> Self {
        self.allocator = allocator;
        self
    }

    pub fn with_region(mut self, region: Arc<dyn SharedRegion>) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_config(mut self, config: ProtocolConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    /// Builds a handle for a completion at `offset` from the configured base.
    pub fn async_handle(&self, signal: Arc<dyn CompletionSignal>, offset: u64) -> AsyncHandle {
        AsyncHandle::new(signal, self.config.shared_region_base, offset)
    }

    /// Sends `request` and decodes the answer.
    pub fn call(&self, request: Request) -> Result<Response, Error> {
        self.call_with(request, None)
    }

    /// A synchronous call that also hands `handle` to the service, for
    /// requests that name an event the service signals later.
    pub(crate) fn call_with(
        &self,
        request: Request,
        handle: Option<&AsyncHandle>,
    ) -> Result<Response, Error> {
        let operation = request.operation();
        let mut envelope = OwnedEnvelope::acquire(self.allocator.as_ref());
        request.encode(&mut envelope);

        debug!("submitting {}", operation);
        match self.invoker.submit(&mut envelope, handle) {
            SubmitOutcome::Completed => decode(envelope, operation),
            SubmitOutcome::TransportAbsent => {
                warn!("no service answered the trap for {}", operation);
                Err(Error::not_loaded())
            }
        }
    }

    /// Submits `request` for asynchronous completion.
    ///
    /// The service's acknowledgement is checked right away; an error result
    /// written at submission time is returned here and nothing is left to wait on.
    pub fn submit_async(
        &self,
        request: Request,
        handle: AsyncHandle,
    ) -> Result<PendingCall<'_, I>, Error> {
        let operation = request.operation();
        let mut envelope = OwnedEnvelope::acquire(self.allocator.as_ref());
        request.encode(&mut envelope);
        envelope.call = envelope.call.with_is_async(true);

        debug!(
            "submitting {} async, completion at {:#x}",
            operation,
            handle.address()
        );
        match self.invoker.submit(&mut envelope, Some(&handle)) {
            SubmitOutcome::Completed => error::check(envelope.result)?,
            SubmitOutcome::TransportAbsent => {
                warn!("no service answered the trap for async {}", operation);
                return Err(Error::not_loaded());
            }
        }

        Ok(PendingCall {
            client: self,
            operation,
            handle,
            state: CompletionState::Submitted,
        })
    }

    pub(crate) fn reader(&self) -> Result<CompletionReader<'_>, RegionError> {
        let region = self.region.as_deref().ok_or(RegionError::Unmapped)?;
        Ok(CompletionReader::new(region, self.config.max_completion_len))
    }
}

/// Where an async call is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
    Submitted,
    Signaled,
    Read,
    Cancelled,
}

/// An accepted async call whose completion has not been consumed yet.
pub struct PendingCall<'c, I: TrapInvoker> {
    client: &'c TrapClient<I>,
    operation: OperationId,
    handle: AsyncHandle,
    state: CompletionState,
}

impl<I: TrapInvoker> fmt::Debug for PendingCall<'_, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCall")
            .field("operation", &self.operation)
            .field("handle", &self.handle)
            .field("state", &self.state)
            .finish()
    }
}

impl<'c, I: TrapInvoker> PendingCall<'c, I> {
    pub fn operation(&self) -> OperationId {
        self.operation
    }

    pub fn handle(&self) -> &AsyncHandle {
        &self.handle
    }

    pub fn state(&self) -> CompletionState {
        self.state
    }

    /// Non-blocking check of the completion signal.
    pub fn is_signaled(&mut self) -> bool {
        if self.state == CompletionState::Submitted && self.handle.signal().is_signaled() {
            self.state = CompletionState::Signaled;
        }
        matches!(self.state, CompletionState::Signaled | CompletionState::Read)
    }

    /// Reads the completion if it is already signaled, otherwise `None`.
    pub fn poll(&mut self) -> Option<Result<Response, CompletionError>> {
        if self.state == CompletionState::Cancelled {
            return Some(Err(CompletionError::Cancelled));
        }
        if !self.is_signaled() {
            return None;
        }
        Some(self.read_response())
    }

    /// Blocks until the completion is signaled, then decodes it.
    pub fn wait(mut self) -> Result<Response, CompletionError> {
        self.block()?;
        self.read_response()
    }

    /// Blocks until the completion is signaled, then returns the raw payload.
    pub fn wait_payload(mut self) -> Result<Vec<u8>, CompletionError> {
        self.block()?;
        let payload = self.client.reader()?.read_payload(&self.handle)?;
        self.state = CompletionState::Read;
        Ok(payload)
    }

    /// Asks the service to abandon the call.
    ///
    /// Once the service accepts, any later wait or poll reports
    /// [`CompletionError::Cancelled`] without touching the region.
    pub fn cancel(&mut self) -> Result<(), Error> {
        if self.state == CompletionState::Cancelled {
            return Ok(());
        }
        self.client.call(Request::CancelAsyncCall {
            offset: self.handle.offset(),
        })?;
        debug!(
            "cancelled async {} at offset {:#x}",
            self.operation,
            self.handle.offset()
        );
        self.state = CompletionState::Cancelled;
        Ok(())
    }

    fn block(&mut self) -> Result<(), CompletionError> {
        match self.state {
            CompletionState::Cancelled => Err(CompletionError::Cancelled),
            CompletionState::Submitted => {
                self.handle.signal().wait();
                self.state = CompletionState::Signaled;
                Ok(())
            }
            CompletionState::Signaled | CompletionState::Read => Ok(()),
        }
    }

    fn read_response(&mut self) -> Result<Response, CompletionError> {
        let response = self
            .client
            .reader()?
            .read_response(&self.handle, self.operation);
        self.state = CompletionState::Read;
        response
    }
}
