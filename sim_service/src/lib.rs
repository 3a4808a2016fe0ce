//! # Simulated Service
//!
//! This crate provides an in-process stand-in for the privileged service.
//!
//! ## Purpose
//!
//! The simulated service lets the wire contract be exercised without the
//! real trap:
//! - Runs under `cargo test`
//! - Deterministic (answers are programmed, faults are planned)
//! - Inspectable (every submitted envelope is recorded)
//!
//! It makes no policy decisions. Whatever answer a test programs for an
//! operation is written back, slot for slot, and async completions land in
//! an [`InMemoryRegion`] exactly as the real service lays them out.

pub mod allocator;
pub mod fault_injection;
pub mod region;
pub mod signal;
pub mod test_utils;

pub use allocator::CountingAllocator;
pub use fault_injection::{FaultInjector, FaultPlan, TrapFault};
pub use region::InMemoryRegion;
pub use signal::EventSignal;

use call_types::{ObjectHandle, OperationId};
use envelope::{CompletionRecord, Envelope, ResultRecord};
use log::{debug, trace};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use trap_api::{AsyncHandle, Error, Notification, Response, SubmitOutcome, TrapInvoker};

/// What the service answers for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Success with these response slots.
    Respond(Response),
    /// Error result, written into the envelope (for async calls, at submission).
    Fail(Error),
    /// Async only: accept the submission, then complete with this error.
    FailLater(Error),
}

/// When async completions are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionMode {
    /// Write and signal during `submit`.
    #[default]
    Immediate,
    /// Hold until [`SimulatedService::complete_pending`] is called.
    Deferred,
}

/// One envelope as the service received it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub envelope: Envelope,
    pub offset: Option<u64>,
}

#[derive(Debug)]
struct PendingCompletion {
    handle: AsyncHandle,
    record: CompletionRecord,
}

#[derive(Debug, Default)]
struct Inner {
    replies: HashMap<OperationId, Reply>,
    submissions: Vec<Submission>,
    pending: Vec<PendingCompletion>,
    cancelled: Vec<u64>,
    registrations: HashMap<ObjectHandle, AsyncHandle>,
    faults: FaultInjector,
}

/// In-process [`TrapInvoker`] that answers from programmed replies.
#[derive(Debug)]
pub struct SimulatedService {
    state: Mutex<Inner>,
    region: Arc<InMemoryRegion>,
    mode: CompletionMode,
}

impl SimulatedService {
    /// A service completing into `region`. Unprogrammed operations succeed
    /// with zeroed response slots.
    pub fn new(region: Arc<InMemoryRegion>) -> Self {
        Self {
            state: Mutex::new(Inner::default()),
            region,
            mode: CompletionMode::Immediate,
        }
    }

    pub fn with_mode(mut self, mode: CompletionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_fault_plan(self, plan: FaultPlan) -> Self {
        self.lock().faults = FaultInjector::new(plan);
        self
    }

    pub fn region(&self) -> &Arc<InMemoryRegion> {
        &self.region
    }

    /// Programs the reply for every later call of `operation`.
    pub fn reply(&self, operation: OperationId, reply: Reply) {
        self.lock().replies.insert(operation, reply);
    }

    /// Shorthand for a successful reply.
    pub fn respond(&self, response: Response) {
        self.reply(response.operation(), Reply::Respond(response));
    }

    pub fn fail(&self, operation: OperationId, error: Error) {
        self.reply(operation, Reply::Fail(error));
    }

    /// Envelopes that reached the service, in order.
    pub fn submissions(&self) -> Vec<Submission> {
        self.lock().submissions.clone()
    }

    /// Offsets named by `CancelAsyncCall` requests.
    pub fn cancelled_offsets(&self) -> Vec<u64> {
        self.lock().cancelled.clone()
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    /// Registrations that have not been unregistered yet.
    pub fn registration_count(&self) -> usize {
        self.lock().registrations.len()
    }

    /// Writes `notification` for `registration` and signals its handle.
    /// Returns `false` when nothing is registered under that handle.
    pub fn notify(&self, registration: ObjectHandle, notification: Notification) -> bool {
        let handle = match self.lock().registrations.get(&registration) {
            Some(handle) => handle.clone(),
            None => {
                debug!("no registration {} to notify", registration);
                return false;
            }
        };
        self.deliver(&handle, &notification.to_record().to_bytes());
        true
    }

    /// Delivers every held completion and returns how many were delivered.
    pub fn complete_pending(&self) -> usize {
        let pending = std::mem::take(&mut self.lock().pending);
        let count = pending.len();
        for completion in pending {
            self.deliver(&completion.handle, &completion.record.to_bytes());
        }
        count
    }

    fn deliver(&self, handle: &AsyncHandle, payload: &[u8]) {
        let mut payload = payload.to_vec();
        if let Some(len) = self.lock().faults.take_truncation() {
            payload.truncate(len);
        }
        match self.region.write_completion(handle, &payload) {
            Ok(()) => {
                debug!(
                    "completed {} bytes at {:#x}",
                    payload.len(),
                    handle.address()
                );
                handle.signal().signal();
            }
            Err(err) => debug!("dropping completion: {}", err),
        }
    }

    fn answer(&self, operation: OperationId) -> Reply {
        self.lock()
            .replies
            .get(&operation)
            .copied()
            .unwrap_or_else(|| Reply::Respond(Response::from_slots(operation, 0, 0, 0)))
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SimulatedService {
    fn track_registration(
        &self,
        response: Response,
        envelope: &Envelope,
        handle: Option<&AsyncHandle>,
    ) {
        match (response, handle) {
            (Response::RegisterNotification { registration }, Some(handle)) => {
                self.lock()
                    .registrations
                    .insert(registration, handle.clone());
            }
            (Response::UnregisterNotification, _) => {
                let registration = ObjectHandle::from_raw(envelope.arg1);
                if self.lock().registrations.remove(&registration).is_none() {
                    debug!("unregister of unknown {}", registration);
                }
            }
            _ => {}
        }
    }
}

fn result_for(echo: OperationId, error: Option<Error>) -> ResultRecord {
    match error {
        Some(error) => ResultRecord::from_parts(echo, error.source, error.code),
        None => ResultRecord::ok(echo),
    }
}

impl SimulatedService {
    fn accept_async(
        &self,
        envelope: &mut Envelope,
        operation: OperationId,
        echo: OperationId,
        reply: Reply,
        handle: &AsyncHandle,
    ) {
        let record = match reply {
            Reply::Fail(error) => {
                envelope.result = result_for(echo, Some(error));
                return;
            }
            Reply::Respond(response) => {
                let [arg1, arg2, arg3] = response.to_slots();
                CompletionRecord {
                    result: result_for(echo, None),
                    arg1,
                    arg2,
                    arg3,
                }
            }
            Reply::FailLater(error) => CompletionRecord {
                result: result_for(echo, Some(error)),
                ..CompletionRecord::default()
            },
        };
        envelope.result = ResultRecord::ok(operation);

        match self.mode {
            CompletionMode::Immediate => self.deliver(handle, &record.to_bytes()),
            CompletionMode::Deferred => self.lock().pending.push(PendingCompletion {
                handle: handle.clone(),
                record,
            }),
        }
    }
}

impl TrapInvoker for SimulatedService {
    fn submit(&self, envelope: &mut Envelope, handle: Option<&AsyncHandle>) -> SubmitOutcome {
        let operation = match envelope.call.operation() {
            Some(operation) => operation,
            None => {
                debug!("unknown operation bits {}", envelope.call.operation_bits());
                return SubmitOutcome::TransportAbsent;
            }
        };

        let echo = {
            let mut inner = self.lock();
            if inner.faults.should_drop(operation) {
                debug!("transport absent for {}", operation);
                return SubmitOutcome::TransportAbsent;
            }
            inner.submissions.push(Submission {
                envelope: *envelope,
                offset: handle.map(AsyncHandle::offset),
            });
            inner.faults.take_misecho().unwrap_or(operation)
        };
        trace!("service received {:?}", envelope);

        let reply = self.answer(operation);
        if operation == OperationId::CancelAsyncCall {
            if let Reply::Respond(_) = reply {
                let offset = envelope.arg1;
                let mut inner = self.lock();
                inner.cancelled.push(offset);
                inner.pending.retain(|p| p.handle.offset() != offset);
            } else {
                debug!("cancel of {:#x} refused", envelope.arg1);
            }
        }
        match handle {
            Some(handle) if envelope.call.is_async() => {
                self.accept_async(envelope, operation, echo, reply, handle)
            }
            _ => match reply {
                Reply::Respond(response) => {
                    self.track_registration(response, envelope, handle);
                    let [arg1, arg2, arg3] = response.to_slots();
                    envelope.result = result_for(echo, None);
                    envelope.arg1 = arg1;
                    envelope.arg2 = arg2;
                    envelope.arg3 = arg3;
                }
                Reply::Fail(error) | Reply::FailLater(error) => {
                    envelope.result = result_for(echo, Some(error));
                }
            },
        }
        SubmitOutcome::Completed
    }
}
