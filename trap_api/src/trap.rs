//! The boundary to the trap mechanism itself.

use crate::completion::AsyncHandle;
use envelope::Envelope;
use std::sync::Arc;

/// What happened when an envelope was handed to the trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The service processed the envelope and wrote its result in place.
    /// For async calls this is only the acknowledgement.
    Completed,
    /// Nothing answered the trap. The envelope was not touched.
    TransportAbsent,
}

/// Invokes the service with an envelope.
///
/// `submit` takes `&self` so one invoker can serve concurrent callers.
/// `handle` is present only for async submissions.
pub trait TrapInvoker: Send + Sync {
    fn submit(&self, envelope: &mut Envelope, handle: Option<&AsyncHandle>) -> SubmitOutcome;
}

impl<T: TrapInvoker + ?Sized> TrapInvoker for &T {
    fn submit(&self, envelope: &mut Envelope, handle: Option<&AsyncHandle>) -> SubmitOutcome {
        (**self).submit(envelope, handle)
    }
}

impl<T: TrapInvoker + ?Sized> TrapInvoker for Arc<T> {
    fn submit(&self, envelope: &mut Envelope, handle: Option<&AsyncHandle>) -> SubmitOutcome {
        (**self).submit(envelope, handle)
    }
}

/// Invoker used when the service is known to be missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct AbsentTransport;

impl TrapInvoker for AbsentTransport {
    fn submit(&self, _envelope: &mut Envelope, _handle: Option<&AsyncHandle>) -> SubmitOutcome {
        SubmitOutcome::TransportAbsent
    }
}
