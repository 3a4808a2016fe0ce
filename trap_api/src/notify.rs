//! Object notifications.
//!
//! Registering hands the service an [`AsyncHandle`]. Each time a watched
//! object changes, the service writes one [`Notification`] record at the
//! handle's offset and sets its signal. The slot holds a single record, so
//! events that arrive before the caller reads the previous one replace it.
//!
//! The registration lives as long as its [`NotificationGuard`]; dropping the
//! guard unregisters.

use crate::client::TrapClient;
use crate::completion::{AsyncHandle, CompletionError};
use crate::error::{self, Error};
use crate::request::Request;
use crate::response::Response;
use crate::trap::TrapInvoker;
use call_types::{ErrorCode, ErrorSource, NotifyObjectKind, ObjectEvent, ObjectHandle, OperationId};
use envelope::{CompletionRecord, ResultRecord};
use log::{debug, warn};
use std::fmt;

/// One change to a watched object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Notification {
    pub kind: NotifyObjectKind,
    pub object: ObjectHandle,
    pub event: ObjectEvent,
}

impl Notification {
    /// Record layout: `arg1` object kind, `arg2` object, `arg3` event.
    pub fn to_record(&self) -> CompletionRecord {
        CompletionRecord {
            result: ResultRecord::ok(OperationId::RegisterNotification),
            arg1: self.kind.into_bits(),
            arg2: self.object.as_raw(),
            arg3: self.event.into_bits(),
        }
    }

    pub fn from_record(record: &CompletionRecord) -> Result<Self, CompletionError> {
        error::check(record.result)?;
        match (
            NotifyObjectKind::from_bits(record.arg1),
            ObjectEvent::from_bits(record.arg3),
        ) {
            (Some(kind), Some(event)) => Ok(Self {
                kind,
                object: ObjectHandle::from_raw(record.arg2),
                event,
            }),
            _ => {
                warn!(
                    "notification with kind {} and event {} not understood",
                    record.arg1, record.arg3
                );
                Err(CompletionError::UnknownNotification {
                    kind: record.arg1,
                    event: record.arg3,
                })
            }
        }
    }
}

impl<I: TrapInvoker> TrapClient<I> {
    /// Asks the service to report changes to objects of `kind` through `handle`.
    ///
    /// The handle's offset travels as the event slot, and the handle itself
    /// goes to the invoker so the service can signal it.
    pub fn register_notification(
        &self,
        kind: NotifyObjectKind,
        handle: AsyncHandle,
    ) -> Result<NotificationGuard<'_, I>, Error> {
        let request = Request::RegisterNotification {
            kind,
            event: handle.offset(),
        };
        let registration = match self.call_with(request, Some(&handle))? {
            Response::RegisterNotification { registration } => registration,
            other => {
                warn!("registration answered as {:?}", other);
                return Err(Error::new(ErrorSource::Hx, ErrorCode::Unknown));
            }
        };
        debug!(
            "registered {} for {:?} notifications at {:#x}",
            registration,
            kind,
            handle.address()
        );

        Ok(NotificationGuard {
            client: self,
            registration,
            kind,
            handle,
        })
    }
}

/// A live notification registration.
pub struct NotificationGuard<'c, I: TrapInvoker> {
    client: &'c TrapClient<I>,
    registration: ObjectHandle,
    kind: NotifyObjectKind,
    handle: AsyncHandle,
}

impl<'c, I: TrapInvoker> NotificationGuard<'c, I> {
    pub fn registration(&self) -> ObjectHandle {
        self.registration
    }

    pub fn kind(&self) -> NotifyObjectKind {
        self.kind
    }

    pub fn handle(&self) -> &AsyncHandle {
        &self.handle
    }

    /// Blocks until the service signals, then reads the notification.
    pub fn wait(&self) -> Result<Notification, CompletionError> {
        self.handle.signal().wait();
        self.take()
    }

    /// The pending notification, if the service has signaled one.
    pub fn try_next(&self) -> Option<Result<Notification, CompletionError>> {
        if !self.handle.signal().is_signaled() {
            return None;
        }
        Some(self.take())
    }

    // Reset before reading: a record written after this point signals again.
    fn take(&self) -> Result<Notification, CompletionError> {
        self.handle.signal().reset();
        let record = self.client.reader()?.read_record(&self.handle)?;
        Notification::from_record(&record)
    }
}

impl<I: TrapInvoker> Drop for NotificationGuard<'_, I> {
    fn drop(&mut self) {
        let request = Request::UnregisterNotification {
            registration: self.registration,
        };
        match self.client.call(request) {
            Ok(_) => debug!("unregistered {}", self.registration),
            Err(err) => warn!("failed to unregister {}: {}", self.registration, err),
        }
    }
}

impl<I: TrapInvoker> fmt::Debug for NotificationGuard<'_, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationGuard")
            .field("registration", &self.registration)
            .field("kind", &self.kind)
            .field("handle", &self.handle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{CompletionSignal, RegionError};
    use crate::trap::SubmitOutcome;
    use envelope::Envelope;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Registrar {
        seen: Mutex<Vec<(Envelope, bool)>>,
    }

    impl TrapInvoker for Registrar {
        fn submit(&self, envelope: &mut Envelope, handle: Option<&AsyncHandle>) -> SubmitOutcome {
            self.seen.lock().unwrap().push((*envelope, handle.is_some()));
            let operation = envelope.call.operation().unwrap();
            envelope.result = ResultRecord::ok(operation);
            envelope.arg1 = 0x5150;
            SubmitOutcome::Completed
        }
    }

    struct Flag(AtomicBool);

    impl CompletionSignal for Flag {
        fn wait(&self) {}

        fn is_signaled(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }

        fn signal(&self) {
            self.0.store(true, Ordering::SeqCst);
        }

        fn reset(&self) {
            self.0.store(false, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_notification_record_layout() {
        let notification = Notification {
            kind: NotifyObjectKind::Process,
            object: ObjectHandle::from_raw(0xffff_8000_0000_1000),
            event: ObjectEvent::Deleted,
        };
        let record = notification.to_record();
        assert_eq!(record.arg1, 1);
        assert_eq!(record.arg2, 0xffff_8000_0000_1000);
        assert_eq!(record.arg3, 2);
        assert_eq!(Notification::from_record(&record).unwrap(), notification);
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        let record = CompletionRecord {
            result: ResultRecord::ok(OperationId::RegisterNotification),
            arg1: 1,
            arg2: 0,
            arg3: 9,
        };
        assert_eq!(
            Notification::from_record(&record).unwrap_err(),
            CompletionError::UnknownNotification { kind: 1, event: 9 }
        );
    }

    #[test]
    fn test_register_then_drop_unregisters() {
        let client = TrapClient::new(Registrar::default());
        let handle = client.async_handle(Arc::new(Flag(AtomicBool::new(false))), 0x100);

        let guard = client
            .register_notification(NotifyObjectKind::Thread, handle)
            .unwrap();
        assert_eq!(guard.registration(), ObjectHandle::from_raw(0x5150));
        assert!(guard.try_next().is_none());
        drop(guard);

        let seen = client.invoker().seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        let (register, with_handle) = seen[0];
        assert!(with_handle);
        assert!(!register.call.is_async());
        assert_eq!(register.arg1, NotifyObjectKind::Thread.into_bits());
        assert_eq!(register.arg3, 0x100);

        let (unregister, with_handle) = seen[1];
        assert!(!with_handle);
        assert_eq!(
            unregister.call.operation(),
            Some(OperationId::UnregisterNotification)
        );
        assert_eq!(unregister.arg1, 0x5150);
    }

    #[test]
    fn test_signaled_without_region_is_unmapped() {
        let client = TrapClient::new(Registrar::default());
        let signal = Arc::new(Flag(AtomicBool::new(true)));
        let guard = client
            .register_notification(NotifyObjectKind::Process, client.async_handle(signal.clone(), 0))
            .unwrap();

        let err = guard.try_next().unwrap().unwrap_err();
        assert_eq!(err, CompletionError::Region(RegionError::Unmapped));
        assert!(!signal.is_signaled());
    }
}
