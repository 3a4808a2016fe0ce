//! # Trap API
//!
//! This crate is the client side of the trap-call protocol: it turns typed
//! requests into envelopes, hands them to a [`TrapInvoker`], and turns the
//! service's answers back into typed responses.
//!
//! ## Philosophy
//!
//! - **Every call owns its envelope**: [`OwnedEnvelope`] returns it to its
//!   allocator exactly once, whichever way decoding goes
//! - **Exhaustive shapes**: [`Request`] and [`Response`] have one variant per
//!   operation, matched exhaustively on both sides
//! - **The trap is a trait**: the real mechanism, a simulated service, and a
//!   missing service all sit behind [`TrapInvoker`]
//!
//! ## Async calls
//!
//! [`TrapClient::submit_async`] returns a [`PendingCall`]. The caller waits on
//! or polls it; the completion is read from the shared region at the handle's
//! offset once the service signals.
//!
//! [`TrapClient::register_notification`] reuses the same handle and region
//! for object notifications; the returned [`NotificationGuard`] unregisters
//! when dropped.
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - The service (no policy, no permission checks)
//! - A trap instruction (the invoker is supplied by the caller)

pub mod alloc;
pub mod catalog;
pub mod client;
pub mod completion;
pub mod config;
pub mod error;
pub mod notify;
pub mod request;
pub mod response;
pub mod trap;

pub use alloc::{EnvelopeAllocator, HeapAllocator, OwnedEnvelope};
pub use catalog::descriptor_for;
pub use client::{CompletionState, PendingCall, TrapClient};
pub use completion::{
    AsyncHandle, CompletionError, CompletionReader, CompletionSignal, MappedRegion, RegionError,
    SharedRegion,
};
pub use config::{ConfigError, ProtocolConfig};
pub use error::{is_error, to_error, Error};
pub use notify::{Notification, NotificationGuard};
pub use request::Request;
pub use response::{decode, decode_completion, Response};
pub use trap::{AbsentTransport, SubmitOutcome, TrapInvoker};
