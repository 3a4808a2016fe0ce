//! # Envelope
//!
//! This crate defines the fixed-layout buffer exchanged with the service on
//! every trap, and the completion record the service writes into the shared
//! region for asynchronous calls.
//!
//! ## Philosophy
//!
//! - **Layout is a contract**: every field has a documented byte offset and
//!   is (de)serialized explicitly, never via `repr(C)` transmutes
//! - **Bits are preserved**: the descriptor and result words are thin wrappers
//!   over `u32`, so whatever the service writes can be represented and inspected
//! - **Golden-tested**: offsets and sizes are asserted in tests
//!
//! ## Layout
//!
//! ```text
//! offset  size  field
//!      0     4  call descriptor
//!      4     4  result record
//!      8     4  padding
//!     12     8  arg1
//!     20     8  arg2
//!     28     8  arg3
//!     36    16  ext_arg1
//!     52    16  ext_arg2
//!     68    16  ext_arg3
//!     84    16  ext_arg4
//!    100        total
//! ```

pub mod completion;
pub mod descriptor;
pub mod error;
pub mod layout;

pub use completion::{CompletionRecord, COMPLETION_PREFIX_SIZE, COMPLETION_RECORD_SIZE};
pub use descriptor::{CallDescriptor, ResultRecord};
pub use error::LayoutError;
pub use layout::{Envelope, ENVELOPE_SIZE};
