//! Protocol error values and result translation.

use call_types::{ErrorCode, ErrorSource};
use envelope::ResultRecord;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error reported by the service, or synthesized by the client when the
/// trap transport is absent.
///
/// The field named `source` is the protocol's error source, which is why
/// `std::error::Error` is implemented by hand instead of derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Error {
    pub source: ErrorSource,
    pub code: ErrorCode,
}

impl Error {
    pub const fn new(source: ErrorSource, code: ErrorCode) -> Self {
        Self { source, code }
    }

    /// The error returned for every call when no service answers the trap.
    pub const fn not_loaded() -> Self {
        Self::new(ErrorSource::Hx, ErrorCode::NotLoaded)
    }

    pub const fn is_error(&self) -> bool {
        is_error(self)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.source, self.code)
    }
}

impl std::error::Error for Error {}

/// Projects a result record onto an [`Error`].
///
/// The unassigned source pattern cannot be trusted, so it is reported as
/// `{Hx, Unknown}`.
pub fn to_error(record: ResultRecord) -> Error {
    match record.source() {
        Some(source) => Error::new(source, record.code()),
        None => {
            warn!(
                "result record {:#010x} carries invalid error source bits {}",
                record.into_bits(),
                record.source_bits()
            );
            Error::new(ErrorSource::Hx, ErrorCode::Unknown)
        }
    }
}

/// Only `{Hx, Ok}` is success.
pub const fn is_error(error: &Error) -> bool {
    !(matches!(error.code, ErrorCode::Ok) && matches!(error.source, ErrorSource::Hx))
}

/// `Ok(())` for success, otherwise the translated error.
pub fn check(record: ResultRecord) -> Result<(), Error> {
    let error = to_error(record);
    if is_error(&error) {
        Err(error)
    } else {
        Ok(())
    }
}
