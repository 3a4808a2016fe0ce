use thiserror::Error;

/// Errors raised while moving envelope bytes in or out of their fixed layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("Buffer is {actual} bytes, layout needs {expected}")]
    WrongSize { expected: usize, actual: usize },

    #[error("Buffer is {actual} bytes, layout needs at least {expected}")]
    Truncated { expected: usize, actual: usize },
}
