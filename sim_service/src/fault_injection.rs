//! Deterministic fault injection for the simulated service
//!
//! Faults are planned up front and consumed in submission order, so a test
//! always sees the same sequence of failures.
//!
//! ## Example
//!
//! ```
//! use sim_service::fault_injection::{FaultPlan, TrapFault};
//! use call_types::OperationId;
//!
//! let plan = FaultPlan::new()
//!     .with_fault(TrapFault::AbsentNext { count: 2 })
//!     .with_fault(TrapFault::AbsentFor { operation: OperationId::Status });
//! ```

use call_types::OperationId;

/// A fault to inject into trap submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrapFault {
    /// Report the transport as absent for the next N submissions
    AbsentNext { count: usize },

    /// Report the transport as absent for every submission
    AlwaysAbsent,

    /// Report the transport as absent for one operation only
    AbsentFor { operation: OperationId },

    /// Echo another operation in the next result record
    MisechoNext { echo: OperationId },

    /// Cut the next completion payload down to `len` bytes
    TruncateNextCompletion { len: usize },
}

/// The faults a test wants, in the order they were added
#[derive(Debug, Clone, Default)]
pub struct FaultPlan {
    faults: Vec<TrapFault>,
}

impl FaultPlan {
    pub fn new() -> Self {
        Self { faults: Vec::new() }
    }

    pub fn with_fault(mut self, fault: TrapFault) -> Self {
        self.faults.push(fault);
        self
    }

    pub fn faults(&self) -> &[TrapFault] {
        &self.faults
    }
}

/// Applies a [`FaultPlan`] one submission at a time
#[derive(Debug, Default)]
pub struct FaultInjector {
    absent_next: usize,
    always_absent: bool,
    absent_for: Vec<OperationId>,
    misecho: Vec<OperationId>,
    truncate: Vec<usize>,
}

impl FaultInjector {
    pub fn new(plan: FaultPlan) -> Self {
        let mut injector = Self::default();
        for fault in plan.faults() {
            match fault {
                TrapFault::AbsentNext { count } => injector.absent_next += count,
                TrapFault::AlwaysAbsent => injector.always_absent = true,
                TrapFault::AbsentFor { operation } => injector.absent_for.push(*operation),
                TrapFault::MisechoNext { echo } => injector.misecho.push(*echo),
                TrapFault::TruncateNextCompletion { len } => injector.truncate.push(*len),
            }
        }
        injector
    }

    /// Whether this submission should see no transport.
    pub fn should_drop(&mut self, operation: OperationId) -> bool {
        if self.always_absent || self.absent_for.contains(&operation) {
            return true;
        }
        if self.absent_next > 0 {
            self.absent_next -= 1;
            return true;
        }
        false
    }

    /// The operation to echo instead of the real one, if any.
    pub fn take_misecho(&mut self) -> Option<OperationId> {
        if self.misecho.is_empty() {
            None
        } else {
            Some(self.misecho.remove(0))
        }
    }

    pub fn take_truncation(&mut self) -> Option<usize> {
        if self.truncate.is_empty() {
            None
        } else {
            Some(self.truncate.remove(0))
        }
    }
}
