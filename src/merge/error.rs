//! Merge engine error types
//!
//! The engine is total over any input whose bounds are mutually comparable, so
//! the only failure is a comparator contract violation detected before any
//! processing begins.

use crate::merge::types::BoundField;
use thiserror::Error;

/// Errors that can occur in the merge engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// A bound does not support the total order the merge relies on
    /// (e.g. a floating-point NaN)
    #[error("Invalid comparator: event {index} has an incomparable {field} bound")]
    InvalidComparator { index: usize, field: BoundField },
}

/// Result type alias for merge operations
pub type MergeResult<T> = Result<T, MergeError>;
