//! Error type for [`FixedVec`](crate::FixedVec).
//!
//! Every fallible operation checks its precondition before touching the
//! vector, so receiving one of these errors means nothing was mutated.

use core::{error::Error as CoreError, fmt};

/// Errors returned by operations on [`FixedVec`](crate::FixedVec).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Error {
    /// The operation would grow the vector past its fixed capacity.
    Full,
    /// The operation needs at least one element, but the vector is empty.
    Empty,
    /// An index or position was outside the live range.
    OutOfBounds,
    /// The buffer could not be allocated.
    ///
    /// Only returned by [`FixedVec::try_with_capacity`](crate::FixedVec::try_with_capacity).
    AllocFailed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => f.write_str("capacity exceeded"),
            Self::Empty => f.write_str("container is empty"),
            Self::OutOfBounds => f.write_str("index out of bounds"),
            Self::AllocFailed => f.write_str("memory allocation failed"),
        }
    }
}

impl CoreError for Error {}
