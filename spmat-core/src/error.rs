//! Error types for sparse matrix operations

/// Errors that can occur during matrix construction and conversion
///
/// Precondition violations (wrong representation, unresolved zombies or
/// pending mutations) are not represented here: those are caller contract
/// bugs checked with `debug_assert!`, not recoverable conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An allocation request could not be satisfied
    OutOfMemory,
    /// The entry count `vlen * vdim` does not fit in the index range
    DimensionOverflow,
    /// Storage arrays violate a structural invariant
    InvalidStorage,
    /// Index out of bounds
    IndexOutOfBounds,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Error::OutOfMemory => "Out of memory",
            Error::DimensionOverflow => "Matrix dimensions overflow the index range",
            Error::InvalidStorage => "Invalid storage structure",
            Error::IndexOutOfBounds => "Index out of bounds",
        };
        write!(f, "{msg}")
    }
}

/// Result type for sparse matrix operations
pub type Result<T> = core::result::Result<T, Error>;
