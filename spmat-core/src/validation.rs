//! Pure structural validation helpers
//!
//! Mathematical checks on shapes and index arrays, with no allocation and
//! no I/O. `Matrix::check` composes these into a full invariant audit.

use crate::error::{Error, Result};

/// Compute the dense entry count `vlen * vdim` with overflow protection
///
/// This gate runs before any allocation that depends on the product, so a
/// shape too large for the index range fails with a distinct error instead
/// of a wrapped size.
pub const fn checked_entry_count(vlen: usize, vdim: usize) -> Result<usize> {
    match vlen.checked_mul(vdim) {
        Some(anz) => Ok(anz),
        None => Err(Error::DimensionOverflow),
    }
}

/// Check that a start-offset array is monotonically non-decreasing
pub fn starts_are_monotone(starts: &[usize]) -> bool {
    starts.windows(2).all(|w| w[0] <= w[1])
}

/// Check that every within-vector position is below `vlen`
pub fn indices_are_in_bounds(indices: &[usize], vlen: usize) -> bool {
    indices.iter().all(|&i| i < vlen)
}

/// Check that a materialized-vector list is strictly increasing and below
/// `vdim`
pub fn vec_ids_are_valid(vec_ids: &[usize], vdim: usize) -> bool {
    vec_ids.iter().all(|&j| j < vdim) && vec_ids.windows(2).all(|w| w[0] < w[1])
}

/// Check that indices are strictly increasing within every vector
///
/// This is the property the `jumbled == false` hint promises; jumbled
/// matrices may fail it and remain valid.
pub fn vectors_are_sorted(starts: &[usize], indices: &[usize]) -> bool {
    starts.windows(2).all(|w| {
        indices
            .get(w[0]..w[1])
            .is_some_and(|v| v.windows(2).all(|x| x[0] < x[1]))
    })
}
