//! Full-to-sparse storage conversion
//!
//! Rebuilds a full matrix as an equivalent sparse one in place. The value
//! buffer already holds every position in column order and is reused as
//! is; only the start-offset and index arrays are materialized, and both
//! fills are embarrassingly parallel.

use rayon::prelude::*;

use spmat_core::{checked_entry_count, Error, Matrix, MatrixElement, Result};

use crate::alloc::{BufferAllocator, SystemAllocator};
use crate::context::Context;

/// Convert a full matrix to sparse, in place
///
/// Accepts a matrix in full storage, or one with zero capacity and a
/// deferred value buffer (an empty full matrix). On success every
/// position has an explicit entry: `starts[k] = k * vlen` and
/// `indices[p] = p mod vlen`.
///
/// On allocation failure the matrix releases all partially built buffers
/// and is left in the discarded state; the caller must not continue using
/// it. This and dimension overflow are the only errors.
pub fn convert_full_to_sparse<T: MatrixElement>(a: &mut Matrix<T>, ctx: &Context) -> Result<()> {
    convert_full_to_sparse_with(a, ctx, &SystemAllocator)
}

/// As [`convert_full_to_sparse`], allocating through an explicit seam
pub fn convert_full_to_sparse_with<T, A>(a: &mut Matrix<T>, ctx: &Context, alloc: &A) -> Result<()>
where
    T: MatrixElement,
    A: BufferAllocator,
{
    debug_assert!(a.check().is_ok(), "matrix invariants violated on entry");
    debug_assert!(a.is_full() || a.nzmax() == 0);
    debug_assert_eq!(a.nzombies(), 0);
    debug_assert_eq!(a.npending(), 0);
    debug_assert!(!a.is_jumbled());

    let vlen = a.vlen();
    let vdim = a.vdim();

    // overflow is reported before any allocation is attempted
    let anz = checked_entry_count(vlen, vdim)?;

    if a.values().is_empty() {
        debug_assert!(a.nzmax() == 0 && anz == 0);
        // materialize a one-element buffer so the empty case needs no
        // branch downstream
        match alloc.alloc_values::<T>(1) {
            Some(buf) => a.adopt_values(buf),
            None => {
                a.discard();
                return Err(Error::OutOfMemory);
            }
        }
    }

    let Some(mut starts) = alloc.alloc_indices(vdim + 1) else {
        a.discard();
        return Err(Error::OutOfMemory);
    };
    let Some(mut indices) = alloc.alloc_indices(anz) else {
        a.discard();
        return Err(Error::OutOfMemory);
    };

    let nthreads = ctx.nthreads_for(anz);
    fill_starts(&mut starts, vlen, nthreads);
    fill_indices(&mut indices, vlen, nthreads);

    a.install_sparse(starts, indices);

    debug_assert!(a.is_sparse());
    debug_assert!(!a.is_jumbled());
    debug_assert!(a.check().is_ok(), "conversion broke matrix invariants");
    Ok(())
}

/// `starts[k] = k * vlen`: each vector is fully dense
fn fill_starts(starts: &mut [usize], vlen: usize, nthreads: usize) {
    if nthreads <= 1 {
        for (k, s) in starts.iter_mut().enumerate() {
            *s = k * vlen;
        }
        return;
    }
    let block = starts.len().div_ceil(nthreads);
    starts
        .par_chunks_mut(block)
        .enumerate()
        .for_each(|(c, chunk)| {
            let base = c * block;
            for (off, s) in chunk.iter_mut().enumerate() {
                *s = (base + off) * vlen;
            }
        });
}

/// `indices[p] = p mod vlen`: every row position in order, per vector
fn fill_indices(indices: &mut [usize], vlen: usize, nthreads: usize) {
    if indices.is_empty() {
        return;
    }
    // anz > 0 implies vlen > 0
    if nthreads <= 1 {
        for (p, i) in indices.iter_mut().enumerate() {
            *i = p % vlen;
        }
        return;
    }
    let block = indices.len().div_ceil(nthreads);
    indices
        .par_chunks_mut(block)
        .enumerate()
        .for_each(|(c, chunk)| {
            let base = c * block;
            for (off, i) in chunk.iter_mut().enumerate() {
                *i = (base + off) % vlen;
            }
        });
}
