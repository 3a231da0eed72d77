//! Square-diagonal structure test
//!
//! Decides whether a matrix is square with exactly one entry per vector,
//! every entry on the main diagonal. The scan is split into many more
//! tasks than threads so that one task's violation can stop the others
//! promptly through a shared cooperative flag.

use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use spmat_core::{Matrix, MatrixElement};

use crate::context::Context;

/// Tasks per thread for the scan; small ranges make the early exit bite
const TASKS_PER_THREAD: usize = 256;

/// True if the matrix is a square diagonal matrix with every diagonal
/// entry present
///
/// Tolerates jumbled input: a vector with one entry is trivially ordered,
/// and vectors with more than one entry disqualify the matrix anyway.
/// Bitmap matrices are never classified diagonal, and a full matrix only
/// in the trivial 1-by-1 case.
///
/// On success the non-empty-vector hint is tightened to `n` and the
/// jumbled hint cleared; no entries or representation change.
pub fn is_diagonal<T: MatrixElement>(a: &mut Matrix<T>, ctx: &Context) -> bool {
    debug_assert!(a.check().is_ok(), "matrix invariants violated on entry");
    debug_assert_eq!(a.nzombies(), 0);
    debug_assert_eq!(a.npending(), 0);
    // jumbled input is explicitly tolerated here

    let n = a.nrows();
    if n != a.ncols() {
        return false;
    }
    if a.is_bitmap() {
        return false;
    }
    if a.is_full() {
        return n == 1;
    }

    // a diagonal matrix has exactly n entries in n materialized vectors;
    // this also rejects any hypersparse matrix with a vector missing, so
    // the surviving cases index their offsets directly by vector
    if a.entry_count() != n || a.nvec() != n {
        return false;
    }

    let diagonal = match a.sparse_layout() {
        Some((starts, indices)) => scan_diagonal(starts, indices, n, ctx),
        None => return false,
    };

    if diagonal {
        // verified: one entry per vector, so ordering is moot
        a.tighten_nvec_nonempty(n);
        a.mark_sorted();
    }
    diagonal
}

fn scan_diagonal(starts: &[usize], indices: &[usize], n: usize, ctx: &Context) -> bool {
    let nthreads = ctx.nthreads_for(n);
    let ntasks = if nthreads == 1 {
        1
    } else {
        (TASKS_PER_THREAD * nthreads).min(n).max(1)
    };

    if ntasks == 1 {
        return (0..n).all(|j| vector_is_diagonal(starts, indices, j));
    }

    let diagonal = AtomicBool::new(true);
    (0..ntasks).into_par_iter().for_each(|tid| {
        // cooperative early exit: a stale read only costs redundant work
        if !diagonal.load(Ordering::Acquire) {
            return;
        }
        let range = Context::partition(n, tid, ntasks);
        for j in range {
            if !vector_is_diagonal(starts, indices, j) {
                diagonal.store(false, Ordering::Release);
                return;
            }
        }
    });
    diagonal.load(Ordering::Acquire)
}

#[inline]
fn vector_is_diagonal(starts: &[usize], indices: &[usize], j: usize) -> bool {
    let p = starts[j];
    starts[j + 1] - p == 1 && indices[p] == j
}

#[cfg(test)]
mod tests {
    use super::*;
    use spmat_core::Matrix;

    fn identity(n: usize) -> Matrix<f64> {
        let starts = (0..=n).collect();
        let indices = (0..n).collect();
        Matrix::new_sparse(n, n, starts, indices, vec![1.0; n]).unwrap()
    }

    #[test]
    fn test_empty_matrix_is_diagonal() {
        let mut m = Matrix::new_sparse(0, 0, vec![0], vec![], Vec::<f64>::new()).unwrap();
        assert!(is_diagonal(&mut m, &Context::default()));
    }

    #[test]
    fn test_full_matrices() {
        let mut m = Matrix::new_full(1, 1, vec![3.0f64]).unwrap();
        assert!(is_diagonal(&mut m, &Context::default()));
        let mut m = Matrix::new_full(2, 2, vec![1.0f64; 4]).unwrap();
        assert!(!is_diagonal(&mut m, &Context::default()));
    }

    #[test]
    fn test_identity_accepted_and_hints_tightened() {
        for ctx in [Context::sequential(), Context::new(4, 8)] {
            let mut m = identity(100);
            m.mark_jumbled();
            assert!(is_diagonal(&mut m, &ctx));
            assert_eq!(m.nvec_nonempty(), 100);
            assert!(!m.is_jumbled());
        }
    }

    #[test]
    fn test_off_diagonal_entry_rejected() {
        // swap one diagonal index off the diagonal
        let starts: Vec<usize> = (0..=50).collect();
        let mut indices: Vec<usize> = (0..50).collect();
        indices[17] = 18;
        let mut m = Matrix::new_sparse(50, 50, starts, indices, vec![1.0f64; 50]).unwrap();
        assert!(!is_diagonal(&mut m, &Context::new(4, 8)));
    }

    #[test]
    fn test_wrong_entry_distribution_rejected() {
        // n entries but two in one vector, none in another
        let mut m = Matrix::new_sparse(
            3,
            3,
            vec![0, 2, 3, 3],
            vec![0, 1, 1],
            vec![1.0f64, 2.0, 3.0],
        )
        .unwrap();
        assert!(!is_diagonal(&mut m, &Context::default()));
    }

    #[test]
    fn test_nonsquare_rejected() {
        let mut m = Matrix::new_sparse(2, 3, vec![0, 1, 2, 2], vec![0, 1], vec![1.0f64, 1.0])
            .unwrap();
        assert!(!is_diagonal(&mut m, &Context::default()));
    }

    #[test]
    fn test_bitmap_rejected_regardless_of_content() {
        // bitmap identity is still not classified diagonal
        let mut m =
            Matrix::new_bitmap(2, 2, vec![1, 0, 0, 1], vec![1.0f64, 0.0, 0.0, 1.0]).unwrap();
        assert!(!is_diagonal(&mut m, &Context::default()));
    }

    #[test]
    fn test_hypersparse_full_diagonal_accepted() {
        let n = 8;
        let m = Matrix::new_hypersparse(
            n,
            n,
            (0..n).collect(),
            (0..=n).collect(),
            (0..n).collect(),
            vec![1.0f64; n],
        )
        .unwrap();
        let mut m = m;
        assert!(is_diagonal(&mut m, &Context::default()));
        assert_eq!(m.nvec_nonempty(), n);
    }

    #[test]
    fn test_hypersparse_missing_vector_rejected() {
        // 3x3 with only vectors 0 and 2 materialized, entries on diagonal
        let mut m = Matrix::new_hypersparse(
            3,
            3,
            vec![0, 2],
            vec![0, 1, 2],
            vec![0, 2],
            vec![1.0f64, 1.0],
        )
        .unwrap();
        assert!(!is_diagonal(&mut m, &Context::default()));
    }

    #[test]
    fn test_entry_count_mismatch_rejected() {
        // square, all on diagonal of the vectors that have entries, but
        // only n-1 entries
        let mut m = Matrix::new_sparse(4, 4, vec![0, 1, 2, 3, 3], vec![0, 1, 2], vec![1.0f64; 3])
            .unwrap();
        assert!(!is_diagonal(&mut m, &Context::default()));
    }
}
