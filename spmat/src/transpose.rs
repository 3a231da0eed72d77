//! Transpose method selection
//!
//! A transpose can run as a sort/merge "builder" in O(anz log anz) or as
//! a direct-distribution "bucket" pass in O(anz + vlen + vdim), the
//! latter with sequential, atomic, or replicated-workspace variants.
//! This module is the pure decision function choosing between them; the
//! transpose execution itself lives elsewhere.

use spmat_core::{Matrix, MatrixElement};

use crate::context::{Context, TransposeOverride};
use crate::tuning::{alpha, beta, ceil_log2_plus1};

/// Shape and density statistics the selector consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShapeStats {
    /// Stored entry count
    pub anz: usize,
    /// Materialized vector count
    pub nvec: usize,
    /// Entries per vector
    pub vlen: usize,
    /// Number of vectors
    pub vdim: usize,
}

impl ShapeStats {
    /// Statistics of an existing matrix
    pub fn of<T: MatrixElement>(a: &Matrix<T>) -> Self {
        Self {
            anz: a.entry_count(),
            nvec: a.nvec(),
            vlen: a.vlen(),
            vdim: a.vdim(),
        }
    }
}

/// Outcome of the method selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransposeDecision {
    /// True for the builder method; false for the bucket method
    pub use_builder: bool,
    /// Workspace replicas for the bucket method; 0 when the builder is
    /// chosen. 1 means the sequential or atomic variant, `nthreads`
    /// means the non-atomic replicated variant.
    pub nworkspaces: usize,
    /// Worker threads for the bucket method; 0 when the builder is chosen
    pub nthreads: usize,
}

impl TransposeDecision {
    fn builder() -> Self {
        Self {
            use_builder: true,
            nworkspaces: 0,
            nthreads: 0,
        }
    }

    fn bucket(nworkspaces: usize, nthreads: usize) -> Self {
        Self {
            use_builder: false,
            nworkspaces,
            nthreads,
        }
    }
}

/// Choose a transpose method for the given shape statistics
///
/// Pure function of its inputs: total over every shape (including
/// `anz == 0`) and deterministic. The context's
/// [`TransposeOverride`] bypasses the cost model entirely.
pub fn select_transpose_method(stats: &ShapeStats, ctx: &Context) -> TransposeDecision {
    let anz = stats.anz;
    let vlen = stats.vlen;
    let anzlog = ceil_log2_plus1(anz);
    let mlog = ceil_log2_plus1(vlen);

    // threads for the bucket method, sized by its total relevant work
    let nthreads = ctx.nthreads_for(anz.saturating_add(vlen));

    match ctx.transpose_override() {
        TransposeOverride::BucketSequential => return TransposeDecision::bucket(1, 1),
        TransposeOverride::BucketNonAtomic => return TransposeDecision::bucket(nthreads, nthreads),
        TransposeOverride::Builder => return TransposeDecision::builder(),
        TransposeOverride::None => {}
    }

    //----------------------------------------------------------------
    // select between the atomic and non-atomic bucket variants
    //----------------------------------------------------------------

    let atomics = if nthreads == 1 {
        // sequential bucket method, no atomics needed
        false
    } else if (nthreads as f64) * (vlen as f64) > anz as f64 {
        // replicating one workspace per thread would dwarf the entries
        true
    } else {
        // anzlog - mlog is the log2 of the average vector degree,
        // rounded; at or below the tuned threshold the atomic variant
        // has few enough conflicts to win
        anzlog - mlog <= beta(anzlog)
    };
    let nworkspaces = if atomics { 1 } else { nthreads };

    //----------------------------------------------------------------
    // select between the builder and bucket methods
    //----------------------------------------------------------------

    // each term widens to f64 before the sum so maximal shapes cannot
    // overflow the integer domain
    let bucket_work = (anz as f64 + vlen as f64 + stats.nvec as f64) * alpha(anzlog);
    let builder_work = ((anz as f64) + 1.0).log2() * anz as f64;

    if builder_work < bucket_work {
        TransposeDecision::builder()
    } else {
        // ties favor the bucket method
        TransposeDecision::bucket(nworkspaces, nthreads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(anz: usize, nvec: usize, vlen: usize, vdim: usize) -> ShapeStats {
        ShapeStats {
            anz,
            nvec,
            vlen,
            vdim,
        }
    }

    #[test]
    fn test_empty_matrix_gets_a_decision() {
        let d = select_transpose_method(&stats(0, 0, 0, 0), &Context::default());
        // zero work on both models; the tie goes to bucket
        assert!(!d.use_builder);
        assert_eq!(d.nthreads, 1);
        assert_eq!(d.nworkspaces, 1);
    }

    #[test]
    fn test_maximal_shape_gets_a_decision() {
        // the cost terms exceed usize when summed; the model must widen
        // to f64 first instead of overflowing
        let ctx = Context::new(8, 1024);
        let d = select_transpose_method(&stats(usize::MAX, 1, usize::MAX, 1), &ctx);
        assert!(!d.use_builder);
        assert_eq!(d.nthreads, 8);
        // replicated workspaces would dwarf the entries at this row count
        assert_eq!(d.nworkspaces, 1);
    }

    #[test]
    fn test_small_dense_prefers_bucket() {
        // 100x100 full of entries: builder pays the log factor
        let d = select_transpose_method(&stats(10_000, 100, 100, 100), &Context::new(4, 1024));
        assert!(!d.use_builder);
        assert!(d.nthreads >= 1);
    }

    #[test]
    fn test_tall_hypersparse_prefers_builder() {
        // a billion-row vector space with a thousand entries: the bucket
        // method would touch every row counter
        let d = select_transpose_method(
            &stats(1_000, 1_000, 1_000_000_000, 1_000),
            &Context::new(4, 1024),
        );
        assert!(d.use_builder);
        assert_eq!(d.nworkspaces, 0);
        assert_eq!(d.nthreads, 0);
    }

    #[test]
    fn test_single_thread_is_sequential_bucket() {
        let d = select_transpose_method(&stats(10_000, 100, 100, 100), &Context::sequential());
        assert!(!d.use_builder);
        assert_eq!(d.nthreads, 1);
        assert_eq!(d.nworkspaces, 1);
    }

    #[test]
    fn test_workspace_blowup_forces_atomic() {
        // vlen large relative to anz: replicated workspaces would exceed
        // the entry count, so one shared workspace is used
        let ctx = Context::new(8, 64);
        let d = select_transpose_method(&stats(40_000, 50, 20_000, 50), &ctx);
        assert!(!d.use_builder);
        assert_eq!(d.nthreads, 8);
        assert_eq!(d.nworkspaces, 1);
    }

    #[test]
    fn test_dense_rows_use_replicated_workspaces() {
        // ~2^20 entries over few rows: average degree far above beta, so
        // the non-atomic replicated variant is chosen
        let ctx = Context::new(4, 1024);
        let d = select_transpose_method(&stats(1 << 20, 64, 64, 1 << 14), &ctx);
        assert!(!d.use_builder);
        assert_eq!(d.nthreads, 4);
        assert_eq!(d.nworkspaces, 4);
    }

    #[test]
    fn test_sparse_rows_use_atomic_workspace() {
        // average degree 4 over 2^20 entries: log2 degree is at the
        // beta(21) = 3 threshold, so the atomic variant wins
        let ctx = Context::new(4, 1024);
        let d = select_transpose_method(&stats(1 << 20, 1 << 18, 1 << 18, 1 << 18), &ctx);
        assert!(!d.use_builder);
        assert_eq!(d.nthreads, 4);
        assert_eq!(d.nworkspaces, 1);
    }

    #[test]
    fn test_overrides_bypass_cost_model() {
        let s = stats(1_000, 1_000, 1_000_000_000, 1_000); // would pick builder
        let base = Context::new(4, 64);

        let d = select_transpose_method(
            &s,
            &base.with_transpose_override(TransposeOverride::BucketSequential),
        );
        assert_eq!(d, TransposeDecision::bucket(1, 1));

        let d = select_transpose_method(
            &s,
            &base.with_transpose_override(TransposeOverride::BucketNonAtomic),
        );
        assert!(!d.use_builder);
        assert_eq!(d.nworkspaces, d.nthreads);
        assert!(d.nthreads > 1);

        let tiny = stats(10_000, 100, 100, 100); // would pick bucket
        let d = select_transpose_method(
            &tiny,
            &base.with_transpose_override(TransposeOverride::Builder),
        );
        assert_eq!(d, TransposeDecision::builder());
    }

    #[test]
    fn test_selector_deterministic() {
        let ctx = Context::new(8, 512);
        for &anz in &[0usize, 1, 100, 10_000, 1 << 20] {
            let s = stats(anz, anz.min(500), 500, 500);
            let first = select_transpose_method(&s, &ctx);
            for _ in 0..3 {
                assert_eq!(select_transpose_method(&s, &ctx), first);
            }
        }
    }
}
