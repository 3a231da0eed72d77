//! Per-call parallelism policy
//!
//! Every kernel takes an explicit [`Context`] carrying the maximum worker
//! count, the chunk-size heuristic, and the transpose tuning override.
//! Nothing here is process-global: tests construct their own contexts and
//! cannot contaminate each other.

use core::ops::Range;

/// Work units one thread should own before another thread is worth waking
pub const DEFAULT_CHUNK: usize = 64 * 1024;

/// Diagnostic override for the transpose method selector
///
/// Bypasses the cost model entirely; intended for testing and
/// benchmarking, not production decision-making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransposeOverride {
    /// No override: use the cost model
    #[default]
    None,
    /// Force the bucket method, one thread, one workspace
    BucketSequential,
    /// Force the bucket method with one replicated workspace per thread
    BucketNonAtomic,
    /// Force the builder method
    Builder,
}

/// Parallelism budget and tuning knobs for one kernel invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    nthreads_max: usize,
    chunk: usize,
    transpose_override: TransposeOverride,
}

impl Context {
    /// Context with an explicit thread cap and chunk size
    ///
    /// Both are clamped to at least 1.
    pub fn new(nthreads_max: usize, chunk: usize) -> Self {
        Self {
            nthreads_max: nthreads_max.max(1),
            chunk: chunk.max(1),
            transpose_override: TransposeOverride::None,
        }
    }

    /// Single-threaded context
    pub fn sequential() -> Self {
        Self::new(1, DEFAULT_CHUNK)
    }

    /// Replace the transpose override
    pub fn with_transpose_override(mut self, ovr: TransposeOverride) -> Self {
        self.transpose_override = ovr;
        self
    }

    /// Maximum number of worker threads this context permits
    pub fn nthreads_max(&self) -> usize {
        self.nthreads_max
    }

    /// Chunk-size heuristic in work units
    pub fn chunk(&self) -> usize {
        self.chunk
    }

    /// Active transpose override
    pub fn transpose_override(&self) -> TransposeOverride {
        self.transpose_override
    }

    /// Number of threads for a problem of the given size
    ///
    /// One thread per `chunk` units of work, clamped to `[1,
    /// nthreads_max]`. Work of size zero still gets one thread, and the
    /// result is non-decreasing in `work`.
    pub fn nthreads_for(&self, work: usize) -> usize {
        if self.nthreads_max <= 1 {
            return 1;
        }
        (work / self.chunk).clamp(1, self.nthreads_max)
    }

    /// The slice of `0..n` owned by task `tid` out of `ntasks`
    ///
    /// Contiguous, exhaustive, and balanced to within one element.
    pub fn partition(n: usize, tid: usize, ntasks: usize) -> Range<usize> {
        debug_assert!(ntasks > 0 && tid < ntasks);
        (tid * n / ntasks)..((tid + 1) * n / ntasks)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(rayon::current_num_threads(), DEFAULT_CHUNK)
    }
}
