//! Fallible buffer allocation
//!
//! Kernels that grow a matrix allocate through this seam so that
//! allocation failure is a value (`None`) rather than a process abort,
//! and so tests can inject failures at exact allocation points.

use std::cell::Cell;

use spmat_core::MatrixElement;

/// Allocation seam for index and value buffers
///
/// Implementations return `None` on exhaustion; no panic or abort crosses
/// this boundary.
pub trait BufferAllocator {
    /// Allocate a zero-filled index buffer of `len` entries
    fn alloc_indices(&self, len: usize) -> Option<Vec<usize>>;

    /// Allocate a zero-filled value buffer of `len` elements
    fn alloc_values<T: MatrixElement>(&self, len: usize) -> Option<Vec<T>>;
}

/// Global-allocator-backed implementation using fallible reservation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAllocator;

impl BufferAllocator for SystemAllocator {
    fn alloc_indices(&self, len: usize) -> Option<Vec<usize>> {
        zeroed_vec(len, 0usize)
    }

    fn alloc_values<T: MatrixElement>(&self, len: usize) -> Option<Vec<T>> {
        zeroed_vec(len, T::zero())
    }
}

fn zeroed_vec<T: Clone>(len: usize, zero: T) -> Option<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).ok()?;
    v.resize(len, zero);
    Some(v)
}

/// Allocator wrapper that counts requests and fails on demand
///
/// Drives the out-of-memory injection tests: `failing_at(n)` makes the
/// `n`-th request (1-based) report exhaustion, so every allocation point
/// in a kernel can be exercised in turn. `allocations` exposes the
/// bookkeeping for leak-freedom assertions.
#[derive(Debug, Default)]
pub struct CountingAllocator {
    requests: Cell<usize>,
    fail_at: Option<usize>,
}

impl CountingAllocator {
    /// Counting allocator that never fails
    pub fn new() -> Self {
        Self::default()
    }

    /// Counting allocator whose `n`-th request (1-based) fails
    pub fn failing_at(n: usize) -> Self {
        Self {
            requests: Cell::new(0),
            fail_at: Some(n),
        }
    }

    /// Number of requests seen so far, successful or not
    pub fn allocations(&self) -> usize {
        self.requests.get()
    }

    fn admit(&self) -> bool {
        let seen = self.requests.get() + 1;
        self.requests.set(seen);
        self.fail_at != Some(seen)
    }
}

impl BufferAllocator for CountingAllocator {
    fn alloc_indices(&self, len: usize) -> Option<Vec<usize>> {
        if !self.admit() {
            return None;
        }
        SystemAllocator.alloc_indices(len)
    }

    fn alloc_values<T: MatrixElement>(&self, len: usize) -> Option<Vec<T>> {
        if !self.admit() {
            return None;
        }
        SystemAllocator.alloc_values(len)
    }
}
