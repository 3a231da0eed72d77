//! The multi-format matrix entity
//!
//! A `Matrix` pairs one value buffer with one of the four physical index
//! layouts in [`Storage`]. The logical shape is `vlen` entries per vector
//! by `vdim` vectors, with a fixed orientation convention: vectors are
//! columns, so `nrows == vlen` and `ncols == vdim`.
//!
//! Constructors validate every structural invariant up front; the compute
//! kernels in the `spmat` crate then rely on those invariants through
//! `debug_assert!` contracts rather than re-validating on every call.

use alloc::vec::Vec;

use crate::element::{DataType, MatrixElement};
use crate::error::{Error, Result};
use crate::storage::{Storage, StorageKind};
use crate::traits::{MatrixOperations, SparseMatrix};
use crate::validation::{
    checked_entry_count, indices_are_in_bounds, starts_are_monotone, vec_ids_are_valid,
    vectors_are_sorted,
};

/// Sparse/dense matrix with one of four mutually exclusive representations
#[derive(Debug, Clone)]
pub struct Matrix<T: MatrixElement> {
    /// Entries per vector (row count)
    vlen: usize,
    /// Number of vectors (column count)
    vdim: usize,
    /// Capacity of the value buffer; zero only while allocation is deferred
    nzmax: usize,
    /// Value buffer, `nzmax` elements
    values: Vec<T>,
    /// Index layout for the active representation
    storage: Storage,
    /// Cached count of vectors with at least one entry; never overstates
    /// the truth but may understate it
    nvec_nonempty: usize,
    /// Entries marked deleted but not yet compacted
    nzombies: usize,
    /// Insertions batched but not yet merged
    npending: usize,
}

impl<T: MatrixElement> Matrix<T> {
    //--------------------------------------------------------------------
    // constructors
    //--------------------------------------------------------------------

    /// Create a full matrix; `values` holds every position in column order
    pub fn new_full(vlen: usize, vdim: usize, values: Vec<T>) -> Result<Self> {
        let m = Self {
            vlen,
            vdim,
            nzmax: values.len(),
            values,
            storage: Storage::Full,
            nvec_nonempty: if vlen > 0 { vdim } else { 0 },
            nzombies: 0,
            npending: 0,
        };
        m.check()?;
        Ok(m)
    }

    /// Create an empty full matrix with a deferred value buffer
    ///
    /// Only shapes with no positions qualify (`vlen == 0` or `vdim == 0`);
    /// this is the capacity-zero state the full-to-sparse converter
    /// accepts alongside proper full matrices.
    pub fn new_empty(vlen: usize, vdim: usize) -> Result<Self> {
        if checked_entry_count(vlen, vdim)? != 0 {
            return Err(Error::InvalidStorage);
        }
        Self::new_full(vlen, vdim, Vec::new())
    }

    /// Create a sparse matrix from compressed-vector arrays
    ///
    /// Vectors with unsorted indices are accepted; the matrix is then
    /// flagged jumbled rather than rejected.
    pub fn new_sparse(
        vlen: usize,
        vdim: usize,
        starts: Vec<usize>,
        indices: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self> {
        let nvec_nonempty = count_nonempty(&starts);
        let jumbled = !vectors_are_sorted(&starts, &indices);
        let m = Self {
            vlen,
            vdim,
            nzmax: values.len(),
            values,
            storage: Storage::Sparse {
                starts,
                indices,
                jumbled,
            },
            nvec_nonempty,
            nzombies: 0,
            npending: 0,
        };
        m.check()?;
        Ok(m)
    }

    /// Create a hypersparse matrix; `vec_ids` lists the materialized
    /// vectors in strictly increasing order
    pub fn new_hypersparse(
        vlen: usize,
        vdim: usize,
        vec_ids: Vec<usize>,
        starts: Vec<usize>,
        indices: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self> {
        let nvec_nonempty = count_nonempty(&starts);
        let jumbled = !vectors_are_sorted(&starts, &indices);
        let m = Self {
            vlen,
            vdim,
            nzmax: values.len(),
            values,
            storage: Storage::Hypersparse {
                vec_ids,
                starts,
                indices,
                jumbled,
            },
            nvec_nonempty,
            nzombies: 0,
            npending: 0,
        };
        m.check()?;
        Ok(m)
    }

    /// Create a bitmap matrix; `mask[p] != 0` marks position `p` present
    pub fn new_bitmap(vlen: usize, vdim: usize, mask: Vec<u8>, values: Vec<T>) -> Result<Self> {
        // the mask length must match the shape before any per-vector slicing
        if mask.len() != checked_entry_count(vlen, vdim)? {
            return Err(Error::InvalidStorage);
        }
        let nvals = mask.iter().filter(|&&b| b != 0).count();
        let nvec_nonempty = if vlen == 0 {
            0
        } else {
            mask.chunks(vlen)
                .filter(|v| v.iter().any(|&b| b != 0))
                .count()
        };
        let m = Self {
            vlen,
            vdim,
            nzmax: values.len(),
            values,
            storage: Storage::Bitmap { mask, nvals },
            nvec_nonempty,
            nzombies: 0,
            npending: 0,
        };
        m.check()?;
        Ok(m)
    }

    //--------------------------------------------------------------------
    // shape and representation
    //--------------------------------------------------------------------

    /// Entries per vector
    pub fn vlen(&self) -> usize {
        self.vlen
    }

    /// Number of vectors
    pub fn vdim(&self) -> usize {
        self.vdim
    }

    /// Row count under the fixed orientation (vectors are columns)
    pub fn nrows(&self) -> usize {
        self.vlen
    }

    /// Column count under the fixed orientation
    pub fn ncols(&self) -> usize {
        self.vdim
    }

    /// Capacity of the value buffer
    pub fn nzmax(&self) -> usize {
        self.nzmax
    }

    /// The active representation tag
    pub fn kind(&self) -> StorageKind {
        self.storage.kind()
    }

    pub fn is_full(&self) -> bool {
        matches!(self.storage, Storage::Full)
    }

    pub fn is_bitmap(&self) -> bool {
        matches!(self.storage, Storage::Bitmap { .. })
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self.storage, Storage::Sparse { .. })
    }

    pub fn is_hypersparse(&self) -> bool {
        matches!(self.storage, Storage::Hypersparse { .. })
    }

    /// Element type tag of the value buffer
    pub fn dtype(&self) -> DataType {
        T::data_type()
    }

    /// Number of materialized vectors
    ///
    /// Equals `vdim` for every representation except hypersparse, which
    /// materializes only the vectors in its id list.
    pub fn nvec(&self) -> usize {
        match &self.storage {
            Storage::Hypersparse { vec_ids, .. } => vec_ids.len(),
            _ => self.vdim,
        }
    }

    /// Number of stored entries
    pub fn entry_count(&self) -> usize {
        match &self.storage {
            Storage::Full => self.vlen * self.vdim,
            Storage::Bitmap { nvals, .. } => *nvals,
            Storage::Sparse { starts, .. } | Storage::Hypersparse { starts, .. } => {
                starts.last().copied().unwrap_or(0)
            }
        }
    }

    /// Cached lower bound on the number of non-empty vectors
    pub fn nvec_nonempty(&self) -> usize {
        self.nvec_nonempty
    }

    /// True if indices within some vector may be unsorted
    pub fn is_jumbled(&self) -> bool {
        match &self.storage {
            Storage::Sparse { jumbled, .. } | Storage::Hypersparse { jumbled, .. } => *jumbled,
            _ => false,
        }
    }

    /// Count of zombie entries awaiting compaction
    pub fn nzombies(&self) -> usize {
        self.nzombies
    }

    /// Count of pending insertions awaiting a merge
    pub fn npending(&self) -> usize {
        self.npending
    }

    /// The value buffer
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Start offsets and entry positions for the compressed layouts
    ///
    /// `None` for full and bitmap matrices.
    pub fn sparse_layout(&self) -> Option<(&[usize], &[usize])> {
        match &self.storage {
            Storage::Sparse {
                starts, indices, ..
            }
            | Storage::Hypersparse {
                starts, indices, ..
            } => Some((starts, indices)),
            _ => None,
        }
    }

    //--------------------------------------------------------------------
    // controlled mutation
    //--------------------------------------------------------------------

    /// Adopt a freshly allocated value buffer for a matrix whose
    /// allocation was deferred
    pub fn adopt_values(&mut self, buf: Vec<T>) {
        debug_assert!(self.values.is_empty() && self.nzmax == 0);
        self.nzmax = buf.len();
        self.values = buf;
    }

    /// Replace the index structures with a sparse layout, in place
    ///
    /// The value buffer is untouched. `starts` must have `vdim + 1`
    /// offsets and `indices` one position per entry; the caller has
    /// already populated both.
    pub fn install_sparse(&mut self, starts: Vec<usize>, indices: Vec<usize>) {
        debug_assert_eq!(starts.len(), self.vdim + 1);
        debug_assert_eq!(indices.len(), starts.last().copied().unwrap_or(0));
        self.nvec_nonempty = count_nonempty(&starts);
        self.storage = Storage::Sparse {
            starts,
            indices,
            jumbled: false,
        };
    }

    /// Tighten the non-empty-vector hint to an exact count
    pub fn tighten_nvec_nonempty(&mut self, n: usize) {
        debug_assert!(n <= self.nvec());
        self.nvec_nonempty = n;
    }

    /// Record that indices within every vector are sorted
    pub fn mark_sorted(&mut self) {
        if let Storage::Sparse { jumbled, .. } | Storage::Hypersparse { jumbled, .. } =
            &mut self.storage
        {
            *jumbled = false;
        }
    }

    /// Drop the sorted-indices guarantee
    pub fn mark_jumbled(&mut self) {
        if let Storage::Sparse { jumbled, .. } | Storage::Hypersparse { jumbled, .. } =
            &mut self.storage
        {
            *jumbled = true;
        }
    }

    /// Bookkeeping hook for the (out of scope) mutation layer
    pub fn record_zombies(&mut self, n: usize) {
        self.nzombies = n;
    }

    /// Bookkeeping hook for the (out of scope) mutation layer
    pub fn record_pending(&mut self, n: usize) {
        self.npending = n;
    }

    /// Release every owned buffer after a failed conversion
    ///
    /// The shape is kept but the matrix is no longer usable: `check`
    /// reports `InvalidStorage` for any non-degenerate shape, and the
    /// caller must discard or rebuild it.
    pub fn discard(&mut self) {
        self.values = Vec::new();
        self.nzmax = 0;
        self.storage = Storage::Full;
        self.nvec_nonempty = 0;
    }

    //--------------------------------------------------------------------
    // invariant audit
    //--------------------------------------------------------------------

    /// Verify every structural invariant of the active representation
    pub fn check(&self) -> Result<()> {
        let anz = checked_entry_count(self.vlen, self.vdim)?;
        if self.values.len() != self.nzmax {
            return Err(Error::InvalidStorage);
        }
        if self.nvec_nonempty > self.nvec() {
            return Err(Error::InvalidStorage);
        }
        match &self.storage {
            Storage::Full => {
                // deferred allocation is valid only for an empty shape
                if self.nzmax < anz && !(self.nzmax == 0 && anz == 0) {
                    return Err(Error::InvalidStorage);
                }
            }
            Storage::Bitmap { mask, nvals } => {
                if mask.len() != anz || self.nzmax < anz {
                    return Err(Error::InvalidStorage);
                }
                if *nvals != mask.iter().filter(|&&b| b != 0).count() {
                    return Err(Error::InvalidStorage);
                }
            }
            Storage::Sparse {
                starts,
                indices,
                jumbled,
            } => {
                if starts.len() != self.vdim + 1 || starts[0] != 0 {
                    return Err(Error::InvalidStorage);
                }
                check_compressed(starts, indices, self.vlen, self.nzmax, *jumbled)?;
            }
            Storage::Hypersparse {
                vec_ids,
                starts,
                indices,
                jumbled,
            } => {
                if !vec_ids_are_valid(vec_ids, self.vdim) {
                    return Err(Error::InvalidStorage);
                }
                if starts.len() != vec_ids.len() + 1 || starts[0] != 0 {
                    return Err(Error::InvalidStorage);
                }
                check_compressed(starts, indices, self.vlen, self.nzmax, *jumbled)?;
            }
        }
        Ok(())
    }
}

/// Shared audit for the two compressed layouts
fn check_compressed(
    starts: &[usize],
    indices: &[usize],
    vlen: usize,
    nzmax: usize,
    jumbled: bool,
) -> Result<()> {
    if !starts_are_monotone(starts) {
        return Err(Error::InvalidStorage);
    }
    let nnz = starts.last().copied().unwrap_or(0);
    if indices.len() != nnz || nnz > nzmax {
        return Err(Error::InvalidStorage);
    }
    if !indices_are_in_bounds(indices, vlen) {
        return Err(Error::IndexOutOfBounds);
    }
    // the cleared jumbled hint is a promise index-consuming kernels rely on
    if !jumbled && !vectors_are_sorted(starts, indices) {
        return Err(Error::InvalidStorage);
    }
    Ok(())
}

fn count_nonempty(starts: &[usize]) -> usize {
    starts.windows(2).filter(|w| w[1] > w[0]).count()
}

impl<T: MatrixElement> SparseMatrix for Matrix<T> {
    type Element = T;

    fn get_element(&self, row: usize, col: usize) -> Option<T> {
        if row >= self.vlen || col >= self.vdim {
            return None;
        }
        match &self.storage {
            Storage::Full => self.values.get(col * self.vlen + row).copied(),
            Storage::Bitmap { mask, .. } => {
                let p = col * self.vlen + row;
                if mask[p] != 0 {
                    self.values.get(p).copied()
                } else {
                    None
                }
            }
            Storage::Sparse {
                starts, indices, ..
            } => probe_vector(starts, indices, &self.values, col, row),
            Storage::Hypersparse {
                vec_ids,
                starts,
                indices,
                ..
            } => {
                let k = vec_ids.binary_search(&col).ok()?;
                probe_vector(starts, indices, &self.values, k, row)
            }
        }
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    fn nnz(&self) -> usize {
        self.entry_count()
    }
}

/// Linear probe of one compressed vector; correct whether or not the
/// vector's indices are sorted
fn probe_vector<T: MatrixElement>(
    starts: &[usize],
    indices: &[usize],
    values: &[T],
    k: usize,
    row: usize,
) -> Option<T> {
    for p in starts[k]..starts[k + 1] {
        if indices[p] == row {
            return values.get(p).copied();
        }
    }
    None
}

impl<T: MatrixElement> MatrixOperations for Matrix<T> {
    fn get_row(&self, row_index: usize) -> Vec<T> {
        (0..self.vdim)
            .filter_map(|j| self.get_element(row_index, j))
            .collect()
    }

    fn get_col(&self, col_index: usize) -> Vec<T> {
        if col_index >= self.vdim {
            return Vec::new();
        }
        match &self.storage {
            Storage::Full => {
                let base = col_index * self.vlen;
                self.values[base..base + self.vlen].to_vec()
            }
            Storage::Bitmap { mask, .. } => {
                let base = col_index * self.vlen;
                (0..self.vlen)
                    .filter(|&i| mask[base + i] != 0)
                    .map(|i| self.values[base + i])
                    .collect()
            }
            Storage::Sparse { starts, .. } => {
                self.values[starts[col_index]..starts[col_index + 1]].to_vec()
            }
            Storage::Hypersparse {
                vec_ids, starts, ..
            } => match vec_ids.binary_search(&col_index) {
                Ok(k) => self.values[starts[k]..starts[k + 1]].to_vec(),
                Err(_) => Vec::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_full_construction() {
        let m = Matrix::new_full(2, 3, vec![1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(m.kind(), StorageKind::Full);
        assert_eq!(m.dimensions(), (2, 3));
        assert_eq!(m.nnz(), 6);
        assert_eq!(m.get_element(1, 2), Some(6.0));
        assert_eq!(m.get_element(2, 0), None);
        assert_eq!(m.nvec_nonempty(), 3);
    }

    #[test]
    fn test_full_rejects_short_values() {
        assert_eq!(
            Matrix::new_full(2, 3, vec![0.0f64; 5]).unwrap_err(),
            Error::InvalidStorage
        );
    }

    #[test]
    fn test_empty_full_defers_values() {
        let m = Matrix::<f64>::new_empty(0, 4).unwrap();
        assert!(m.is_full());
        assert_eq!(m.nzmax(), 0);
        assert_eq!(m.nnz(), 0);
        assert!(Matrix::<f64>::new_empty(2, 2).is_err());
    }

    #[test]
    fn test_sparse_construction() {
        // 3x3 with entries (0,0), (1,1), (2,1)
        let m = Matrix::new_sparse(3, 3, vec![0, 1, 3, 3], vec![0, 1, 2], vec![1.0f64, 2.0, 3.0])
            .unwrap();
        assert_eq!(m.nnz(), 3);
        assert_eq!(m.nvec(), 3);
        assert_eq!(m.nvec_nonempty(), 2);
        assert!(!m.is_jumbled());
        assert_eq!(m.get_element(2, 1), Some(3.0));
        assert_eq!(m.get_element(2, 2), None);
        assert_eq!(m.get_col(1), vec![2.0, 3.0]);
    }

    #[test]
    fn test_sparse_rejects_bad_structure() {
        // non-monotone starts
        assert!(Matrix::new_sparse(3, 2, vec![0, 2, 1], vec![0, 1], vec![1.0f64, 2.0]).is_err());
        // index out of bounds
        assert_eq!(
            Matrix::new_sparse(2, 1, vec![0, 1], vec![2], vec![1.0f64]).unwrap_err(),
            Error::IndexOutOfBounds
        );
        // wrong starts length
        assert!(Matrix::new_sparse(2, 2, vec![0, 0], vec![], Vec::<f64>::new()).is_err());
    }

    #[test]
    fn test_hypersparse_construction() {
        // 4x4 with vectors 1 and 3 materialized
        let m = Matrix::new_hypersparse(
            4,
            4,
            vec![1, 3],
            vec![0, 1, 2],
            vec![2, 0],
            vec![9.0f64, 7.0],
        )
        .unwrap();
        assert_eq!(m.nvec(), 2);
        assert_eq!(m.nnz(), 2);
        assert_eq!(m.get_element(2, 1), Some(9.0));
        assert_eq!(m.get_element(0, 3), Some(7.0));
        assert_eq!(m.get_element(0, 0), None);
        assert!(m.get_col(2).is_empty());
    }

    #[test]
    fn test_hypersparse_rejects_unsorted_ids() {
        assert!(Matrix::new_hypersparse(
            4,
            4,
            vec![3, 1],
            vec![0, 1, 2],
            vec![0, 0],
            vec![1.0f64, 1.0]
        )
        .is_err());
    }

    #[test]
    fn test_bitmap_construction() {
        let m = Matrix::new_bitmap(2, 2, vec![1, 0, 0, 1], vec![5.0f64, 0.0, 0.0, 8.0]).unwrap();
        assert_eq!(m.nnz(), 2);
        assert_eq!(m.nvec_nonempty(), 2);
        assert_eq!(m.get_element(0, 0), Some(5.0));
        assert_eq!(m.get_element(1, 0), None);
        assert_eq!(m.get_row(1), vec![8.0]);
    }

    #[test]
    fn test_bitmap_rejects_wrong_mask_length() {
        // short mask: an error, not an out-of-bounds slice
        assert_eq!(
            Matrix::new_bitmap(2, 2, vec![1, 0, 0], vec![5.0f64, 0.0, 0.0, 8.0]).unwrap_err(),
            Error::InvalidStorage
        );
        assert!(Matrix::new_bitmap(2, 2, vec![1; 5], vec![0.0f64; 5]).is_err());
    }

    #[test]
    fn test_jumbled_detected_and_probed() {
        // unsorted vector is accepted but flagged jumbled
        let m =
            Matrix::new_sparse(3, 1, vec![0, 3], vec![2, 0, 1], vec![1.0f64, 2.0, 3.0]).unwrap();
        assert!(m.is_jumbled());
        assert_eq!(m.get_element(0, 0), Some(2.0));
        assert_eq!(m.get_element(2, 0), Some(1.0));
        assert!(m.check().is_ok());
    }

    #[test]
    fn test_jumbled_hint_round_trip() {
        let mut m = Matrix::new_sparse(3, 1, vec![0, 2], vec![0, 2], vec![1.0f64, 2.0]).unwrap();
        assert!(!m.is_jumbled());
        m.mark_jumbled();
        assert!(m.is_jumbled());
        m.mark_sorted();
        assert!(!m.is_jumbled());
        assert!(m.check().is_ok());
    }

    #[test]
    fn test_discard_leaves_unusable_state() {
        let mut m = Matrix::new_full(2, 2, vec![1.0f64; 4]).unwrap();
        assert!(m.check().is_ok());
        m.discard();
        assert_eq!(m.nzmax(), 0);
        assert!(m.values().is_empty());
        assert!(m.check().is_err());
    }

    #[test]
    fn test_hint_never_overstates_after_tighten() {
        let mut m =
            Matrix::new_sparse(3, 3, vec![0, 1, 1, 2], vec![0, 2], vec![1.0f64, 2.0]).unwrap();
        assert_eq!(m.nvec_nonempty(), 2);
        m.tighten_nvec_nonempty(1);
        assert_eq!(m.nvec_nonempty(), 1);
        assert!(m.check().is_ok());
    }
}
