//! Abstract matrix interfaces
//!
//! Format-agnostic access traits. These are pure interfaces; the concrete
//! `Matrix` entity in this crate implements them, and downstream crates
//! may implement them for their own storage.

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use crate::element::MatrixElement;

/// Core sparse matrix trait for format-agnostic access
pub trait SparseMatrix {
    /// The element type stored in this matrix
    type Element: MatrixElement;

    /// Get an element at the specified position
    ///
    /// Returns `None` if the position holds no stored entry or is out of
    /// bounds. Full and bitmap layouts store explicit entries, so a stored
    /// numeric zero is still `Some`.
    fn get_element(&self, row: usize, col: usize) -> Option<Self::Element>;

    /// Get matrix dimensions as (rows, cols)
    fn dimensions(&self) -> (usize, usize);

    /// Get the number of stored entries
    fn nnz(&self) -> usize;
}

/// Extension trait for row/column extraction (requires alloc)
#[cfg(feature = "alloc")]
pub trait MatrixOperations: SparseMatrix {
    /// Get all stored entries in a row, in vector order
    fn get_row(&self, row_index: usize) -> Vec<Self::Element>;

    /// Get all stored entries in a column, in stored order
    ///
    /// For jumbled sparse vectors the stored order may differ from row
    /// order.
    fn get_col(&self, col_index: usize) -> Vec<Self::Element>;
}
