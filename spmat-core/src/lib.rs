#![no_std]

//! spmat-core - Sparse Matrix Representation and Invariants
//!
//! This crate provides the core matrix entity, its mutually exclusive
//! storage representations, element type constraints, and pure validation
//! helpers. It performs no parallelism and no I/O; the compute kernels
//! live in the `spmat` crate.

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod element;
pub mod error;
#[cfg(feature = "alloc")]
pub mod matrix;
#[cfg(feature = "alloc")]
pub mod storage;
pub mod traits;
pub mod validation;

pub use element::{DataType, MatrixElement};
pub use error::{Error, Result};
#[cfg(feature = "alloc")]
pub use matrix::Matrix;
#[cfg(feature = "alloc")]
pub use storage::{Storage, StorageKind};
#[cfg(feature = "alloc")]
pub use traits::MatrixOperations;
pub use traits::SparseMatrix;
pub use validation::checked_entry_count;
