//! spmat - Sparse Matrix Storage Conversion and Method Selection
//!
//! This crate holds the compute side of the engine: in-place storage
//! conversion, parallel structural analysis, and the cost-model-driven
//! choice between competing transpose algorithms.
//!
//! ## Architecture
//!
//! The workspace follows a representation/kernel separation:
//!
//! - **spmat-core**: the matrix entity, its four mutually exclusive
//!   storage layouts, and pure validation (no parallelism, no I/O)
//! - **spmat**: kernels that read and rewrite those layouts under a
//!   bounded fork-join worker pool
//!
//! ## Quick Start
//!
//! ```rust
//! use spmat::{convert_full_to_sparse, is_diagonal, Context};
//! use spmat::{select_transpose_method, ShapeStats};
//! use spmat_core::Matrix;
//!
//! fn example() -> spmat_core::Result<()> {
//!     let ctx = Context::default();
//!
//!     let mut m = Matrix::new_full(2, 2, vec![1.0, 2.0, 3.0, 4.0])?;
//!     convert_full_to_sparse(&mut m, &ctx)?;
//!     assert!(m.is_sparse());
//!
//!     assert!(!is_diagonal(&mut m, &ctx));
//!
//!     let decision = select_transpose_method(&ShapeStats::of(&m), &ctx);
//!     assert!(!decision.use_builder);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! Every kernel takes an explicit [`Context`]: the maximum worker count,
//! the chunk heuristic that keeps small problems on few threads, and the
//! transpose tuning override. There is no process-global state.

// Re-export the representation layer
pub use spmat_core::{
    // Core entity and layouts
    Matrix, Storage, StorageKind,
    // Element types
    DataType, MatrixElement,
    // Error handling
    Error, Result,
    // Access traits
    MatrixOperations, SparseMatrix,
    // Validation utilities
    checked_entry_count,
};

// Kernel modules
pub mod alloc;
pub mod context;
pub mod convert;
pub mod diagonal;
pub mod transpose;
pub mod tuning;

// Public exports
pub use alloc::{BufferAllocator, CountingAllocator, SystemAllocator};
pub use context::{Context, TransposeOverride, DEFAULT_CHUNK};
pub use convert::{convert_full_to_sparse, convert_full_to_sparse_with};
pub use diagonal::is_diagonal;
pub use transpose::{select_transpose_method, ShapeStats, TransposeDecision};
