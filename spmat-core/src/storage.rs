//! Physical storage representations
//!
//! A matrix is held in exactly one of four mutually exclusive layouts.
//! Each layout's arrays exist only inside its own variant, so accessing a
//! field that is meaningless for the current representation is impossible
//! by construction rather than a runtime invariant to remember.

use alloc::vec::Vec;

/// Representation tag, detached from the per-variant arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum StorageKind {
    /// Fully dense: every position is an explicit entry, no index metadata
    Full = 0,
    /// Dense position grid plus a parallel presence mask
    Bitmap = 1,
    /// Compressed vectors: per-vector start offsets plus entry positions
    Sparse = 2,
    /// Sparse with entirely-empty vectors omitted from the offset array
    Hypersparse = 3,
}

impl core::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StorageKind::Full => write!(f, "full"),
            StorageKind::Bitmap => write!(f, "bitmap"),
            StorageKind::Sparse => write!(f, "sparse"),
            StorageKind::Hypersparse => write!(f, "hypersparse"),
        }
    }
}

/// Index structures for one physical representation
///
/// The value buffer lives on the matrix itself (it is shared by every
/// layout); this union carries only the index metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    /// Entry `(i, j)` lives at value position `j * vlen + i`
    Full,

    /// Same positional grid as `Full`, with `mask[p] != 0` marking the
    /// present entries; `nvals` caches the number of set positions
    Bitmap { mask: Vec<u8>, nvals: usize },

    /// Vector `k` owns entry range `starts[k] .. starts[k + 1]`;
    /// `indices[p]` is the within-vector position of entry `p`.
    /// `jumbled` means indices inside a vector are not guaranteed sorted.
    Sparse {
        starts: Vec<usize>,
        indices: Vec<usize>,
        jumbled: bool,
    },

    /// As `Sparse`, but only the vectors listed in `vec_ids` (strictly
    /// increasing) are materialized; `starts` has `vec_ids.len() + 1`
    /// offsets.
    Hypersparse {
        vec_ids: Vec<usize>,
        starts: Vec<usize>,
        indices: Vec<usize>,
        jumbled: bool,
    },
}

impl Storage {
    /// The representation tag for this layout
    pub fn kind(&self) -> StorageKind {
        match self {
            Storage::Full => StorageKind::Full,
            Storage::Bitmap { .. } => StorageKind::Bitmap,
            Storage::Sparse { .. } => StorageKind::Sparse,
            Storage::Hypersparse { .. } => StorageKind::Hypersparse,
        }
    }
}
