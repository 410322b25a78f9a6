//! The common vector-index contract and the factory over index kinds.

use crate::error::{Result, SkiffError};
use crate::index::hnsw::HnswIndex;
use crate::index::ivf_flat::IvfFlatIndex;
use crate::types::{DistanceMetric, IndexKind, Rid, Vector};

/// Common contract for approximate-nearest-neighbor indexes.
///
/// An index is created empty, populated once by `build` (bulk) or
/// incrementally by `insert`, and then read by `scan`. There is no
/// deletion and no persistence; state lives for the process lifetime.
pub trait VectorIndex {
    /// Bulk-load the index from initial table contents.
    ///
    /// Called at most once, before any `scan`. May leave the index empty
    /// when the implementation has stricter preconditions (IVF-Flat skips
    /// the build when there are fewer rows than clusters).
    fn build(&mut self, initial_data: Vec<(Vector, Rid)>);

    /// Insert a single vector. Duplicates are accepted.
    fn insert(&mut self, key: &[f64], rid: Rid);

    /// Return up to `limit` RIDs in non-decreasing distance order under the
    /// index's metric. Fewer than `limit` results only occur when the index
    /// holds fewer than `limit` vectors.
    fn scan(&self, query: &[f64], limit: usize) -> Vec<Rid>;
}

/// Construct an index of the given kind from a typed option bag.
///
/// Unknown option keys are ignored; missing required keys fail construction
/// with `MissingIndexOption`.
pub fn build_vector_index(
    kind: IndexKind,
    metric: DistanceMetric,
    options: &[(String, i64)],
) -> Result<Box<dyn VectorIndex>> {
    match kind {
        IndexKind::IvfFlat => Ok(Box::new(IvfFlatIndex::new(metric, options)?)),
        IndexKind::Hnsw => Ok(Box::new(HnswIndex::new(metric, options)?)),
    }
}

/// Look up a required integer option, failing with the index kind and key
/// that were missing.
pub(crate) fn require_option(
    options: &[(String, i64)],
    kind: IndexKind,
    key: &str,
) -> Result<i64> {
    options
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| *v)
        .ok_or_else(|| SkiffError::MissingIndexOption {
            kind: kind.to_string(),
            option: key.to_string(),
        })
}
