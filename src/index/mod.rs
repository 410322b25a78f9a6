//! Vector indexing.
//!
//! Provides the `VectorIndex` trait, the distance kernel, and the two
//! concrete index implementations (IVF-Flat and HNSW) behind a factory
//! keyed by `IndexKind`.

pub mod distance;
pub mod hnsw;
pub mod ivf_flat;
pub mod traits;

pub use hnsw::HnswIndex;
pub use ivf_flat::IvfFlatIndex;
pub use traits::{build_vector_index, VectorIndex};
