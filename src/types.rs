use serde::{Deserialize, Serialize};

/// A vector key: a fixed-dimensional sequence of 64-bit floats.
///
/// Dimension is set when an index is constructed and every subsequent
/// insert must match it.
pub type Vector = Vec<f64>;

/// Row identifier handed out by the table heap.
///
/// Opaque to everything but the heap: indexes store it verbatim and hand it
/// back from `scan`, executors use it to fetch the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rid(pub u64);

impl std::fmt::Display for Rid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rid#{}", self.0)
    }
}

/// Distance metric for vector comparison.
///
/// All metrics are oriented so that smaller means closer; similarity
/// measures are negated or inverted by the distance kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Euclidean (L2) distance.
    L2,
    /// Negated dot product.
    InnerProduct,
    /// One minus cosine similarity.
    CosineSimilarity,
}

impl std::fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistanceMetric::L2 => write!(f, "l2"),
            DistanceMetric::InnerProduct => write!(f, "inner_product"),
            DistanceMetric::CosineSimilarity => write!(f, "cosine_similarity"),
        }
    }
}

/// Kind of vector index backing a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    /// Inverted file with flat (uncompressed) vector storage.
    IvfFlat,
    /// Hierarchical navigable small world graph.
    Hnsw,
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexKind::IvfFlat => write!(f, "ivf_flat"),
            IndexKind::Hnsw => write!(f, "hnsw"),
        }
    }
}

/// A single cell value in a tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean.
    Boolean(bool),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Double(f64),
    /// Vector of 64-bit floats.
    Vector(Vec<f64>),
}

impl Value {
    /// Numeric view used by comparisons and sort keys.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Vector view used by the index layer.
    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Value::Vector(v) => Some(v),
            _ => None,
        }
    }
}
