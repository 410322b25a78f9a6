//! IVF-Flat index implementation.
//!
//! An Inverted File index with flat (uncompressed) vector storage.
//! Vectors are partitioned into clusters via k-means, and at search time
//! only the `probe_lists` closest clusters are scanned.
//!
//! Cluster assignment and centroid ranking always use L2; the configured
//! metric only ranks candidates inside the probed buckets. Recall under
//! non-L2 metrics therefore depends on how closely the metrics agree
//! geometrically.

mod kmeans;

use tracing::{debug, info, warn};

use crate::error::{Result, SkiffError};
use crate::index::distance::{compute_distance, l2_distance};
use crate::index::traits::{require_option, VectorIndex};
use crate::types::{DistanceMetric, IndexKind, Rid, Vector};

/// In-memory IVF-Flat index.
#[derive(Debug)]
pub struct IvfFlatIndex {
    metric: DistanceMetric,
    /// Number of clusters produced by `build`.
    lists: usize,
    /// Clusters probed per scan.
    probe_lists: usize,
    /// Cluster centers. Empty until a successful build.
    centroids: Vec<Vector>,
    /// `buckets[i]` holds the vectors assigned to `centroids[i]`.
    buckets: Vec<Vec<(Vector, Rid)>>,
}

impl IvfFlatIndex {
    /// Parse options and create an empty index.
    ///
    /// Requires `lists >= 1` and `1 <= probe_lists <= lists`; both options
    /// must be present.
    pub fn new(metric: DistanceMetric, options: &[(String, i64)]) -> Result<Self> {
        let kind = IndexKind::IvfFlat;
        let lists = require_option(options, kind, "lists")?;
        let probe_lists = require_option(options, kind, "probe_lists")?;

        if lists < 1 {
            return Err(SkiffError::InvalidIndexOption {
                kind: kind.to_string(),
                option: "lists".into(),
                value: lists,
                reason: "must be at least 1".into(),
            });
        }
        if probe_lists < 1 || probe_lists > lists {
            return Err(SkiffError::InvalidIndexOption {
                kind: kind.to_string(),
                option: "probe_lists".into(),
                value: probe_lists,
                reason: "must be between 1 and lists".into(),
            });
        }

        Ok(Self {
            metric,
            lists: lists as usize,
            probe_lists: probe_lists as usize,
            centroids: Vec::new(),
            buckets: Vec::new(),
        })
    }

    /// Number of clusters currently materialized (0 before build).
    pub fn num_clusters(&self) -> usize {
        self.centroids.len()
    }

    /// Total vectors held across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indexes of the `count` centroids closest to `query` under L2,
    /// ordered by ascending distance.
    fn nearest_centroids(&self, query: &[f64], count: usize) -> Vec<usize> {
        let mut ranked: Vec<(usize, f64)> = self
            .centroids
            .iter()
            .enumerate()
            .map(|(i, c)| (i, l2_distance(query, c)))
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked.into_iter().take(count).map(|(i, _)| i).collect()
    }
}

impl VectorIndex for IvfFlatIndex {
    fn build(&mut self, initial_data: Vec<(Vector, Rid)>) {
        if initial_data.len() < self.lists {
            warn!(
                rows = initial_data.len(),
                lists = self.lists,
                "not enough rows to cluster, leaving IVF index empty"
            );
            return;
        }

        let sampled = kmeans::sample_initial_centroids(&initial_data, self.lists);
        self.centroids = kmeans::train_centroids(&initial_data, sampled);

        self.buckets = vec![Vec::new(); self.lists];
        for (vec, rid) in initial_data {
            if let Some(idx) = kmeans::nearest_centroid(&vec, &self.centroids) {
                self.buckets[idx].push((vec, rid));
            }
        }

        info!(
            lists = self.lists,
            vectors = self.len(),
            "IVF index built"
        );
    }

    fn insert(&mut self, key: &[f64], rid: Rid) {
        match kmeans::nearest_centroid(key, &self.centroids) {
            Some(idx) => self.buckets[idx].push((key.to_vec(), rid)),
            None => {
                // Build was skipped (or never ran), so there is no bucket to
                // place the entry in.
                warn!(%rid, "insert into unbuilt IVF index dropped");
            }
        }
    }

    fn scan(&self, query: &[f64], limit: usize) -> Vec<Rid> {
        if self.centroids.is_empty() || limit == 0 {
            return Vec::new();
        }

        let probes = self.nearest_centroids(query, self.probe_lists.min(self.centroids.len()));
        debug!(probes = ?probes, "probing IVF clusters");

        let mut candidates: Vec<(f64, Rid)> = Vec::new();
        for idx in probes {
            for (vec, rid) in &self.buckets[idx] {
                candidates.push((compute_distance(query, vec, self.metric), *rid));
            }
        }

        candidates.sort_by(|a, b| a.0.total_cmp(&b.0));
        candidates
            .into_iter()
            .take(limit)
            .map(|(_, rid)| rid)
            .collect()
    }
}
