//! Centroid training for the IVF-Flat index.
//!
//! Initial centroids are a uniform random sample of the input, refined by
//! Lloyd iterations for a fixed budget. Assignment always uses L2: the
//! arithmetic-mean update step is only well-defined for that metric, so
//! clustering is decoupled from the index's query metric.

use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::index::distance::l2_distance;
use crate::types::{Rid, Vector};

/// Fixed Lloyd iteration budget. There is no convergence early-exit.
pub(crate) const LLOYD_ITERATIONS: usize = 500;

/// Index of the centroid nearest to `vec` under L2.
///
/// Returns `None` when there are no centroids.
pub(crate) fn nearest_centroid(vec: &[f64], centroids: &[Vector]) -> Option<usize> {
    let mut best_idx = None;
    let mut best_dist = f64::MAX;
    for (i, centroid) in centroids.iter().enumerate() {
        let d = l2_distance(vec, centroid);
        if d < best_dist {
            best_dist = d;
            best_idx = Some(i);
        }
    }
    best_idx
}

/// Uniform random sample of `num_samples` distinct vectors from `data`,
/// drawn without replacement by shuffling an index array.
///
/// The caller guarantees `data.len() >= num_samples`.
pub(crate) fn sample_initial_centroids(
    data: &[(Vector, Rid)],
    num_samples: usize,
) -> Vec<Vector> {
    let mut rng = rand::thread_rng();
    let mut indices: Vec<usize> = (0..data.len()).collect();
    indices.shuffle(&mut rng);
    indices
        .iter()
        .take(num_samples)
        .map(|&i| data[i].0.clone())
        .collect()
}

/// One Lloyd step: assign every point to its nearest centroid under L2,
/// then replace each centroid with the mean of its assigned vectors.
///
/// A centroid whose cluster is empty keeps its previous position.
fn lloyd_step(data: &[(Vector, Rid)], centroids: &[Vector]) -> Vec<Vector> {
    let k = centroids.len();
    let dim = centroids[0].len();
    let mut sums = vec![vec![0.0f64; dim]; k];
    let mut counts = vec![0usize; k];

    for (vec, _) in data {
        // Assignment can only fail on an empty centroid list, which the
        // caller rules out.
        if let Some(idx) = nearest_centroid(vec, centroids) {
            counts[idx] += 1;
            for d in 0..dim {
                sums[idx][d] += vec[d];
            }
        }
    }

    let mut next = Vec::with_capacity(k);
    for (i, mut sum) in sums.into_iter().enumerate() {
        if counts[i] == 0 {
            next.push(centroids[i].clone());
            continue;
        }
        let inv = 1.0 / counts[i] as f64;
        for val in sum.iter_mut() {
            *val *= inv;
        }
        next.push(sum);
    }
    next
}

/// Refine sampled centroids by running the full Lloyd budget.
pub(crate) fn train_centroids(
    data: &[(Vector, Rid)],
    mut centroids: Vec<Vector>,
) -> Vec<Vector> {
    info!(
        n = data.len(),
        k = centroids.len(),
        iterations = LLOYD_ITERATIONS,
        "training IVF centroids"
    );
    for iter in 0..LLOYD_ITERATIONS {
        centroids = lloyd_step(data, &centroids);
        if (iter + 1) % 100 == 0 {
            debug!(iter = iter + 1, "Lloyd iteration checkpoint");
        }
    }
    centroids
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn with_rids(vecs: Vec<Vector>) -> Vec<(Vector, Rid)> {
        vecs.into_iter()
            .enumerate()
            .map(|(i, v)| (v, Rid(i as u64)))
            .collect()
    }

    #[test]
    fn test_nearest_centroid_empty() {
        assert_eq!(nearest_centroid(&[1.0], &[]), None);
    }

    #[test]
    fn test_nearest_centroid_picks_argmin() {
        let centroids = vec![vec![0.0, 0.0], vec![10.0, 10.0], vec![1.0, 1.0]];
        assert_eq!(nearest_centroid(&[0.9, 1.1], &centroids), Some(2));
        assert_eq!(nearest_centroid(&[9.0, 9.0], &centroids), Some(1));
    }

    #[test]
    fn test_sample_size_and_membership() {
        let data = with_rids((0..10).map(|i| vec![i as f64]).collect());
        let sample = sample_initial_centroids(&data, 4);
        assert_eq!(sample.len(), 4);
        for s in &sample {
            assert!(data.iter().any(|(v, _)| v == s));
        }
        // Without replacement: all sampled vectors are distinct here because
        // the input vectors are distinct.
        for i in 0..sample.len() {
            for j in (i + 1)..sample.len() {
                assert_ne!(sample[i], sample[j]);
            }
        }
    }

    #[test]
    fn test_train_separates_two_clusters() {
        let mut vecs = Vec::new();
        for i in 0..20 {
            vecs.push(vec![i as f64 * 0.01, 0.0]);
        }
        for i in 0..20 {
            vecs.push(vec![10.0 + i as f64 * 0.01, 0.0]);
        }
        let data = with_rids(vecs);
        // Seed one centroid in each cluster so the test is deterministic.
        let centroids = train_centroids(&data, vec![vec![0.0, 0.0], vec![10.0, 0.0]]);

        let c0 = centroids[0][0].min(centroids[1][0]);
        let c1 = centroids[0][0].max(centroids[1][0]);
        assert!(c0 < 1.0, "lower centroid should be near 0, got {c0}");
        assert!(c1 > 9.0, "upper centroid should be near 10, got {c1}");
    }

    #[test]
    fn test_empty_cluster_keeps_centroid() {
        // One far-away centroid never wins an assignment and must survive
        // the mean update unchanged.
        let data = with_rids(vec![vec![0.0], vec![0.1]]);
        let centroids = train_centroids(&data, vec![vec![0.05], vec![100.0]]);
        assert_eq!(centroids[1], vec![100.0]);
    }
}
