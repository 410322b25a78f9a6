//! Property-based tests for the distance kernel and index scan contract.
//!
//! Scans must return at most `k` results in non-decreasing distance order,
//! and an IVF-Flat index probing every list must agree with brute force.

use proptest::prelude::*;

use skiff::index::distance::compute_distance;
use skiff::index::{HnswIndex, IvfFlatIndex, VectorIndex};
use skiff::types::{DistanceMetric, Rid, Vector};

const METRICS: [DistanceMetric; 3] = [
    DistanceMetric::L2,
    DistanceMetric::InnerProduct,
    DistanceMetric::CosineSimilarity,
];

fn vector(dim: usize) -> impl Strategy<Value = Vector> {
    prop::collection::vec(-10.0f64..10.0, dim)
}

fn dataset(dim: usize) -> impl Strategy<Value = Vec<Vector>> {
    prop::collection::vec(vector(dim), 8..40)
}

fn opts(pairs: &[(&str, i64)]) -> Vec<(String, i64)> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn brute_force_distances(data: &[Vector], query: &[f64], metric: DistanceMetric) -> Vec<f64> {
    let mut dists: Vec<f64> = data
        .iter()
        .map(|v| compute_distance(query, v, metric))
        .collect();
    dists.sort_by(f64::total_cmp);
    dists
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn distance_is_symmetric(a in vector(6), b in vector(6)) {
        for metric in METRICS {
            let ab = compute_distance(&a, &b, metric);
            let ba = compute_distance(&b, &a, metric);
            prop_assert!((ab - ba).abs() < 1e-9, "{metric}: {ab} vs {ba}");
        }
    }

    #[test]
    fn distance_self_identities(x in vector(6)) {
        let l2 = compute_distance(&x, &x, DistanceMetric::L2);
        prop_assert!(l2.abs() < 1e-9);

        let norm_sq: f64 = x.iter().map(|v| v * v).sum();
        let ip = compute_distance(&x, &x, DistanceMetric::InnerProduct);
        prop_assert!((ip + norm_sq).abs() < 1e-6);

        let cos = compute_distance(&x, &x, DistanceMetric::CosineSimilarity);
        if norm_sq > 1e-12 {
            prop_assert!(cos.abs() < 1e-9);
        } else {
            prop_assert!((cos - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn ivf_scan_is_ordered_and_capped(
        data in dataset(4),
        query in vector(4),
        k in 0usize..50,
    ) {
        for metric in METRICS {
            let mut index = IvfFlatIndex::new(
                metric,
                &opts(&[("lists", 3), ("probe_lists", 2)]),
            ).expect("options");
            let entries: Vec<(Vector, Rid)> = data
                .iter()
                .cloned()
                .enumerate()
                .map(|(i, v)| (v, Rid(i as u64)))
                .collect();
            index.build(entries);

            let got = index.scan(&query, k);
            prop_assert!(got.len() <= k);
            let dists: Vec<f64> = got
                .iter()
                .map(|rid| compute_distance(&query, &data[rid.0 as usize], metric))
                .collect();
            for pair in dists.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }
        }
    }

    #[test]
    fn ivf_full_probe_matches_brute_force(
        data in dataset(4),
        query in vector(4),
    ) {
        let mut index = IvfFlatIndex::new(
            DistanceMetric::L2,
            &opts(&[("lists", 4), ("probe_lists", 4)]),
        ).expect("options");
        let entries: Vec<(Vector, Rid)> = data
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, v)| (v, Rid(i as u64)))
            .collect();
        index.build(entries);

        let k = 5.min(data.len());
        let got = index.scan(&query, k);
        prop_assert_eq!(got.len(), k);

        // Compare distances rather than RIDs so exact ties cannot flip the
        // comparison.
        let got_dists: Vec<f64> = got
            .iter()
            .map(|rid| compute_distance(&query, &data[rid.0 as usize], DistanceMetric::L2))
            .collect();
        let expected = brute_force_distances(&data, &query, DistanceMetric::L2);
        for (g, e) in got_dists.iter().zip(expected.iter()) {
            prop_assert!((g - e).abs() < 1e-9, "got {g}, expected {e}");
        }
    }

    #[test]
    fn hnsw_scan_is_ordered_and_capped(
        data in dataset(4),
        query in vector(4),
        k in 1usize..20,
    ) {
        let mut index = HnswIndex::new(
            DistanceMetric::L2,
            &opts(&[("m", 4), ("ef_construction", 16), ("ef_search", 16)]),
        ).expect("options");
        for (i, v) in data.iter().enumerate() {
            index.insert(v, Rid(i as u64));
        }

        let got = index.scan(&query, k);
        prop_assert!(got.len() <= k);
        prop_assert!(!got.is_empty());
        let dists: Vec<f64> = got
            .iter()
            .map(|rid| compute_distance(&query, &data[rid.0 as usize], DistanceMetric::L2))
            .collect();
        for pair in dists.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
    }
}
