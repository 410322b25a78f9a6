//! Single-layer proximity graph and its beam search.
//!
//! A layer holds a subset of vertex ids and an undirected adjacency map
//! restricted to that subset. Vertex data is owned by the index; every
//! operation that needs coordinates takes the full vertex table by
//! reference.

use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use crate::index::distance::compute_distance;
use crate::types::{DistanceMetric, Vector};

/// A `(distance, vertex)` pair ordered by distance, vertex id as the tie
/// breaker so orderings are deterministic within a call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Candidate {
    pub dist: f64,
    pub id: usize,
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.dist.total_cmp(&other.dist).then(self.id.cmp(&other.id))
    }
}

/// The `m` ids in `candidates` nearest to `query` under `metric`,
/// ascending by distance.
pub(crate) fn select_neighbors(
    query: &[f64],
    candidates: &[usize],
    vertices: &[Vector],
    m: usize,
    metric: DistanceMetric,
) -> Vec<usize> {
    let mut ranked: Vec<Candidate> = candidates
        .iter()
        .map(|&id| Candidate {
            dist: compute_distance(query, &vertices[id], metric),
            id,
        })
        .collect();
    ranked.sort_unstable();
    ranked.truncate(m);
    ranked.into_iter().map(|c| c.id).collect()
}

/// One layer of the small-world graph.
#[derive(Debug, Default)]
pub(crate) struct Layer {
    /// Vertices present in this layer, in insertion order. The first one
    /// is the layer's entry point.
    nodes: Vec<usize>,
    /// Adjacency restricted to this layer.
    edges: HashMap<usize, Vec<usize>>,
}

impl Layer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The vertex inserted when this layer was created.
    pub fn entry_point(&self) -> Option<usize> {
        self.nodes.first().copied()
    }

    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    pub fn neighbors(&self, id: usize) -> &[usize] {
        self.edges.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn degree(&self, id: usize) -> usize {
        self.neighbors(id).len()
    }

    pub fn add_vertex(&mut self, id: usize) {
        self.nodes.push(id);
        self.edges.entry(id).or_default();
    }

    /// Add the undirected edge `a -- b`.
    pub fn connect(&mut self, a: usize, b: usize) {
        self.edges.entry(a).or_default().push(b);
        self.edges.entry(b).or_default().push(a);
    }

    /// Trim `id`'s neighbor list to the `cap` closest neighbors of its own
    /// vector. Dropped edges are removed from both endpoints so the graph
    /// stays undirected.
    pub fn shrink_neighbors(
        &mut self,
        id: usize,
        cap: usize,
        vertices: &[Vector],
        metric: DistanceMetric,
    ) {
        let current = self.neighbors(id).to_vec();
        let kept = select_neighbors(&vertices[id], &current, vertices, cap, metric);
        let kept_set: HashSet<usize> = kept.iter().copied().collect();
        for dropped in current.iter().filter(|&&n| !kept_set.contains(&n)) {
            if let Some(back) = self.edges.get_mut(dropped) {
                back.retain(|&n| n != id);
            }
        }
        self.edges.insert(id, kept);
    }

    /// Beam search on this layer: up to `ef` ids nearest `query` reachable
    /// from `entry_points` via the layer's edges, ascending by distance.
    ///
    /// The frontier is a plain FIFO queue rather than a best-first heap;
    /// results live in a max-heap capped at `ef`. Expansion stops early
    /// once the result set is full and the closest distance seen among
    /// enqueued candidates exceeds the worst retained result. A best-first
    /// frontier would tighten the bound; the FIFO shape is kept for its
    /// recall profile.
    pub fn search_layer(
        &self,
        query: &[f64],
        ef: usize,
        entry_points: &[usize],
        vertices: &[Vector],
        metric: DistanceMetric,
    ) -> Vec<usize> {
        let mut candidate_queue: VecDeque<usize> = VecDeque::new();
        let mut results: BinaryHeap<Candidate> = BinaryHeap::new();
        let mut visited: HashSet<usize> = HashSet::new();

        let mut max_result_dist = f64::MIN;
        let mut min_candidate_dist = f64::MAX;

        for &ep in entry_points {
            if !visited.insert(ep) {
                continue;
            }
            let dist = compute_distance(query, &vertices[ep], metric);
            candidate_queue.push_back(ep);
            results.push(Candidate { dist, id: ep });
            if results.len() == ef {
                if let Some(worst) = results.peek() {
                    max_result_dist = worst.dist;
                }
            }
            min_candidate_dist = min_candidate_dist.min(dist);
        }

        while let Some(current) = candidate_queue.pop_front() {
            // Expand only the ef nearest of the current vertex's neighbors.
            let nearest = select_neighbors(query, self.neighbors(current), vertices, ef, metric);

            for neighbor in nearest {
                if !visited.insert(neighbor) {
                    continue;
                }
                let dist = compute_distance(query, &vertices[neighbor], metric);
                candidate_queue.push_back(neighbor);
                results.push(Candidate { dist, id: neighbor });
                if results.len() > ef {
                    results.pop();
                }
                if results.len() == ef {
                    if let Some(worst) = results.peek() {
                        max_result_dist = worst.dist;
                    }
                }
                min_candidate_dist = min_candidate_dist.min(dist);
            }

            if results.len() == ef && min_candidate_dist > max_result_dist {
                break;
            }
        }

        results
            .into_sorted_vec()
            .into_iter()
            .map(|c| c.id)
            .collect()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn line_vertices(n: usize) -> Vec<Vector> {
        (0..n).map(|i| vec![i as f64]).collect()
    }

    /// A path graph 0 - 1 - 2 - ... - (n-1).
    fn path_layer(n: usize) -> Layer {
        let mut layer = Layer::new();
        for id in 0..n {
            layer.add_vertex(id);
            if id > 0 {
                layer.connect(id - 1, id);
            }
        }
        layer
    }

    #[test]
    fn test_select_neighbors_orders_and_caps() {
        let vertices = line_vertices(5);
        let ids = vec![4, 0, 2, 3, 1];
        let picked = select_neighbors(&[0.2], &ids, &vertices, 3, DistanceMetric::L2);
        assert_eq!(picked, vec![0, 1, 2]);
    }

    #[test]
    fn test_select_neighbors_fewer_candidates_than_m() {
        let vertices = line_vertices(2);
        let picked = select_neighbors(&[0.0], &[1, 0], &vertices, 10, DistanceMetric::L2);
        assert_eq!(picked, vec![0, 1]);
    }

    #[test]
    fn test_connect_is_undirected() {
        let mut layer = Layer::new();
        layer.add_vertex(0);
        layer.add_vertex(1);
        layer.connect(0, 1);
        assert_eq!(layer.neighbors(0), &[1]);
        assert_eq!(layer.neighbors(1), &[0]);
    }

    #[test]
    fn test_entry_point_is_first_vertex() {
        let layer = path_layer(3);
        assert_eq!(layer.entry_point(), Some(0));
        assert_eq!(Layer::new().entry_point(), None);
    }

    #[test]
    fn test_search_layer_walks_the_path() {
        let vertices = line_vertices(10);
        let layer = path_layer(10);
        // From vertex 0, a beam of 3 must reach the far end of the path.
        let found = layer.search_layer(&[9.0], 3, &[0], &vertices, DistanceMetric::L2);
        assert_eq!(found, vec![9, 8, 7]);
    }

    #[test]
    fn test_search_layer_results_sorted_ascending() {
        let vertices = line_vertices(10);
        let layer = path_layer(10);
        let found = layer.search_layer(&[4.4], 5, &[0], &vertices, DistanceMetric::L2);
        let dists: Vec<f64> = found.iter().map(|&id| (4.4 - id as f64).abs()).collect();
        for w in dists.windows(2) {
            assert!(w[0] <= w[1], "distances not ascending: {dists:?}");
        }
        assert_eq!(found[0], 4);
    }

    #[test]
    fn test_search_layer_unknown_entry_has_no_neighbors() {
        let vertices = line_vertices(3);
        let layer = path_layer(2);
        // Vertex 2 is not in this layer; the search can still score it as an
        // entry point, it just has nothing to expand.
        let found = layer.search_layer(&[2.0], 2, &[2], &vertices, DistanceMetric::L2);
        assert_eq!(found, vec![2]);
    }

    #[test]
    fn test_shrink_neighbors_symmetric() {
        let mut layer = Layer::new();
        let vertices = line_vertices(5);
        for id in 0..5 {
            layer.add_vertex(id);
        }
        for other in 1..5 {
            layer.connect(0, other);
        }
        layer.shrink_neighbors(0, 2, &vertices, DistanceMetric::L2);

        assert_eq!(layer.neighbors(0), &[1, 2]);
        // Dropped endpoints lost their back edge too.
        assert!(layer.neighbors(3).is_empty());
        assert!(layer.neighbors(4).is_empty());
        // Kept endpoints still point back.
        assert_eq!(layer.neighbors(1), &[0]);
        assert_eq!(layer.neighbors(2), &[0]);
    }
}
