//! HNSW index implementation.
//!
//! A hierarchical navigable small world graph: every vertex lives on
//! layer 0, and each higher layer holds a geometrically thinning subset.
//! Searches descend greedily from the sparse top layer, then beam-search
//! the base layer. Inserts assign each vertex a random top level with
//! `floor(-ln(u) / ln(m))` and wire it into every layer up to that level.

mod layer;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::error::{Result, SkiffError};
use crate::index::traits::{require_option, VectorIndex};
use crate::types::{DistanceMetric, IndexKind, Rid, Vector};

use layer::{select_neighbors, Layer};

/// In-memory HNSW index.
pub struct HnswIndex {
    metric: DistanceMetric,
    /// Neighbor target per insert.
    m: usize,
    /// Degree cap above layer 0 (= m).
    m_max: usize,
    /// Degree cap on layer 0 (= m * m).
    m_max_0: usize,
    /// Beam width when wiring a vertex into a layer.
    ef_construction: usize,
    /// Beam width while descending to the target level during insert.
    ef_search: usize,
    /// Level-generation constant, 1 / ln(m).
    m_l: f64,
    /// Vertex data; vertex id is the insertion index. Layers only hold ids.
    vertices: Vec<Vector>,
    /// `rids[id]` is the heap row of vertex `id`.
    rids: Vec<Rid>,
    /// Layer 0 first; the last layer is the entry layer for searches.
    layers: Vec<Layer>,
    rng: StdRng,
}

impl HnswIndex {
    /// Parse options and create an empty index.
    ///
    /// `m`, `ef_construction`, and `ef_search` must all be present, with
    /// `m >= 2` (the level-generation constant is undefined at `m = 1`)
    /// and positive beam widths.
    pub fn new(metric: DistanceMetric, options: &[(String, i64)]) -> Result<Self> {
        let kind = IndexKind::Hnsw;
        let m = require_option(options, kind, "m")?;
        let ef_construction = require_option(options, kind, "ef_construction")?;
        let ef_search = require_option(options, kind, "ef_search")?;

        if m < 2 {
            return Err(SkiffError::InvalidIndexOption {
                kind: kind.to_string(),
                option: "m".into(),
                value: m,
                reason: "must be at least 2".into(),
            });
        }
        for (option, value) in [("ef_construction", ef_construction), ("ef_search", ef_search)] {
            if value < 1 {
                return Err(SkiffError::InvalidIndexOption {
                    kind: kind.to_string(),
                    option: option.into(),
                    value,
                    reason: "must be at least 1".into(),
                });
            }
        }

        let m = m as usize;
        Ok(Self {
            metric,
            m,
            m_max: m,
            m_max_0: m * m,
            ef_construction: ef_construction as usize,
            ef_search: ef_search as usize,
            m_l: 1.0 / (m as f64).ln(),
            vertices: Vec::new(),
            rids: Vec::new(),
            layers: vec![Layer::new()],
            rng: StdRng::from_entropy(),
        })
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Sample a vertex's top level: `floor(-ln(u) * m_l)` with
    /// `u ~ Uniform(0, 1]`, giving a geometrically decaying population per
    /// layer.
    fn random_level(&mut self) -> usize {
        let u: f64 = 1.0 - self.rng.gen::<f64>();
        (-u.ln() * self.m_l).floor() as usize
    }

    /// Degree cap for a layer.
    fn level_cap(&self, level: usize) -> usize {
        if level == 0 {
            self.m_max_0
        } else {
            self.m_max
        }
    }
}

impl VectorIndex for HnswIndex {
    /// Bulk build: shuffle the input, then insert one vertex at a time.
    fn build(&mut self, mut initial_data: Vec<(Vector, Rid)>) {
        use rand::seq::SliceRandom;
        initial_data.shuffle(&mut self.rng);
        let total = initial_data.len();
        for (vec, rid) in initial_data {
            self.insert(&vec, rid);
        }
        info!(
            vertices = total,
            layers = self.layers.len(),
            "HNSW index built"
        );
    }

    fn insert(&mut self, key: &[f64], rid: Rid) {
        let id = self.vertices.len();
        self.vertices.push(key.to_vec());
        self.rids.push(rid);
        let target_level = self.random_level();

        if self.layers[0].is_empty() {
            self.layers[0].add_vertex(id);
        } else {
            let top = self.layers.len() - 1;
            let mut entry_points: Vec<usize> =
                self.layers[top].entry_point().into_iter().collect();

            // Above the target level, only track the single nearest vertex
            // down to the next layer.
            let mut level = top as isize;
            while level > target_level as isize {
                let found = self.layers[level as usize].search_layer(
                    key,
                    self.ef_search,
                    &entry_points,
                    &self.vertices,
                    self.metric,
                );
                entry_points = select_neighbors(key, &found, &self.vertices, 1, self.metric);
                level -= 1;
            }

            // From min(top, target) down to the base layer: wire the vertex
            // in, then re-trim any neighbor pushed over the layer's cap.
            while level >= 0 {
                let l = level as usize;
                let cap = self.level_cap(l);
                let found = self.layers[l].search_layer(
                    key,
                    self.ef_construction,
                    &entry_points,
                    &self.vertices,
                    self.metric,
                );
                let neighbors = select_neighbors(key, &found, &self.vertices, self.m, self.metric);

                let layer = &mut self.layers[l];
                layer.add_vertex(id);
                for &neighbor in &neighbors {
                    layer.connect(id, neighbor);
                }
                for &neighbor in &neighbors {
                    if layer.degree(neighbor) > cap {
                        layer.shrink_neighbors(neighbor, cap, &self.vertices, self.metric);
                    }
                }

                // The untrimmed beam results seed the next layer down.
                entry_points = found;
                level -= 1;
            }
        }

        // Grow new layers if the vertex's level exceeds the current top;
        // the vertex becomes each new layer's entry point.
        while self.layers.len() <= target_level {
            let mut new_layer = Layer::new();
            new_layer.add_vertex(id);
            self.layers.push(new_layer);
            debug!(
                vertex = id,
                level = self.layers.len() - 1,
                "new HNSW layer"
            );
        }
    }

    fn scan(&self, query: &[f64], limit: usize) -> Vec<Rid> {
        if self.vertices.is_empty() || limit == 0 {
            return Vec::new();
        }

        let top = self.layers.len() - 1;
        let mut entry_points: Vec<usize> = self.layers[top].entry_point().into_iter().collect();
        for level in (1..=top).rev() {
            entry_points = self.layers[level].search_layer(
                query,
                limit,
                &entry_points,
                &self.vertices,
                self.metric,
            );
        }
        entry_points =
            self.layers[0].search_layer(query, limit, &entry_points, &self.vertices, self.metric);

        entry_points.into_iter().map(|id| self.rids[id]).collect()
    }
}
