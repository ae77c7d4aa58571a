//! Contact graph construction and circular layout
//!
//! One node per matrix row, isolated or not, so the node count always equals the
//! matrix dimension. One undirected edge per non-zero upper-triangle entry.

use ndarray::Array2;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::Serialize;

/// Upper bound of the normalized edge width range [0, MAX_EDGE_WIDTH]
pub const MAX_EDGE_WIDTH: f64 = 0.3;

/// Width given to every edge when all surviving weights are equal
pub const CONSTANT_EDGE_WIDTH: f64 = MAX_EDGE_WIDTH / 2.0;

/// Scale applied to the unit-circle layout for rendering
pub const LAYOUT_SCALE: f64 = 1000.0;

/// An edge of the contact graph with its raw contact weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContactEdge {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
}

/// Weighted undirected graph over matrix bins
#[derive(Debug, Clone)]
pub struct ContactGraph {
    graph: UnGraph<usize, f64>,
}

impl ContactGraph {
    /// Build from a thresholded matrix. Reads the upper triangle only.
    pub fn from_matrix(matrix: &Array2<f64>) -> Self {
        let n = matrix.nrows();
        let mut graph = UnGraph::with_capacity(n, 0);
        let nodes: Vec<NodeIndex> = (0..n).map(|i| graph.add_node(i)).collect();

        for i in 0..n {
            for j in (i + 1)..matrix.ncols().min(n) {
                let w = matrix[[i, j]];
                if w > 0.0 {
                    graph.add_edge(nodes[i], nodes[j], w);
                }
            }
        }

        log::debug!("Built contact graph: {} nodes, {} edges", graph.node_count(), graph.edge_count());
        Self { graph }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Edges in insertion order (row-major over the upper triangle)
    pub fn edges(&self) -> Vec<ContactEdge> {
        self.graph
            .edge_indices()
            .filter_map(|e| self.contact_edge(e))
            .collect()
    }

    fn contact_edge(&self, e: EdgeIndex) -> Option<ContactEdge> {
        let (a, b) = self.graph.edge_endpoints(e)?;
        Some(ContactEdge {
            source: self.graph[a],
            target: self.graph[b],
            weight: self.graph[e],
        })
    }

    /// Number of incident edges
    pub fn degree(&self, node: usize) -> usize {
        if node >= self.node_count() {
            return 0;
        }
        self.graph.edges(NodeIndex::new(node)).count()
    }

    /// Direct neighbours, ascending
    pub fn neighbors(&self, node: usize) -> Vec<usize> {
        if node >= self.node_count() {
            return Vec::new();
        }
        let mut out: Vec<usize> = self
            .graph
            .edges(NodeIndex::new(node))
            .map(|e| {
                let other = if e.source().index() == node { e.target() } else { e.source() };
                self.graph[other]
            })
            .collect();
        out.sort_unstable();
        out
    }

    /// Nodes with no surviving edges
    pub fn isolated_count(&self) -> usize {
        self.graph
            .node_indices()
            .filter(|&n| self.graph.edges(n).next().is_none())
            .count()
    }

    /// Edge weights mapped linearly onto [0, MAX_EDGE_WIDTH], in [`edges`](Self::edges) order
    pub fn normalized_weights(&self) -> Vec<f64> {
        let weights: Vec<f64> = self.edges().iter().map(|e| e.weight).collect();
        normalize_weights(&weights)
    }
}

/// `(w - min) * MAX_EDGE_WIDTH / (max - min)`; equal weights all get [`CONSTANT_EDGE_WIDTH`]
pub fn normalize_weights(weights: &[f64]) -> Vec<f64> {
    let min = weights.iter().copied().fold(f64::INFINITY, f64::min);
    let max = weights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range.is_nan() || range <= 0.0 {
        return vec![CONSTANT_EDGE_WIDTH; weights.len()];
    }

    weights
        .iter()
        .map(|&w| (w - min) * MAX_EDGE_WIDTH / range)
        .collect()
}

/// Node i at angle 2πi/n on a circle of radius `scale`; a single node sits at the origin
pub fn circular_layout(n: usize, scale: f64) -> Vec<(f64, f64)> {
    if n == 1 {
        return vec![(0.0, 0.0)];
    }
    (0..n)
        .map(|i| {
            let theta = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
            (theta.cos() * scale, theta.sin() * scale)
        })
        .collect()
}
