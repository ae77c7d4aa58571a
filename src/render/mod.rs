//! Attribute mapping and output formats for rendered contact graphs
//!
//! [`render`] is the whole pipeline after loading: threshold → graph → layout →
//! colour bands. It is pure, so [`Pipeline`] memoizes it per (percentile, view).
//!
//! Output formatters:
//!
//! - **HTML**: self-contained interactive vis-network page with click-to-focus
//! - **JSON**: machine-readable nodes and edges
//!
//! ```ignore
//! use hiclens::render;
//!
//! // Picks format based on extension
//! render::generate("graph.html", &rendered)?;
//! render::generate("graph.json", &rendered)?;
//! ```

pub mod html;
pub mod json;

use crate::config::{Palette, Percentile, ViewMode};
use crate::error::{Error, Result};
use crate::graph::{circular_layout, ContactGraph, LAYOUT_SCALE};
use crate::interaction::Interaction;
use crate::loader::Dataset;
use crate::threshold::{percentile, threshold_matrix};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Added before taking the log of read counts so empty bins stay finite
pub const READ_COUNT_PSEUDOCOUNT: f64 = 1e-10;

/// Node radius handed to vis-network
pub const NODE_SIZE: u32 = 15;

/// Opacity of every edge
pub const EDGE_OPACITY: f64 = 0.3;

/// Discrete colour class of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorBand {
    A,
    B,
    C,
}

impl ColorBand {
    /// 1 gene → A, 2+ genes → B, none → C
    pub fn for_gene_count(genes: u32) -> Self {
        match genes {
            1 => ColorBand::A,
            g if g >= 2 => ColorBand::B,
            _ => ColorBand::C,
        }
    }

    /// Above the upper cutoff → B, above the lower cutoff → A, otherwise C
    pub fn for_read_count(log_reads: f64, cutoffs: ReadCutoffs) -> Self {
        if log_reads > cutoffs.upper {
            ColorBand::B
        } else if log_reads > cutoffs.lower {
            ColorBand::A
        } else {
            ColorBand::C
        }
    }

    pub fn color(self, palette: &Palette) -> &str {
        match self {
            ColorBand::A => &palette.band_a,
            ColorBand::B => &palette.band_b,
            ColorBand::C => &palette.band_c,
        }
    }
}

/// Log-read-count band boundaries taken from the distribution itself
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReadCutoffs {
    /// 50th percentile
    pub lower: f64,
    /// 75th percentile
    pub upper: f64,
}

impl ReadCutoffs {
    pub fn from_log_reads(log_reads: &[f64]) -> Self {
        Self {
            lower: percentile(log_reads, 50.0).unwrap_or(0.0),
            upper: percentile(log_reads, 75.0).unwrap_or(0.0),
        }
    }
}

/// `ln(read_count + pseudocount)` per node
pub fn log_read_counts(read_counts: &[f64]) -> Vec<f64> {
    read_counts
        .iter()
        .map(|&r| (r + READ_COUNT_PSEUDOCOUNT).ln())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeStyle {
    pub id: usize,
    pub label: String,
    pub title: String,
    pub band: ColorBand,
    pub color: String,
    pub x: f64,
    pub y: f64,
    pub degree: usize,
    /// Adjacent node ids, ascending
    pub neighbors: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeStyle {
    pub id: usize,
    pub from: usize,
    pub to: usize,
    pub weight: f64,
    /// Normalized into [0, 0.3]
    pub width: f64,
    pub title: String,
}

/// Summary statistics for a rendered graph
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub nodes: usize,
    pub edges: usize,
    pub isolated: usize,
    pub cutoff: f64,
}

/// Everything the page needs to draw one (percentile, view) combination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedGraph {
    pub percentile: Percentile,
    pub view: ViewMode,
    pub summary: Summary,
    /// Present in the read-count view only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_cutoffs: Option<ReadCutoffs>,
    pub nodes: Vec<NodeStyle>,
    pub edges: Vec<EdgeStyle>,
    pub palette: Palette,
}

impl RenderedGraph {
    /// Click-to-focus model over this graph's nodes and edges (edge ids are indices)
    pub fn interaction(&self) -> Interaction {
        let neighbours: Vec<Vec<usize>> = self.nodes.iter().map(|n| n.neighbors.clone()).collect();
        let edges: Vec<(usize, usize)> = self.edges.iter().map(|e| (e.from, e.to)).collect();
        Interaction::new(&neighbours, &edges)
    }
}

/// Threshold, build, lay out and colour the dataset
pub fn render(dataset: &Dataset, p: Percentile, view: ViewMode, palette: &Palette) -> RenderedGraph {
    let thresholded = threshold_matrix(dataset.matrix().values(), p);
    let graph = ContactGraph::from_matrix(&thresholded.matrix);
    let layout = circular_layout(graph.node_count(), LAYOUT_SCALE);

    let genes = dataset.features().gene_counts();
    let log_reads = log_read_counts(&dataset.features().read_counts());
    let read_cutoffs = match view {
        ViewMode::GeneCount => None,
        ViewMode::ReadCount => Some(ReadCutoffs::from_log_reads(&log_reads)),
    };

    let nodes: Vec<NodeStyle> = layout
        .iter()
        .enumerate()
        .map(|(id, &(x, y))| {
            let degree = graph.degree(id);
            let neighbors = graph.neighbors(id);
            let (band, value) = match read_cutoffs {
                None => {
                    let g = genes[id];
                    (ColorBand::for_gene_count(g), g.to_string())
                }
                Some(cutoffs) => {
                    let r = log_reads[id];
                    (ColorBand::for_read_count(r, cutoffs), format!("{:.2}", r))
                }
            };
            NodeStyle {
                id,
                label: id.to_string(),
                title: format!("Node {}\n{}: {}\nConnections: {}", id, view.label(), value, degree),
                band,
                color: band.color(palette).to_string(),
                x,
                y,
                degree,
                neighbors,
            }
        })
        .collect();

    let widths = graph.normalized_weights();
    let edges: Vec<EdgeStyle> = graph
        .edges()
        .into_iter()
        .zip(widths)
        .enumerate()
        .map(|(id, (e, width))| EdgeStyle {
            id,
            from: e.source,
            to: e.target,
            weight: e.weight,
            width,
            title: format!("Weight: {:.2}", e.weight),
        })
        .collect();

    let summary = Summary {
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        isolated: graph.isolated_count(),
        cutoff: thresholded.cutoff,
    };
    log::info!(
        "Rendered p{} {}: {} nodes ({} isolated), {} edges, cutoff {:.3}",
        p,
        view,
        summary.nodes,
        summary.isolated,
        summary.edges,
        summary.cutoff
    );

    RenderedGraph {
        percentile: p,
        view,
        summary,
        read_cutoffs,
        nodes,
        edges,
        palette: palette.clone(),
    }
}

/// Loaded dataset plus memoized renders, owned by one session
pub struct Pipeline {
    dataset: Dataset,
    palette: Palette,
    cache: HashMap<(Percentile, ViewMode), Arc<RenderedGraph>>,
}

impl Pipeline {
    pub fn new(dataset: Dataset, palette: Palette) -> Self {
        Self {
            dataset,
            palette,
            cache: HashMap::new(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Render, reusing an earlier result for the same parameters
    pub fn render(&mut self, p: Percentile, view: ViewMode) -> Arc<RenderedGraph> {
        if let Some(hit) = self.cache.get(&(p, view)) {
            log::debug!("Cache hit for p{} {}", p, view);
            return Arc::clone(hit);
        }
        let rendered = Arc::new(render(&self.dataset, p, view, &self.palette));
        self.cache.insert((p, view), Arc::clone(&rendered));
        rendered
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

/// Write a rendered graph in the format matching the file extension
pub fn generate<P: AsRef<Path>>(path: P, rendered: &RenderedGraph) -> Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let file = std::fs::File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = std::io::BufWriter::new(file);

    match ext.as_str() {
        "json" => json::write(&mut writer, rendered),
        _ => html::write(&mut writer, rendered),
    }
    .map_err(|e| Error::io(path, e))?;

    log::info!("Wrote {}", path.display());
    Ok(())
}
