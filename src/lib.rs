//! hiclens - Interactive contact graphs from Hi-C matrices
//!
//! hiclens turns a square Hi-C contact matrix into a circular contact graph and
//! renders it as an interactive page, with nodes coloured by gene content or
//! read depth from a per-bin feature table.
//!
//! # Pipeline
//!
//! Data flows strictly forward:
//!
//! 1. **Load** ([`loader`]): read the matrix (`.npy`, `.csv`, `.tsv`) and the feature
//!    table, keep feature rows inside the configured [`Region`], and check that row i
//!    of the filtered table belongs to node i of the matrix.
//! 2. **Threshold** ([`threshold`]): zero every entry below the p-th percentile of all
//!    entries, then the diagonal.
//! 3. **Build** ([`graph`]): one node per bin, one edge per surviving upper-triangle
//!    entry, widths normalized into [0, 0.3], nodes placed on a circle.
//! 4. **Render** ([`render`]): colour bands, labels and tooltips, written as HTML or
//!    JSON, or served live by [`serve`].
//!
//! # Quick Start
//!
//! ```no_run
//! use hiclens::{render, Dataset, Palette, Percentile, Region, ViewMode};
//! use std::path::Path;
//!
//! let dataset = Dataset::load(
//!     Path::new("data/GBM39HSR_5k_collapsed_matrix.npy"),
//!     Path::new("data/HSR_features.csv"),
//!     &Region::default(),
//! )?;
//!
//! let rendered = render::render(&dataset, Percentile::new(90)?, ViewMode::GeneCount, &Palette::default());
//! println!("{} nodes, {} edges", rendered.summary.nodes, rendered.summary.edges);
//!
//! render::generate("graph.html", &rendered)?;
//! # Ok::<(), hiclens::Error>(())
//! ```
//!
//! # Colour Bands
//!
//! | View | Band A | Band B | Band C |
//! |------|--------|--------|--------|
//! | Total Genes | exactly 1 gene | 2+ genes | no genes |
//! | Read Counts | ln reads > median | ln reads > upper quartile | otherwise |
//!
//! # Modules
//!
//! - [`loader`]: Matrix and feature table input
//! - [`threshold`]: Percentiles and matrix thresholding
//! - [`graph`]: Contact graph, weight normalization, circular layout
//! - [`render`]: Attribute mapping and output formatters (HTML, JSON)
//! - [`interaction`]: Click-to-focus and viewport model mirrored by the page script
//! - [`serve`]: Interactive dashboard server

pub mod config;
pub mod error;
pub mod graph;
pub mod interaction;
pub mod loader;
pub mod render;
pub mod serve;
pub mod threshold;

pub use config::{Config, Palette, Percentile, Region, ViewMode};
pub use error::{Error, Result};
pub use graph::ContactGraph;
pub use loader::{ContactMatrix, Dataset, FeatureRow, FeatureTable};
pub use render::{Pipeline, RenderedGraph};
