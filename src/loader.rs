//! Loading contact matrices and feature tables
//!
//! The matrix is a square array of pairwise contact counts between genomic bins.
//! The feature table carries one row per bin; after filtering to the configured
//! [`Region`] its row order must match the matrix node order, which [`Dataset::load`]
//! checks up front instead of silently mis-mapping attributes.

use crate::config::Region;
use crate::error::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Square contact matrix, immutable once loaded
#[derive(Debug, Clone, PartialEq)]
pub struct ContactMatrix {
    values: Array2<f64>,
}

impl ContactMatrix {
    /// Wrap an in-memory array, rejecting empty or non-square input
    pub fn new(values: Array2<f64>) -> Result<Self> {
        let (rows, cols) = values.dim();
        if rows == 0 || cols == 0 {
            return Err(Error::EmptyMatrix);
        }
        if rows != cols {
            return Err(Error::NotSquare { rows, cols });
        }
        Ok(Self { values })
    }

    /// Load from `.npy`, or from `.csv`/`.tsv`/`.txt` for hand-exported matrices
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let values = match ext.as_str() {
            "csv" => read_delimited_matrix(path, b',')?,
            "tsv" | "txt" => read_delimited_matrix(path, b'\t')?,
            _ => read_npy_matrix(path)?,
        };

        let matrix = Self::new(values)?;
        log::info!("Loaded {}x{} contact matrix from {}", matrix.dim(), matrix.dim(), path.display());
        Ok(matrix)
    }

    /// Number of bins (rows == columns)
    pub fn dim(&self) -> usize {
        self.values.nrows()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }
}

fn read_npy_matrix(path: &Path) -> Result<Array2<f64>> {
    if !path.exists() {
        return Err(Error::io(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        ));
    }

    match ndarray_npy::read_npy::<_, Array2<f64>>(path) {
        Ok(values) => Ok(values),
        Err(f64_err) => {
            // Matrices exported as float32 are common; widen them
            log::debug!("{} is not f64 ({}), trying f32", path.display(), f64_err);
            ndarray_npy::read_npy::<_, Array2<f32>>(path)
                .map(|values| values.mapv(f64::from))
                .map_err(|_| Error::Npy {
                    path: path.to_path_buf(),
                    message: f64_err.to_string(),
                })
        }
    }
}

fn read_delimited_matrix(path: &Path, delimiter: u8) -> Result<Array2<f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::csv(path, e))?;

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::csv(path, e))?;
        // Non-numeric cells are header labels or row names
        let row: Vec<f64> = record
            .iter()
            .filter_map(|field| field.trim().parse::<f64>().ok())
            .collect();
        if !row.is_empty() {
            rows.push(row);
        }
    }

    let n_rows = rows.len();
    let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
    if let Some(bad) = rows.iter().position(|r| r.len() != n_cols) {
        return Err(Error::Parse {
            path: path.to_path_buf(),
            message: format!(
                "row {} has {} numeric cells, expected {}",
                bad + 1,
                rows[bad].len(),
                n_cols
            ),
        });
    }

    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((n_rows, n_cols), flat).map_err(|e| Error::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// One genomic bin's annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    pub total_genes: u32,
    pub read_count: f64,
}

/// Feature rows in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn new(rows: Vec<FeatureRow>) -> Self {
        Self { rows }
    }

    /// Read a header-bearing CSV (or TSV by extension); extra columns are ignored
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
            _ => b',',
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| Error::csv(path, e))?;

        let mut rows = Vec::new();
        for row in reader.deserialize::<FeatureRow>() {
            rows.push(row.map_err(|e| Error::csv(path, e))?);
        }

        log::info!("Loaded {} feature rows from {}", rows.len(), path.display());
        Ok(Self { rows })
    }

    /// Keep rows inside the region, preserving order
    pub fn filter_region(&self, region: &Region) -> FeatureTable {
        let rows: Vec<FeatureRow> = self
            .rows
            .iter()
            .filter(|r| region.contains(&r.chromosome, r.start, r.end))
            .cloned()
            .collect();
        log::debug!("{} of {} feature rows fall in {}", rows.len(), self.rows.len(), region);
        FeatureTable { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn gene_counts(&self) -> Vec<u32> {
        self.rows.iter().map(|r| r.total_genes).collect()
    }

    pub fn read_counts(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.read_count).collect()
    }
}

/// A contact matrix paired with the feature rows of its nodes (row i = node i)
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    matrix: ContactMatrix,
    features: FeatureTable,
}

impl Dataset {
    /// Pair an already-filtered feature table with a matrix
    pub fn new(matrix: ContactMatrix, features: FeatureTable) -> Result<Self> {
        if features.len() != matrix.dim() {
            return Err(Error::Misaligned {
                features: features.len(),
                nodes: matrix.dim(),
            });
        }
        Ok(Self { matrix, features })
    }

    /// Load both files, filter features to `region`, and check alignment
    pub fn load(matrix_path: &Path, features_path: &Path, region: &Region) -> Result<Self> {
        let matrix = ContactMatrix::load(matrix_path)?;
        let features = FeatureTable::load(features_path)?.filter_region(region);
        Self::new(matrix, features)
    }

    pub fn node_count(&self) -> usize {
        self.matrix.dim()
    }

    pub fn matrix(&self) -> &ContactMatrix {
        &self.matrix
    }

    pub fn features(&self) -> &FeatureTable {
        &self.features
    }
}
