//! Percentile thresholding of contact matrices
//!
//! The cutoff is taken over *every* entry of the matrix, diagonal and both
//! triangles included, so each off-diagonal contact is counted twice. Entries
//! strictly below the cutoff become zero, then the diagonal is cleared so the
//! graph has no self-loops.

use crate::config::Percentile;
use ndarray::Array2;
use rayon::prelude::*;

/// Above this many values the sort runs on the rayon pool
const PARALLEL_SORT_MIN: usize = 1 << 16;

/// A thresholded working copy of a contact matrix
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholded {
    /// Value of the requested percentile over the original entries
    pub cutoff: f64,
    pub matrix: Array2<f64>,
}

/// p-th percentile (0..=100) with linear interpolation between closest ranks
///
/// Matches numpy's default `linear` method: rank = p/100 * (n - 1).
/// Returns `None` for an empty input.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    if sorted.len() >= PARALLEL_SORT_MIN {
        sorted.par_sort_unstable_by(f64::total_cmp);
    } else {
        sorted.sort_unstable_by(f64::total_cmp);
    }

    percentile_of_sorted(&sorted, p)
}

/// Same as [`percentile`] for data that is already sorted ascending
pub fn percentile_of_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let p = p.clamp(0.0, 100.0);
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Zero entries below the percentile cutoff, then zero the diagonal
pub fn threshold_matrix(matrix: &Array2<f64>, p: Percentile) -> Thresholded {
    let flat: Vec<f64> = matrix.iter().copied().collect();
    let cutoff = percentile(&flat, f64::from(p.value())).unwrap_or(0.0);

    let mut out = matrix.mapv(|v| if v < cutoff { 0.0 } else { v });
    out.diag_mut().fill(0.0);

    let kept = out.iter().filter(|&&v| v != 0.0).count();
    log::debug!(
        "p{} cutoff = {:.4}; {} non-zero off-diagonal entries remain",
        p,
        cutoff,
        kept
    );

    Thresholded { cutoff, matrix: out }
}
