//! Configuration for a render session
//!
//! Everything here is either exposed in the dashboard (percentile slider, view toggle)
//! or fixed for a dataset (region window, palette, input paths). A [`Config`] can be
//! seeded from a JSON file and then overridden by CLI flags.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Percentile threshold accepted by the slider: 70..=95 in steps of 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Percentile(u8);

impl Percentile {
    pub const MIN: u8 = 70;
    pub const MAX: u8 = 95;
    pub const STEP: u8 = 5;

    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) && value % Self::STEP == 0 {
            Ok(Self(value))
        } else {
            Err(Error::InvalidParameter(format!(
                "percentile must be one of {}..={} in steps of {}, got {}",
                Self::MIN,
                Self::MAX,
                Self::STEP,
                value
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Every value the slider can take
    pub fn all() -> impl Iterator<Item = Percentile> {
        (Self::MIN..=Self::MAX).step_by(Self::STEP as usize).map(Percentile)
    }
}

impl Default for Percentile {
    fn default() -> Self {
        Self(90)
    }
}

impl TryFrom<u8> for Percentile {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Percentile> for u8 {
    fn from(p: Percentile) -> u8 {
        p.0
    }
}

impl std::fmt::Display for Percentile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Percentile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: u8 = s
            .trim()
            .parse()
            .map_err(|_| Error::InvalidParameter(format!("percentile must be a number, got '{}'", s)))?;
        Self::new(value)
    }
}

/// Which node attribute drives node colour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    GeneCount,
    ReadCount,
}

impl ViewMode {
    /// Heading used in tooltips and the dashboard toggle
    pub fn label(self) -> &'static str {
        match self {
            ViewMode::GeneCount => "Total Genes",
            ViewMode::ReadCount => "Read Counts",
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewMode::GeneCount => write!(f, "gene_count"),
            ViewMode::ReadCount => write!(f, "read_count"),
        }
    }
}

impl std::str::FromStr for ViewMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gene_count" | "genes" | "total_genes" => Ok(ViewMode::GeneCount),
            "read_count" | "reads" | "read_counts" => Ok(ViewMode::ReadCount),
            other => Err(Error::InvalidParameter(format!(
                "view must be 'gene_count' or 'read_count', got '{}'",
                other
            ))),
        }
    }
}

/// Genomic window the feature table is filtered to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
}

impl Default for Region {
    fn default() -> Self {
        // EGFR amplicon window on GRCh38 chr7
        Self {
            chromosome: "NC_000007.14".to_string(),
            start: 54_765_000,
            end: 56_050_000,
        }
    }
}

impl Region {
    /// True when the interval lies fully inside the window on the same chromosome
    pub fn contains(&self, chromosome: &str, start: u64, end: u64) -> bool {
        start >= self.start && end <= self.end && chromosome == self.chromosome
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}-{}", self.chromosome, self.start, self.end)
    }
}

/// Display colours for node bands, edges and the focus dimming
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Band A: exactly one gene, or reads above the median
    pub band_a: String,
    /// Band B: two or more genes, or reads above the upper quartile
    pub band_b: String,
    /// Band C: everything else
    pub band_c: String,
    pub edge: String,
    /// Colour given to nodes outside the focused neighbourhood
    pub dimmed: String,
    pub background: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            band_a: "#00CED1".to_string(),
            band_b: "#FFD700".to_string(),
            band_c: "#4B0082".to_string(),
            edge: "#D3D3D3".to_string(),
            dimmed: "#E8E8E8".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }
}

/// Full session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Contact matrix (.npy, .csv or .tsv)
    pub matrix: PathBuf,
    /// Feature table (.csv or .tsv)
    pub features: PathBuf,
    pub region: Region,
    pub percentile: Percentile,
    pub view: ViewMode,
    pub palette: Palette,
    /// Where `render` writes its artifact
    pub output: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            matrix: PathBuf::from("data/GBM39HSR_5k_collapsed_matrix.npy"),
            features: PathBuf::from("data/HSR_features.csv"),
            region: Region::default(),
            percentile: Percentile::default(),
            view: ViewMode::default(),
            palette: Palette::default(),
            output: PathBuf::from("graph.html"),
        }
    }
}

impl Config {
    /// Load a JSON config; missing fields keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: Config = serde_json::from_str(&content).map_err(|e| Error::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // PERCENTILE TESTS
    // ==========================================================================
    //
    // The slider only offers 70, 75, ..., 95. Anything else must be rejected
    // before it reaches the thresholder.
    // ==========================================================================

    #[test]
    fn test_percentile_accepts_slider_values() {
        let values: Vec<u8> = Percentile::all().map(u8::from).collect();
        assert_eq!(values, vec![70, 75, 80, 85, 90, 95]);
        for v in values {
            assert!(Percentile::new(v).is_ok());
        }
    }

    #[test]
    fn test_percentile_rejects_off_step_and_out_of_range() {
        assert!(Percentile::new(72).is_err());
        assert!(Percentile::new(65).is_err());
        assert!(Percentile::new(100).is_err());
        assert!(Percentile::new(0).is_err());
    }

    #[test]
    fn test_percentile_default_is_90() {
        assert_eq!(Percentile::default().value(), 90);
    }

    #[test]
    fn test_percentile_parse() {
        assert_eq!("85".parse::<Percentile>().unwrap().value(), 85);
        assert!("eighty".parse::<Percentile>().is_err());
    }

    #[test]
    fn test_percentile_deserialize_validates() {
        assert!(serde_json::from_str::<Percentile>("75").is_ok());
        assert!(serde_json::from_str::<Percentile>("77").is_err());
    }

    // ==========================================================================
    // VIEW MODE / REGION TESTS
    // ==========================================================================

    #[test]
    fn test_view_mode_parse_aliases() {
        assert_eq!("genes".parse::<ViewMode>().unwrap(), ViewMode::GeneCount);
        assert_eq!("read_count".parse::<ViewMode>().unwrap(), ViewMode::ReadCount);
        assert_eq!("READS".parse::<ViewMode>().unwrap(), ViewMode::ReadCount);
        assert!("heatmap".parse::<ViewMode>().is_err());
    }

    #[test]
    fn test_view_mode_display_roundtrips_through_parse() {
        for mode in [ViewMode::GeneCount, ViewMode::ReadCount] {
            assert_eq!(mode.to_string().parse::<ViewMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_default_region_bounds() {
        let region = Region::default();
        assert!(region.contains("NC_000007.14", 54_765_000, 54_770_000));
        assert!(region.contains("NC_000007.14", 56_045_000, 56_050_000));
        assert!(!region.contains("NC_000007.14", 54_760_000, 54_765_000));
        assert!(!region.contains("NC_000007.14", 56_045_000, 56_050_001));
        assert!(!region.contains("NC_000008.11", 55_000_000, 55_005_000));
        assert_eq!(region.to_string(), "NC_000007.14:54765000-56050000");
    }

    // ==========================================================================
    // CONFIG FILE TESTS
    // ==========================================================================

    #[test]
    fn test_config_partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hiclens.json");
        std::fs::write(&path, r#"{ "percentile": 80, "view": "read_count" }"#).unwrap();

        let config = Config::from_json_file(&path).unwrap();
        assert_eq!(config.percentile.value(), 80);
        assert_eq!(config.view, ViewMode::ReadCount);
        assert_eq!(config.region, Region::default());
        assert_eq!(config.palette, Palette::default());
    }

    #[test]
    fn test_config_rejects_bad_percentile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hiclens.json");
        std::fs::write(&path, r#"{ "percentile": 99 }"#).unwrap();
        assert!(matches!(Config::from_json_file(&path), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_config_malformed_json_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ \"percentile\": ").unwrap();

        let err = Config::from_json_file(&path).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_config_missing_file() {
        assert!(matches!(
            Config::from_json_file("/nonexistent/hiclens.json"),
            Err(Error::Io { .. })
        ));
    }
}
