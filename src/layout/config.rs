//! Configuration for constraint detection

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Tolerances and thresholds used by the constraint detector.
///
/// Detection is deliberately looser than satisfaction for alignment
/// (`alignment_threshold` vs `alignment_tolerance`) so a freshly detected
/// constraint is re-verified against a tighter band.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Max distance from a cluster's reference value to join an alignment group
    pub alignment_threshold: f64,

    /// Tolerance stored on emitted alignment constraints
    pub alignment_tolerance: f64,

    /// Tolerance stored on emitted spacing constraints
    pub spacing_tolerance: f64,

    /// Gaps at or above this are not considered spacing relationships
    pub max_spacing_gap: f64,

    /// Max cross-axis center distance for two objects to share a row or column
    pub row_tolerance: f64,

    /// Max deviation of a gap from the mean gap in a distributed row
    pub distribution_tolerance: f64,

    /// Max column x disagreement across grid rows
    pub grid_tolerance: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            alignment_threshold: 3.0,
            alignment_tolerance: 2.0,
            spacing_tolerance: 3.0,
            max_spacing_gap: 200.0,
            row_tolerance: 5.0,
            distribution_tolerance: 5.0,
            grid_tolerance: 5.0,
        }
    }
}

#[derive(Deserialize)]
struct TomlConfig {
    #[serde(default)]
    detector: DetectorConfig,
}

impl DetectorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the alignment clustering threshold and the stored satisfaction tolerance
    pub fn with_alignment(mut self, threshold: f64, tolerance: f64) -> Self {
        self.alignment_threshold = threshold;
        self.alignment_tolerance = tolerance;
        self
    }

    /// Set the spacing tolerance
    pub fn with_spacing_tolerance(mut self, tolerance: f64) -> Self {
        self.spacing_tolerance = tolerance;
        self
    }

    /// Set the largest gap still treated as a spacing relationship
    pub fn with_max_spacing_gap(mut self, gap: f64) -> Self {
        self.max_spacing_gap = gap;
        self
    }

    /// Set the row/column grouping tolerance
    pub fn with_row_tolerance(mut self, tolerance: f64) -> Self {
        self.row_tolerance = tolerance;
        self
    }

    /// Set the distribution consistency tolerance
    pub fn with_distribution_tolerance(mut self, tolerance: f64) -> Self {
        self.distribution_tolerance = tolerance;
        self
    }

    /// Set the grid column agreement tolerance
    pub fn with_grid_tolerance(mut self, tolerance: f64) -> Self {
        self.grid_tolerance = tolerance;
        self
    }

    /// Load from a TOML string with an optional `[detector]` table
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        Ok(parsed.detector)
    }

    /// Load from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
