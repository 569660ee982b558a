//! Analysis thresholds and numeric settings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings shared by the contingency analyzer, the regression fitter and
/// the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Decision threshold for rejecting independence / flagging coefficients.
    pub significance_level: f64,
    /// Expected cell counts below this mark a chi-square result low-validity.
    pub min_expected_count: f64,
    /// Apply Yates' continuity correction to 2x2 tables.
    pub yates_correction: bool,
    /// IRLS stops once the L2 norm of the coefficient update drops below this.
    pub tolerance: f64,
    pub max_iterations: usize,
    /// Fixed histogram bin count; Sturges' rule when unset.
    pub histogram_bins: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            significance_level: 0.05,
            min_expected_count: 5.0,
            yates_correction: false,
            tolerance: 1e-6,
            max_iterations: 100,
            histogram_bins: None,
        }
    }
}

impl AnalysisConfig {
    /// Load a JSON config file. Keys left out keep their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "significance_level must be in (0, 1), got {}",
                self.significance_level
            )));
        }
        if !(self.min_expected_count >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "min_expected_count must be non-negative, got {}",
                self.min_expected_count
            )));
        }
        if !(self.tolerance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::Invalid("max_iterations must be at least 1".into()));
        }
        if self.histogram_bins == Some(0) {
            return Err(ConfigError::Invalid("histogram_bins must be at least 1".into()));
        }
        Ok(())
    }
}
