//! Dashboard settings, read from an optional JSON file next to the binary's
//! working directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default location of the settings file.
pub const CONFIG_FILE: &str = "credit_risk_dashboard.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Prediction table opened at startup.
    pub data_path: PathBuf,
    /// Bins of the probability histogram.
    pub histogram_bins: usize,
    /// Rows shown in the customer preview.
    pub preview_rows: usize,
    /// Initial age window, clamped to the observed ages.
    pub default_age_window: (i64, i64),
    /// Initial income window, clamped to the observed incomes.
    pub default_income_window: (i64, i64),
    pub default_threshold: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("credit_risk_predictions.csv"),
            histogram_bins: 40,
            preview_rows: 50,
            default_age_window: (20, 60),
            default_income_window: (2000, 10000),
            default_threshold: 0.5,
        }
    }
}

impl DashboardConfig {
    /// Parse a settings file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Load from `path` if present; otherwise return defaults. A malformed
    /// file is logged and ignored.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("no {} found, using default settings", path.display());
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(cfg) => {
                log::info!("loaded settings from {}", path.display());
                cfg
            }
            Err(e) => {
                log::warn!("ignoring settings file: {e:#}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_layout() {
        let c = DashboardConfig::load(Path::new("nonexistent-settings.json"));
        assert_eq!(c, DashboardConfig::default());
        assert_eq!(c.histogram_bins, 40);
        assert_eq!(c.preview_rows, 50);
        assert_eq!(c.default_income_window, (2000, 10000));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "histogram_bins": 25, "data_path": "scores.parquet" }"#).unwrap();

        let c = DashboardConfig::load(&path);
        assert_eq!(c.histogram_bins, 25);
        assert_eq!(c.data_path, PathBuf::from("scores.parquet"));
        assert_eq!(c.preview_rows, 50);
        assert_eq!(c.default_threshold, 0.5);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();

        assert!(DashboardConfig::from_file(&path).is_err());
        assert_eq!(DashboardConfig::load(&path), DashboardConfig::default());
    }
}
