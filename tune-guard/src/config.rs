//! Caller-facing configuration.
//!
//! The library reads no files or environment variables. Hosts deserialize a
//! [`GuardConfig`] from wherever they keep settings and build components
//! from it.

use serde::{Deserialize, Serialize};

use crate::anomaly::{AnomalyHighlighter, DEFAULT_THRESHOLD};
use crate::error::{Result, TuneError};
use crate::export::{ChangeListExporter, ExportOptions, TableExporter};

/// Settings for highlighting and export.
///
/// # Examples
///
/// ```rust
/// use tune_guard::config::GuardConfig;
///
/// let config = GuardConfig::from_json(r#"{"anomalyThreshold": 0.25}"#).unwrap();
/// assert_eq!(config.anomaly_threshold, 0.25);
/// assert_eq!(config.export.delimiter, ',');
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuardConfig {
    /// Relative neighbor change above which a cell is flagged
    pub anomaly_threshold: f64,
    pub export: ExportOptions,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            anomaly_threshold: DEFAULT_THRESHOLD,
            export: ExportOptions::default(),
        }
    }
}

impl GuardConfig {
    /// Parses and validates a configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_anomaly_threshold(mut self, threshold: f64) -> Self {
        self.anomaly_threshold = threshold;
        self
    }

    pub fn with_export(mut self, export: ExportOptions) -> Self {
        self.export = export;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.anomaly_threshold.is_finite() || self.anomaly_threshold < 0.0 {
            return Err(TuneError::configuration(format!(
                "anomalyThreshold must be finite and non-negative, got: {}",
                self.anomaly_threshold
            )));
        }
        self.export.validate()
    }

    pub fn highlighter(&self) -> Result<AnomalyHighlighter> {
        AnomalyHighlighter::new(self.anomaly_threshold)
    }

    pub fn table_exporter(&self) -> TableExporter {
        TableExporter::with_options(self.export.clone())
    }

    pub fn change_list_exporter(&self) -> ChangeListExporter {
        ChangeListExporter::new().with_options(self.export.clone())
    }
}
