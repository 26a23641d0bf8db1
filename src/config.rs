//! Application configuration, loaded from TOML. Every field has a default,
//! so an empty file (or no file at all) is a valid configuration.
//!
//! ```toml
//! [analysis]
//! target_column = "Class"
//!
//! [charts]
//! bar_width = 1000
//! bar_height = 600
//! pie_size = 800
//! palette = ["#3498db", "#2ecc71", "#e74c3c", "#f1c40f", "#9b59b6"]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Column analysed when nothing else is configured.
pub const DEFAULT_TARGET_COLUMN: &str = "Class";

/// Colours cycled through for pie wedges; the first one also fills the bars.
pub const DEFAULT_PALETTE: [&str; 5] = ["#3498db", "#2ecc71", "#e74c3c", "#f1c40f", "#9b59b6"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub charts: ChartsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Column whose values are the classes.
    pub target_column: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartsConfig {
    pub bar_width: u32,
    pub bar_height: u32,
    pub pie_size: u32,
    /// `#rrggbb` colours.
    pub palette: Vec<String>,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            bar_width: 1000,
            bar_height: 600,
            pie_size: 800,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::debug!("loaded config from {}: {config:?}", path.display());
        Ok(config)
    }

    /// Load from `path` when given, otherwise fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: AppConfig = toml::from_str("").expect("parse");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.analysis.target_column, "Class");
        assert_eq!(config.charts.palette.len(), 5);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [analysis]
            target_column = "label"

            [charts]
            pie_size = 400
            "#,
        )
        .expect("parse");
        assert_eq!(config.analysis.target_column, "label");
        assert_eq!(config.charts.pie_size, 400);
        assert_eq!(config.charts.bar_width, 1000);
    }

    #[test]
    fn load_reads_file_or_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "[analysis]\ntarget_column = \"y\"").expect("write");
        let config = AppConfig::load(Some(file.path())).expect("load");
        assert_eq!(config.analysis.target_column, "y");

        assert_eq!(AppConfig::load(None).expect("defaults"), AppConfig::default());
        assert!(AppConfig::load(Some(Path::new("/nonexistent/config.toml"))).is_err());
    }
}
