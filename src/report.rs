//! Presenting an [`AnalysisResult`]: JSON, plain text, chart files, and the
//! mapping of analysis errors to client- or server-class outcomes.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::analysis::{AnalysisError, AnalysisResult};
use crate::chart::RenderedCharts;
use crate::data::loader::FormatError;

pub const REPORT_FILE: &str = "report.json";
pub const BAR_CHART_FILE: &str = "bar_chart.png";
pub const PIE_CHART_FILE: &str = "pie_chart.png";

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// File the dataset was loaded from, when known.
    pub source: Option<String>,
    #[serde(flatten)]
    pub analysis: AnalysisResult,
}

impl Report {
    pub fn new(analysis: AnalysisResult, source: Option<&Path>) -> Self {
        Report {
            source: source.map(|p| p.display().to_string()),
            analysis,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serializing report")
    }

    /// Human-readable summary: verdict, key stats and the class table.
    pub fn to_text(&self) -> String {
        let a = &self.analysis;
        let stats = &a.key_stats;
        let mut out = String::new();

        // Writing into a String cannot fail.
        if let Some(source) = &self.source {
            let _ = writeln!(out, "Dataset:     {source}");
        }
        let _ = writeln!(out, "Target:      {}", a.target_column);
        let _ = writeln!(out, "Category:    {}", a.category);
        let _ = writeln!(out, "             {}", a.description);
        let _ = writeln!(
            out,
            "Recommend:   {} ({})",
            a.recommendation.advice(),
            a.recommendation_key
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "Total samples:            {}", stats.total_samples);
        let _ = writeln!(out, "Classes:                  {}", stats.num_classes);
        let _ = writeln!(out, "Degree of imbalance:      {}", stats.degree_of_imbalance);
        let _ = writeln!(out, "Distribution difference:  {}", stats.distribution_difference);
        let _ = writeln!(out);

        let name_w = a
            .class_details
            .iter()
            .map(|d| d.name.chars().count())
            .max()
            .unwrap_or(0)
            .max("Class".len());
        let _ = writeln!(out, "{:<name_w$}  {:>10}  {:>8}  Label", "Class", "Count", "Share");
        for d in &a.class_details {
            let label = d.label.map(|l| l.as_str()).unwrap_or("");
            let _ = writeln!(
                out,
                "{:<name_w$}  {:>10}  {:>8}  {label}",
                d.name, d.count, d.percentage_display
            );
        }
        out
    }
}

/// Write `report.json` and, when given, both chart PNGs into `dir`.
/// Returns the paths written.
pub fn write_outputs(
    dir: &Path,
    report: &Report,
    charts: Option<&RenderedCharts>,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    let mut written = Vec::new();
    let mut write = |name: &str, bytes: &[u8]| -> Result<()> {
        let path = dir.join(name);
        std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
        log::info!("wrote {}", path.display());
        written.push(path);
        Ok(())
    };

    write(REPORT_FILE, report.to_json()?.as_bytes())?;
    if let Some(charts) = charts {
        write(BAR_CHART_FILE, &charts.bar_chart)?;
        write(PIE_CHART_FILE, &charts.pie_chart)?;
    }
    Ok(written)
}

// ---------------------------------------------------------------------------
// Error presentation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The input can be fixed by whoever supplied it.
    Client,
    Server,
}

/// User-facing form of a failed analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    /// HTTP-equivalent status: 400 for client errors, 500 otherwise.
    pub status: u16,
    pub message: String,
}

impl ErrorReport {
    pub fn from_analysis_error(err: &AnalysisError) -> Self {
        match err {
            AnalysisError::Validation(v) => ErrorReport {
                kind: ErrorKind::Client,
                status: 400,
                message: v.to_string(),
            },
            AnalysisError::Unexpected { .. } => Self::server(err),
        }
    }

    /// A rejected file format is the uploader's to fix; any other load
    /// failure (I/O, malformed content) is reported as a server error.
    pub fn from_load_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<FormatError>() {
            Some(format) => ErrorReport {
                kind: ErrorKind::Client,
                status: 400,
                message: format.to_string(),
            },
            None => Self::server(format!("{err:#}")),
        }
    }

    /// Generic failure message for anything that is not a validation error.
    pub fn server(cause: impl std::fmt::Display) -> Self {
        ErrorReport {
            kind: ErrorKind::Server,
            status: 500,
            message: format!("An error occurred while processing your file: {cause}"),
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.kind == ErrorKind::Client
    }
}
