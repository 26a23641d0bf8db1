use std::collections::BTreeMap;

use serde::Serialize;

use super::error::{AnalysisError, MIN_CLASSES, ValidationError};
use super::severity::{Recommendation, Severity};
use crate::config::AnalysisConfig;
use crate::data::model::{CellValue, TabularDataset};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Occurrences of one class value in the target column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassCount {
    pub value: CellValue,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClassLabel {
    Majority,
    Minority,
}

impl ClassLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassLabel::Majority => "Majority",
            ClassLabel::Minority => "Minority",
        }
    }
}

/// Presentation-ready row of the class table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDetail {
    pub name: String,
    pub count: usize,
    /// Share of all samples, 0–100, unrounded.
    pub percentage: f64,
    /// `percentage` with one decimal and a trailing `%`.
    pub percentage_display: String,
    pub is_majority: bool,
    pub is_minority: bool,
    /// `Majority` wins when a class holds both the max and the min count.
    pub label: Option<ClassLabel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImbalanceMetrics {
    pub total_samples: usize,
    pub num_classes: usize,
    /// Smallest class count / total samples, in `[0, 1]`.
    pub degree_of_imbalance: f64,
    pub majority_percentage: f64,
    pub minority_percentage: f64,
    /// `majority_percentage - minority_percentage`, in percentage points.
    pub distribution_difference: f64,
}

/// Display strings for [`ImbalanceMetrics`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyStats {
    pub total_samples: usize,
    pub num_classes: usize,
    /// e.g. `"5.00%"`
    pub degree_of_imbalance: String,
    /// e.g. `"90.0%"`
    pub distribution_difference: String,
}

impl From<&ImbalanceMetrics> for KeyStats {
    fn from(m: &ImbalanceMetrics) -> Self {
        KeyStats {
            total_samples: m.total_samples,
            num_classes: m.num_classes,
            degree_of_imbalance: format!("{:.2}%", m.degree_of_imbalance * 100.0),
            distribution_difference: format!("{:.1}%", m.distribution_difference),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub target_column: String,
    pub severity: Severity,
    pub category: String,
    pub description: String,
    pub recommendation: Recommendation,
    pub recommendation_key: String,
    pub metrics: ImbalanceMetrics,
    pub key_stats: KeyStats,
    /// Ordered by descending count.
    pub class_details: Vec<ClassDetail>,
    /// Same order as `class_details`; this is what the charts are drawn from.
    pub class_counts: Vec<ClassCount>,
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Analyses the class distribution of one configured target column.
#[derive(Debug, Clone)]
pub struct ImbalanceAnalyzer {
    target_column: String,
}

impl Default for ImbalanceAnalyzer {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl ImbalanceAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            target_column: config.target_column.clone(),
        }
    }

    pub fn with_target_column(column: impl Into<String>) -> Self {
        Self {
            target_column: column.into(),
        }
    }

    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    pub fn analyze(&self, dataset: &TabularDataset) -> Result<AnalysisResult, AnalysisError> {
        analyze(dataset, &self.target_column)
    }
}

/// Compute class statistics and the imbalance severity of `target_column`.
///
/// Validation runs first and the first failure wins: a missing column, then
/// fewer than two distinct classes. A row whose target cell is absent, null
/// or NaN is reported afterwards as [`AnalysisError::Unexpected`].
pub fn analyze(
    dataset: &TabularDataset,
    target_column: &str,
) -> Result<AnalysisResult, AnalysisError> {
    if !dataset.has_column(target_column) {
        return Err(ValidationError::MissingColumn {
            column: target_column.to_string(),
        }
        .into());
    }

    let found = dataset.distinct_values(target_column).len();
    if found < MIN_CLASSES {
        return Err(ValidationError::InsufficientClasses {
            column: target_column.to_string(),
            found,
        }
        .into());
    }

    let tally = tally_classes(dataset, target_column);
    if let Some(problem) = tally.malformed {
        return Err(AnalysisError::unexpected(problem));
    }

    let class_counts = tally.into_sorted_counts();
    log::debug!("class counts for '{target_column}': {class_counts:?}");

    let total_samples = dataset.len();
    let total = total_samples as f64;

    // Non-empty: at least MIN_CLASSES entries survived validation.
    let max_count = class_counts[0].count;
    let min_count = class_counts[class_counts.len() - 1].count;

    let class_details = class_counts
        .iter()
        .map(|cc| {
            let percentage = cc.count as f64 / total * 100.0;
            let is_majority = cc.count == max_count;
            let is_minority = cc.count == min_count;
            let label = if is_majority {
                Some(ClassLabel::Majority)
            } else if is_minority {
                Some(ClassLabel::Minority)
            } else {
                None
            };
            ClassDetail {
                name: cc.value.to_string(),
                count: cc.count,
                percentage,
                percentage_display: format!("{percentage:.1}%"),
                is_majority,
                is_minority,
                label,
            }
        })
        .collect();

    let majority_percentage = max_count as f64 / total * 100.0;
    let minority_percentage = min_count as f64 / total * 100.0;
    let metrics = ImbalanceMetrics {
        total_samples,
        num_classes: class_counts.len(),
        degree_of_imbalance: min_count as f64 / total,
        majority_percentage,
        minority_percentage,
        distribution_difference: majority_percentage - minority_percentage,
    };

    let severity = Severity::classify(metrics.degree_of_imbalance);
    let recommendation = severity.recommendation();
    log::info!(
        "analysed {total_samples} rows of '{target_column}': {} classes, r = {:.4} → {severity}",
        metrics.num_classes,
        metrics.degree_of_imbalance
    );

    Ok(AnalysisResult {
        target_column: target_column.to_string(),
        severity,
        category: severity.category().to_string(),
        description: severity.description().to_string(),
        recommendation,
        recommendation_key: recommendation.key().to_string(),
        key_stats: KeyStats::from(&metrics),
        metrics,
        class_details,
        class_counts,
    })
}

// -- Counting --

struct ClassTally {
    counts: BTreeMap<CellValue, usize>,
    /// Description of the first row without a usable target value.
    malformed: Option<String>,
}

impl ClassTally {
    /// Descending count; ties keep ascending value order.
    fn into_sorted_counts(self) -> Vec<ClassCount> {
        let mut counts: Vec<ClassCount> = self
            .counts
            .into_iter()
            .map(|(value, count)| ClassCount { value, count })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts
    }
}

fn tally_classes(dataset: &TabularDataset, column: &str) -> ClassTally {
    let mut counts = BTreeMap::new();
    let mut malformed = None;

    for (i, row) in dataset.rows.iter().enumerate() {
        match row.get(column) {
            Some(value) if !value.is_missing() => {
                *counts.entry(value.clone()).or_insert(0) += 1;
            }
            Some(_) => {
                malformed.get_or_insert_with(|| {
                    format!("row {i} has a missing value in target column '{column}'")
                });
            }
            None => {
                malformed.get_or_insert_with(|| {
                    format!("row {i} does not contain target column '{column}'")
                });
            }
        }
    }

    ClassTally { counts, malformed }
}
