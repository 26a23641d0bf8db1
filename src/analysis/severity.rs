use std::fmt;

use serde::Serialize;

/// Lower bound (inclusive) of the mild band.
pub const MILD_LOWER: f64 = 0.2;
/// Upper bound (inclusive) of the mild band.
pub const MILD_UPPER: f64 = 0.4;
/// Lower bound (inclusive) of the moderate band; anything below is extreme.
pub const MODERATE_LOWER: f64 = 0.01;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// How far the smallest class falls behind, derived from the degree of
/// imbalance (minority count / total samples).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Balance,
    Mild,
    Moderate,
    Extreme,
}

impl Severity {
    /// Classify a degree-of-imbalance ratio.
    ///
    /// Bands, checked in this order:
    /// * `0.2 <= r <= 0.4`  → [`Severity::Mild`]
    /// * `0.01 <= r < 0.2`  → [`Severity::Moderate`]
    /// * `r < 0.01`         → [`Severity::Extreme`]
    /// * otherwise          → [`Severity::Balance`]
    ///
    /// Everything above 0.4 counts as balanced, including NaN.
    pub fn classify(ratio: f64) -> Self {
        if (MILD_LOWER..=MILD_UPPER).contains(&ratio) {
            Severity::Mild
        } else if (MODERATE_LOWER..MILD_LOWER).contains(&ratio) {
            Severity::Moderate
        } else if ratio < MODERATE_LOWER {
            Severity::Extreme
        } else {
            Severity::Balance
        }
    }

    /// Display category, e.g. `"Moderate Imbalance"`.
    pub fn category(self) -> &'static str {
        match self {
            Severity::Balance => "Balance",
            Severity::Mild => "Mild Imbalance",
            Severity::Moderate => "Moderate Imbalance",
            Severity::Extreme => "Extreme Imbalance",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Severity::Balance => {
                "The class distribution in your dataset looks balanced. No special \
                 treatment is needed to handle class imbalance."
            }
            Severity::Mild => {
                "A mild level of imbalance was detected. Special treatment may not be \
                 necessary, but keep an eye on it."
            }
            Severity::Moderate => {
                "Your dataset has a moderate level of class imbalance. This can bias \
                 machine learning models towards the majority class."
            }
            Severity::Extreme => {
                "Your dataset has an extreme class imbalance. This will significantly \
                 affect model performance and will most likely lead to poor recognition \
                 of the minority class."
            }
        }
    }

    pub fn recommendation(self) -> Recommendation {
        match self {
            Severity::Balance | Severity::Mild => Recommendation::None,
            Severity::Moderate => Recommendation::SmoteAdasyn,
            Severity::Extreme => Recommendation::KnSmote,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category())
    }
}

// ---------------------------------------------------------------------------
// Recommendation
// ---------------------------------------------------------------------------

/// Suggested family of resampling techniques. Only the name is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    None,
    /// SMOTE or ADASYN oversampling.
    SmoteAdasyn,
    /// k-nearest-neighbour SMOTE variants.
    KnSmote,
}

impl Recommendation {
    /// Stable key, e.g. `"smote_adasyn"`.
    pub fn key(self) -> &'static str {
        match self {
            Recommendation::None => "none",
            Recommendation::SmoteAdasyn => "smote_adasyn",
            Recommendation::KnSmote => "kn_smote",
        }
    }

    /// Short human-readable advice for presenters.
    pub fn advice(self) -> &'static str {
        match self {
            Recommendation::None => "No resampling needed.",
            Recommendation::SmoteAdasyn => {
                "Consider oversampling the minority class with SMOTE or ADASYN."
            }
            Recommendation::KnSmote => {
                "Consider k-nearest-neighbour SMOTE variants, possibly combined with \
                 undersampling of the majority class."
            }
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
