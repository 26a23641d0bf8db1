//! Class-imbalance analysis of a single target column.
//!
//! ```text
//!   TabularDataset + target column
//!        │
//!        ▼
//!   validate (column present, ≥ 2 classes)
//!        │
//!        ▼
//!   count classes → percentages, majority / minority labels
//!        │
//!        ▼
//!   degree of imbalance r = min count / total → Severity → Recommendation
//! ```
//!
//! Everything here is pure: no I/O, no shared state.

pub mod analyzer;
pub mod error;
pub mod severity;

pub use analyzer::{
    AnalysisResult, ClassCount, ClassDetail, ClassLabel, ImbalanceAnalyzer, ImbalanceMetrics,
    KeyStats, analyze,
};
pub use error::{AnalysisError, ValidationError};
pub use severity::{Recommendation, Severity};
