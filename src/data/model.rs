use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single cell in a table column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common dataframe dtypes.
/// Class values key `BTreeMap`s downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date string kept as text for simplicity.
    Date(String),
    Null,
}

// -- Manual Eq/Ord/Hash so we can put CellValue in BTreeSet --
//
// All three agree: floats compare by `total_cmp` after folding -0.0 into
// 0.0, so equal keys always land in the same map entry.

/// `-0.0` → `0.0`; everything else unchanged.
fn fold_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        fn rank(v: &CellValue) -> u8 {
            match v {
                CellValue::Null => 0,
                CellValue::Bool(_) => 1,
                CellValue::Integer(_) => 2,
                CellValue::Float(_) => 3,
                CellValue::String(_) => 4,
                CellValue::Date(_) => 5,
            }
        }
        match (self, other) {
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (CellValue::Integer(a), CellValue::Integer(b)) => a.cmp(b),
            (CellValue::Float(a), CellValue::Float(b)) => fold_zero(*a).total_cmp(&fold_zero(*b)),
            (CellValue::String(a), CellValue::String(b))
            | (CellValue::Date(a), CellValue::Date(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) | CellValue::Date(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => fold_zero(*f).to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            // Debug formatting keeps the decimal point on whole floats ("1.0").
            CellValue::Float(v) => write!(f, "{v:?}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Float cell with `-0.0` stored as `0.0`, so it also displays as one class.
    pub fn float(v: f64) -> Self {
        CellValue::Float(fold_zero(v))
    }

    /// Null cells and NaN floats carry no class information.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::float(v)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the table
// ---------------------------------------------------------------------------

/// A single row: column_name → value.
pub type Record = BTreeMap<String, CellValue>;

// ---------------------------------------------------------------------------
// TabularDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// A parsed table. Rows are kept in source order; `column_names` keeps the
/// header order of the source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularDataset {
    /// All rows.
    pub rows: Vec<Record>,
    /// Ordered list of column names.
    pub column_names: Vec<String>,
}

impl TabularDataset {
    /// Build a dataset with an explicit column order (e.g. a CSV header).
    pub fn new(column_names: Vec<String>, rows: Vec<Record>) -> Self {
        TabularDataset { rows, column_names }
    }

    /// Build a single-column dataset, mostly useful for tests and samples.
    pub fn from_column<I, V>(column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let rows = values
            .into_iter()
            .map(|v| {
                let mut row = Record::new();
                row.insert(column.to_string(), v.into());
                row
            })
            .collect();
        TabularDataset::new(vec![column.to_string()], rows)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_names.iter().any(|c| c == column)
    }

    /// Sorted set of distinct values in `column`, missing cells excluded.
    pub fn distinct_values(&self, column: &str) -> BTreeSet<&CellValue> {
        self.rows
            .iter()
            .filter_map(|row| row.get(column))
            .filter(|v| !v.is_missing())
            .collect()
    }
}
