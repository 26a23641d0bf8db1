/// Data layer: core table types and loading.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → TabularDataset
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ TabularDataset │  Vec<Record>, ordered column names
///   └────────────────┘
///        │
///        ▼
///   analysis::analyze(dataset, target_column)
/// ```

pub mod loader;
pub mod model;
