use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Date32Array, Float32Array, Float64Array, Int32Array,
    Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{CellValue, Record, TabularDataset};

/// Extensions accepted by [`load_file`], for file dialogs and error messages.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "json", "parquet", "pq"];

/// The file was rejected on its extension alone; the user can fix this by
/// converting the file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Excel workbooks are not supported; export the sheet as .csv (accepted: {accepted})")]
    Excel { accepted: String },
    #[error("Unsupported file extension: .{extension} (accepted: {accepted})")]
    Unsupported { extension: String, accepted: String },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row followed by one record per line
/// * `.json`    – `[{ "col": value, ... }, ...]` (records orientation)
/// * `.parquet` – flat Parquet file with scalar columns
pub fn load_file(path: &Path) -> Result<TabularDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening CSV {}", path.display()))?;
            load_csv_reader(file)
        }
        "json" => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading JSON {}", path.display()))?;
            load_json_str(&text)
        }
        "parquet" | "pq" => load_parquet(path),
        "xls" | "xlsx" => Err(FormatError::Excel {
            accepted: SUPPORTED_EXTENSIONS.join(", "),
        }
        .into()),
        other => Err(FormatError::Unsupported {
            extension: other.to_string(),
            accepted: SUPPORTED_EXTENSIONS.join(", "),
        }
        .into()),
    };

    match &dataset {
        Ok(ds) => log::info!(
            "Loaded {} rows with columns {:?} from {}",
            ds.len(),
            ds.column_names,
            path.display()
        ),
        Err(e) => log::warn!("Failed to load {}: {e:#}", path.display()),
    }
    dataset
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
/// Each column gets a single type from all of its cells (see [`ColumnKind`]),
/// so `1` and `1.0` in one column load as the same float.
pub fn load_csv_reader<R: Read>(reader: R) -> Result<TabularDataset> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        bail!("CSV has no header row");
    }

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        records.push(result.with_context(|| format!("CSV row {row_no}"))?);
    }

    let kinds: Vec<ColumnKind> = (0..headers.len())
        .map(|col_idx| {
            ColumnKind::infer(
                records
                    .iter()
                    .map(|r| r.get(col_idx).unwrap_or("").trim())
                    .filter(|s| !s.is_empty()),
            )
        })
        .collect();
    log::debug!("CSV column types: {kinds:?}");

    let rows = records
        .iter()
        .map(|record| {
            headers
                .iter()
                .zip(&kinds)
                .enumerate()
                .map(|(col_idx, (name, kind))| {
                    let value = record.get(col_idx).unwrap_or("");
                    (name.clone(), kind.parse(value))
                })
                .collect::<Record>()
        })
        .collect();

    Ok(TabularDataset::new(headers, rows))
}

/// Column dtype inferred from every non-empty cell, narrowest first:
/// integer, float, bool, and finally string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Bool,
    String,
}

impl ColumnKind {
    /// Narrowest kind every cell parses as. An all-empty column is `String`.
    pub fn infer<'a, I>(cells: I) -> ColumnKind
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut int = true;
        let mut float = true;
        let mut boolean = true;
        let mut any = false;
        for cell in cells {
            any = true;
            int &= cell.parse::<i64>().is_ok();
            float &= cell.parse::<f64>().is_ok();
            boolean &= parse_bool(cell).is_some();
            if !(int || float || boolean) {
                return ColumnKind::String;
            }
        }
        match (any, int, float, boolean) {
            (false, ..) => ColumnKind::String,
            (_, true, ..) => ColumnKind::Integer,
            (_, _, true, _) => ColumnKind::Float,
            (_, _, _, true) => ColumnKind::Bool,
            _ => ColumnKind::String,
        }
    }

    /// Parse one raw cell as this kind; empty cells are `Null`.
    pub fn parse(self, raw: &str) -> CellValue {
        let s = raw.trim();
        if s.is_empty() {
            return CellValue::Null;
        }
        let parsed = match self {
            ColumnKind::Integer => s.parse::<i64>().ok().map(CellValue::Integer),
            ColumnKind::Float => s.parse::<f64>().ok().map(CellValue::float),
            ColumnKind::Bool => parse_bool(s).map(CellValue::Bool),
            ColumnKind::String => None,
        };
        parsed.unwrap_or_else(|| CellValue::String(s.to_string()))
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "amount": 12.5, "Class": 0 },
///   { "amount": 310.0, "Class": 1 }
/// ]
/// ```
///
/// Columns are listed in the order they are first seen while walking the
/// records; keys appearing only in later records are appended. A column that
/// mixes integers and floats is widened to floats.
pub fn load_json_str(text: &str) -> Result<TabularDataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut column_names: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut row = Record::new();
        for (key, val) in obj {
            if !column_names.contains(key) {
                column_names.push(key.clone());
            }
            row.insert(key.clone(), json_to_cell(val));
        }
        rows.push(row);
    }

    for column in &column_names {
        widen_mixed_numbers(&mut rows, column);
    }

    Ok(TabularDataset::new(column_names, rows))
}

/// `Integer` → `Float` for a column that holds both.
fn widen_mixed_numbers(rows: &mut [Record], column: &str) {
    let has_int = rows
        .iter()
        .any(|row| matches!(row.get(column), Some(CellValue::Integer(_))));
    let has_float = rows
        .iter()
        .any(|row| matches!(row.get(column), Some(CellValue::Float(_))));
    if !(has_int && has_float) {
        return;
    }
    for cell in rows.iter_mut().filter_map(|row| row.get_mut(column)) {
        if let CellValue::Integer(i) = *cell {
            *cell = CellValue::float(i as f64);
        }
    }
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file. Every column becomes a table column; scalar
/// types map onto [`CellValue`], anything else is kept as its debug text.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<TabularDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let column_names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let n_rows = batch.num_rows();

        for row in 0..n_rows {
            let mut record = Record::new();
            for (col_idx, col_name) in column_names.iter().enumerate() {
                let value = extract_cell_value(batch.column(col_idx), row)
                    .with_context(|| format!("Row {row}: failed to read '{col_name}'"))?;
                record.insert(col_name.clone(), value);
            }
            rows.push(record);
        }
    }

    Ok(TabularDataset::new(column_names, rows))
}

// -- Arrow helpers --

fn downcast<'a, T: 'static>(col: &'a Arc<dyn Array>) -> Result<&'a T> {
    col.as_any()
        .downcast_ref::<T>()
        .with_context(|| format!("unexpected array layout for {:?}", col.data_type()))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell_value(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => CellValue::String(downcast::<StringArray>(col)?.value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(downcast::<Int32Array>(col)?.value(row) as i64),
        DataType::Int64 => CellValue::Integer(downcast::<Int64Array>(col)?.value(row)),
        DataType::Float32 => CellValue::float(downcast::<Float32Array>(col)?.value(row) as f64),
        DataType::Float64 => CellValue::float(downcast::<Float64Array>(col)?.value(row)),
        DataType::Boolean => CellValue::Bool(downcast::<BooleanArray>(col)?.value(row)),
        DataType::Date32 => match downcast::<Date32Array>(col)?.value_as_date(row) {
            Some(date) => CellValue::Date(date.to_string()),
            None => CellValue::Null,
        },
        other => CellValue::String(format!("{other:?}")),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn csv_keeps_header_order_and_types_whole_columns() {
        let text = "amount,Class,flag\n12.5,0,true\n3,1,False\n,1,\n";
        let ds = load_csv_reader(text.as_bytes()).expect("load csv");

        assert_eq!(ds.column_names, vec!["amount", "Class", "flag"]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.rows[0]["amount"], CellValue::Float(12.5));
        assert_eq!(ds.rows[1]["amount"], CellValue::Float(3.0));
        assert_eq!(ds.rows[1]["flag"], CellValue::Bool(false));
        assert_eq!(ds.rows[2]["amount"], CellValue::Null);
        assert_eq!(ds.rows[0]["flag"], CellValue::Bool(true));
        assert_eq!(ds.rows[1]["Class"], CellValue::Integer(1));
    }

    #[test]
    fn csv_mixed_int_and_float_labels_share_one_class() {
        let ds = load_csv_reader("Class\n0\n1\n1.0\n0\n".as_bytes()).expect("load csv");
        assert_eq!(ds.rows[1]["Class"], ds.rows[2]["Class"]);
        assert_eq!(ds.rows[2]["Class"], CellValue::Float(1.0));
        assert_eq!(ds.distinct_values("Class").len(), 2);

        let result = crate::analysis::analyze(&ds, "Class").expect("analyze");
        assert_eq!(result.metrics.num_classes, 2);
        let names: Vec<&str> = result.class_details.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["0.0", "1.0"]);
    }

    #[test]
    fn csv_column_with_any_text_stays_text() {
        let ds = load_csv_reader("Class\n1\na\n1\n".as_bytes()).expect("load csv");
        assert_eq!(ds.rows[0]["Class"], CellValue::from("1"));
        assert_eq!(ds.rows[1]["Class"], CellValue::from("a"));
    }

    #[test]
    fn column_kind_picks_the_narrowest_common_type() {
        assert_eq!(ColumnKind::infer(["1", "-2"]), ColumnKind::Integer);
        assert_eq!(ColumnKind::infer(["1", "2.5"]), ColumnKind::Float);
        assert_eq!(ColumnKind::infer(["TRUE", "false"]), ColumnKind::Bool);
        assert_eq!(ColumnKind::infer(["true", "1"]), ColumnKind::String);
        assert_eq!(ColumnKind::infer(std::iter::empty()), ColumnKind::String);
        assert_eq!(ColumnKind::Float.parse("-0"), CellValue::Float(0.0));
        assert_eq!(ColumnKind::Integer.parse(" "), CellValue::Null);
    }

    #[test]
    fn csv_with_ragged_row_is_an_error() {
        let text = "a,Class\n1,0\n2\n";
        assert!(load_csv_reader(text.as_bytes()).is_err());
    }

    #[test]
    fn json_records_are_loaded_in_first_seen_column_order() {
        let text = r#"[{"z": 1, "Class": "fraud"}, {"z": 2.5, "Class": "ok", "extra": null}]"#;
        let ds = load_json_str(text).expect("load json");

        assert_eq!(ds.column_names, vec!["Class", "z", "extra"]);
        assert_eq!(ds.rows[0]["Class"], CellValue::from("fraud"));
        assert_eq!(ds.rows[1]["z"], CellValue::Float(2.5));
        assert_eq!(ds.rows[1]["extra"], CellValue::Null);
    }

    #[test]
    fn json_mixed_int_and_float_labels_share_one_class() {
        let ds = load_json_str(r#"[{"Class": 1}, {"Class": 1.0}, {"Class": 0}]"#)
            .expect("load json");
        assert_eq!(ds.rows[0]["Class"], CellValue::Float(1.0));
        assert_eq!(ds.rows[2]["Class"], CellValue::Float(0.0));
        assert_eq!(ds.distinct_values("Class").len(), 2);

        let ints = load_json_str(r#"[{"Class": 1}, {"Class": 0}]"#).expect("load json");
        assert_eq!(ints.rows[0]["Class"], CellValue::Integer(1));
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        assert!(load_json_str(r#"{"Class": 1}"#).is_err());
        assert!(load_json_str(r#"[1, 2]"#).is_err());
    }

    #[test]
    fn load_file_dispatches_on_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.CSV");
        let mut file = std::fs::File::create(&path).expect("create");
        writeln!(file, "Class\na\nb").expect("write");
        drop(file);

        let ds = load_file(&path).expect("load");
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn excel_and_unknown_extensions_are_rejected() {
        let err = load_file(Path::new("upload.xlsx")).unwrap_err();
        assert!(format!("{err:#}").contains("Excel"));
        assert!(matches!(
            err.downcast_ref::<FormatError>(),
            Some(FormatError::Excel { .. })
        ));

        let err = load_file(Path::new("upload.txt")).unwrap_err();
        assert!(format!("{err:#}").contains(".txt"));
        assert_eq!(
            err.downcast_ref::<FormatError>(),
            Some(&FormatError::Unsupported {
                extension: "txt".into(),
                accepted: "csv, json, parquet, pq".into(),
            })
        );
    }

    #[test]
    fn read_failures_are_not_format_errors() {
        let err = load_file(Path::new("does-not-exist.csv")).unwrap_err();
        assert!(err.downcast_ref::<FormatError>().is_none());
    }
}
