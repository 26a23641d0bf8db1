//! End-to-end: file on disk → loader → analysis → charts → report files.

use std::io::Write;

use imbalance_viewer::analysis::{AnalysisError, ImbalanceAnalyzer, Recommendation, Severity};
use imbalance_viewer::chart::{ChartStyle, render_charts};
use imbalance_viewer::config::AppConfig;
use imbalance_viewer::data::loader::load_file;
use imbalance_viewer::report::{
    BAR_CHART_FILE, ErrorReport, PIE_CHART_FILE, REPORT_FILE, Report, write_outputs,
};

fn write_csv(dir: &std::path::Path, name: &str, rows: &[(f64, &str)]) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).expect("create csv");
    writeln!(file, "amount,Class").expect("header");
    for (amount, class) in rows {
        writeln!(file, "{amount},{class}").expect("row");
    }
    path
}

#[test]
fn csv_file_to_report_and_charts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut rows = vec![(10.0, "0"); 990];
    rows.extend(vec![(999.0, "1"); 10]);
    let path = write_csv(dir.path(), "transactions.csv", &rows);

    let config = AppConfig::default();
    let dataset = load_file(&path).expect("load");
    let analysis = ImbalanceAnalyzer::new(&config.analysis)
        .analyze(&dataset)
        .expect("analyze");

    assert_eq!(analysis.severity, Severity::Moderate);
    assert_eq!(analysis.recommendation, Recommendation::SmoteAdasyn);
    assert_eq!(analysis.key_stats.degree_of_imbalance, "1.00%");
    assert_eq!(analysis.key_stats.distribution_difference, "98.0%");
    assert_eq!(analysis.class_details[0].name, "0");
    assert_eq!(analysis.class_details[0].percentage_display, "99.0%");

    let charts = render_charts(&analysis.class_counts, &ChartStyle::from(&config.charts))
        .expect("charts");
    let report = Report::new(analysis, Some(&path));
    let out = dir.path().join("out");
    write_outputs(&out, &report, Some(&charts)).expect("write outputs");

    for name in [REPORT_FILE, BAR_CHART_FILE, PIE_CHART_FILE] {
        assert!(out.join(name).is_file(), "{name} missing");
    }
    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(out.join(REPORT_FILE)).expect("read"))
            .expect("parse");
    assert_eq!(json["recommendation_key"], "smote_adasyn");
    assert_eq!(json["metrics"]["total_samples"], 1000);
}

#[test]
fn json_dataset_with_custom_target_column() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("labels.json");
    std::fs::write(
        &path,
        r#"[{"label": "cat"}, {"label": "dog"}, {"label": "cat"}, {"label": "dog"}]"#,
    )
    .expect("write");

    let dataset = load_file(&path).expect("load");
    let analysis = ImbalanceAnalyzer::with_target_column("label")
        .analyze(&dataset)
        .expect("analyze");
    assert_eq!(analysis.category, "Balance");
    assert_eq!(analysis.recommendation_key, "none");
}

#[test]
fn missing_target_column_maps_to_client_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_csv(dir.path(), "data.csv", &[(1.0, "a"), (2.0, "b")]);
    let dataset = load_file(&path).expect("load");

    let err = ImbalanceAnalyzer::with_target_column("target")
        .analyze(&dataset)
        .unwrap_err();
    assert!(matches!(err, AnalysisError::Validation(_)));

    let report = ErrorReport::from_analysis_error(&err);
    assert_eq!(report.status, 400);
    assert!(report.message.contains("'target'"));
}

#[test]
fn single_class_file_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_csv(dir.path(), "data.csv", &[(1.0, "a"), (2.0, "a")]);
    let dataset = load_file(&path).expect("load");

    let err = ImbalanceAnalyzer::default().analyze(&dataset).unwrap_err();
    let report = ErrorReport::from_analysis_error(&err);
    assert!(report.is_client_error());
    assert!(report.message.contains("at least 2 distinct classes"));
}

#[test]
fn excel_upload_maps_to_client_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("workbook.xlsx");
    std::fs::write(&path, b"PK").expect("write");

    let err = load_file(&path).unwrap_err();
    let report = ErrorReport::from_load_error(&err);
    assert!(report.is_client_error());
    assert_eq!(report.status, 400);
    assert!(report.message.contains("export the sheet as .csv"));
}

#[test]
fn report_cli_exits_with_client_code_on_rejected_extension() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("workbook.xls");
    std::fs::write(&path, b"").expect("write");

    let output = std::process::Command::new(env!("CARGO_BIN_EXE_imbalance-report"))
        .arg(&path)
        .output()
        .expect("run imbalance-report");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Excel workbooks are not supported"), "{stderr}");
    assert!(!stderr.contains("An error occurred while processing"), "{stderr}");
}
