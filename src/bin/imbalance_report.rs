use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use imbalance_viewer::analysis::ImbalanceAnalyzer;
use imbalance_viewer::chart::{ChartStyle, render_charts};
use imbalance_viewer::config::AppConfig;
use imbalance_viewer::data::loader::load_file;
use imbalance_viewer::logging;
use imbalance_viewer::report::{ErrorReport, Report, write_outputs};

#[derive(Parser)]
#[command(
    name = "imbalance-report",
    version,
    about = "Analyse the class balance of a tabular dataset",
    long_about = "Analyse the class balance of a tabular dataset.\n\n\
                  Reads .csv, .json (records) or .parquet files, classifies the \
                  imbalance of the target column and suggests a resampling strategy."
)]
struct Cli {
    /// Dataset to analyse.
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Column holding the class labels (overrides the config).
    #[arg(long, short = 't', value_name = "COLUMN")]
    target_column: Option<String>,

    /// TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format printed to stdout.
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Write report.json, bar_chart.png and pie_chart.png into this directory.
    #[arg(long, short = 'o', value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// More log output (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Less log output.
    #[arg(short, long, action = ArgAction::Count)]
    quiet: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Exit code for input the user can fix.
const EXIT_VALIDATION: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(logging::level_from_flags(cli.verbose, cli.quiet));

    match run(&cli) {
        Ok(code) => code,
        Err(e) => report_failure(&ErrorReport::server(format!("{e:#}"))),
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(column) = &cli.target_column {
        config.analysis.target_column = column.clone();
    }

    let dataset = match load_file(&cli.file) {
        Ok(dataset) => dataset,
        Err(e) => return Ok(report_failure(&ErrorReport::from_load_error(&e))),
    };
    let analyzer = ImbalanceAnalyzer::new(&config.analysis);

    let analysis = match analyzer.analyze(&dataset) {
        Ok(analysis) => analysis,
        Err(e) => return Ok(report_failure(&ErrorReport::from_analysis_error(&e))),
    };

    let report = Report::new(analysis, Some(&cli.file));
    match cli.format {
        OutputFormat::Text => print!("{}", report.to_text()),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    if let Some(dir) = &cli.output_dir {
        let style = ChartStyle::from(&config.charts);
        let charts = render_charts(&report.analysis.class_counts, &style)?;
        write_outputs(dir, &report, Some(&charts))?;
    }

    Ok(ExitCode::SUCCESS)
}

/// Print the error and pick the exit code for its class.
fn report_failure(report: &ErrorReport) -> ExitCode {
    eprintln!("error: {}", report.message);
    if report.is_client_error() {
        ExitCode::from(EXIT_VALIDATION)
    } else {
        ExitCode::FAILURE
    }
}
