use std::path::{Path, PathBuf};
use std::sync::Arc;

use imbalance_viewer::analysis::{AnalysisResult, ImbalanceAnalyzer};
use imbalance_viewer::chart::{ChartStyle, render_pie_chart};
use imbalance_viewer::color::{ClassPalette, to_color32};
use imbalance_viewer::config::AppConfig;
use imbalance_viewer::data::model::TabularDataset;
use imbalance_viewer::report::ErrorReport;

use eframe::egui::Color32;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// A rendered pie chart and the URI egui caches it under.
pub struct PieImage {
    pub uri: String,
    pub png: Arc<[u8]>,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<TabularDataset>,

    /// File the dataset came from.
    pub source: Option<PathBuf>,

    /// Column currently analysed.
    pub target_column: String,

    /// Result of the latest analysis run.
    pub analysis: Option<AnalysisResult>,

    /// One colour per class, in `analysis.class_details` order.
    pub class_colors: Vec<Color32>,

    pub pie: Option<PieImage>,

    /// Failure of the latest load or analysis, shown in the UI.
    pub error: Option<ErrorReport>,

    /// Bumped per analysis so every pie gets a fresh image URI.
    generation: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            target_column: config.analysis.target_column.clone(),
            config,
            dataset: None,
            source: None,
            analysis: None,
            class_colors: Vec::new(),
            pie: None,
            error: None,
            generation: 0,
        }
    }

    /// Load `path` and analyse it; failures end up in `error`.
    pub fn open(&mut self, path: &Path) {
        match imbalance_viewer::data::loader::load_file(path) {
            Ok(dataset) => self.set_dataset(dataset, Some(path.to_path_buf())),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.error = Some(ErrorReport::from_load_error(&e));
            }
        }
    }

    /// Ingest a newly loaded dataset and analyse the current target column.
    pub fn set_dataset(&mut self, dataset: TabularDataset, source: Option<PathBuf>) {
        self.dataset = Some(dataset);
        self.source = source;
        self.reanalyze();
    }

    /// Switch the target column and re-run the analysis.
    pub fn set_target_column(&mut self, column: String) {
        self.target_column = column;
        self.reanalyze();
    }

    /// Re-run the analysis (and the pie chart) for the current inputs.
    pub fn reanalyze(&mut self) {
        self.analysis = None;
        self.class_colors.clear();
        self.pie = None;
        self.error = None;

        let Some(dataset) = &self.dataset else {
            return;
        };

        let analyzer = ImbalanceAnalyzer::with_target_column(self.target_column.clone());
        let result = match analyzer.analyze(dataset) {
            Ok(result) => result,
            Err(e) => {
                log::error!("Analysis failed: {e}");
                self.error = Some(ErrorReport::from_analysis_error(&e));
                return;
            }
        };

        let palette = ClassPalette::new(&self.config.charts.palette, result.class_counts.len());
        self.class_colors = (0..result.class_counts.len())
            .map(|i| to_color32(palette.color_for(i)))
            .collect();

        let style = ChartStyle::from(&self.config.charts);
        match render_pie_chart(&result.class_counts, &style) {
            Ok(png) => {
                self.generation += 1;
                self.pie = Some(PieImage {
                    uri: format!("bytes://pie-{}.png", self.generation),
                    png: png.into(),
                });
            }
            Err(e) => {
                log::error!("Failed to render pie chart: {e}");
                self.error = Some(ErrorReport::server(e));
            }
        }

        self.analysis = Some(result);
    }
}
