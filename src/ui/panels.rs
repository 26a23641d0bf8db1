use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use imbalance_viewer::analysis::{AnalysisResult, Severity};
use imbalance_viewer::data::loader::SUPPORTED_EXTENSIONS;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – verdict, key stats, class table
// ---------------------------------------------------------------------------

/// Render the left summary panel.
pub fn side_panel(ui: &mut Ui, state: &AppState) {
    ui.heading("Class balance");
    ui.separator();

    if let Some(error) = &state.error {
        let title = if error.is_client_error() {
            "Cannot analyse this file"
        } else {
            "Something went wrong"
        };
        ui.label(RichText::new(title).strong().color(Color32::RED));
        ui.label(&error.message);
        ui.separator();
    }

    let Some(analysis) = &state.analysis else {
        if state.dataset.is_none() {
            ui.label("No dataset loaded.");
        }
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            verdict(ui, analysis);
            ui.separator();
            key_stats(ui, analysis);
            ui.separator();
            class_table(ui, analysis, &state.class_colors);
        });
}

fn severity_color(severity: Severity) -> Color32 {
    match severity {
        Severity::Balance => Color32::from_rgb(0x2e, 0xcc, 0x71),
        Severity::Mild => Color32::from_rgb(0xf1, 0xc4, 0x0f),
        Severity::Moderate => Color32::from_rgb(0xe6, 0x7e, 0x22),
        Severity::Extreme => Color32::from_rgb(0xe7, 0x4c, 0x3c),
    }
}

fn verdict(ui: &mut Ui, analysis: &AnalysisResult) {
    ui.label(
        RichText::new(&analysis.category)
            .heading()
            .color(severity_color(analysis.severity)),
    );
    ui.label(&analysis.description);
    ui.add_space(4.0);
    ui.strong("Recommendation");
    ui.label(analysis.recommendation.advice());
    ui.label(RichText::new(&analysis.recommendation_key).monospace().weak());
}

fn key_stats(ui: &mut Ui, analysis: &AnalysisResult) {
    let stats = &analysis.key_stats;
    egui::Grid::new("key_stats")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.label("Total samples");
            ui.label(stats.total_samples.to_string());
            ui.end_row();

            ui.label("Classes");
            ui.label(stats.num_classes.to_string());
            ui.end_row();

            ui.label("Degree of imbalance");
            ui.label(&stats.degree_of_imbalance);
            ui.end_row();

            ui.label("Distribution difference");
            ui.label(&stats.distribution_difference);
            ui.end_row();
        });
}

fn class_table(ui: &mut Ui, analysis: &AnalysisResult, colors: &[Color32]) {
    ui.strong(format!("Classes in '{}'", analysis.target_column));
    egui::Grid::new("class_table")
        .num_columns(4)
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.strong("Class");
            ui.strong("Count");
            ui.strong("Share");
            ui.strong("");
            ui.end_row();

            for (i, detail) in analysis.class_details.iter().enumerate() {
                let color = colors.get(i).copied().unwrap_or(Color32::GRAY);
                ui.label(RichText::new(&detail.name).color(color));
                ui.label(detail.count.to_string());
                ui.label(&detail.percentage_display);
                ui.label(detail.label.map(|l| l.as_str()).unwrap_or(""));
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let Some(ds) = &state.dataset else {
            return;
        };

        let name = state
            .source
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        ui.label(format!("{name}  {} rows", ds.len()));

        ui.separator();

        // ---- Target column selector ----
        ui.label("Target column");
        let columns = ds.column_names.clone();
        let current = state.target_column.clone();
        egui::ComboBox::from_id_salt("target_column")
            .selected_text(&current)
            .show_ui(ui, |ui: &mut Ui| {
                for col in &columns {
                    if ui.selectable_label(current == *col, col).clicked() && current != *col {
                        state.set_target_column(col.clone());
                    }
                }
            });
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open dataset")
        .add_filter("Supported files", SUPPORTED_EXTENSIONS)
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}
