use eframe::egui::{self, Ui};
use egui_plot::{Bar, BarChart, Plot};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Charts (central panel)
// ---------------------------------------------------------------------------

/// Render the frequency bar chart and the proportion pie chart side by side.
pub fn charts(ui: &mut Ui, state: &AppState) {
    let Some(analysis) = &state.analysis else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a dataset to analyse its class balance  (File → Open…)");
        });
        return;
    };

    ui.columns(2, |columns| {
        columns[0].heading("Class frequency");
        let names: Vec<String> = analysis.class_details.iter().map(|d| d.name.clone()).collect();
        let bars: Vec<Bar> = analysis
            .class_details
            .iter()
            .enumerate()
            .map(|(i, detail)| {
                let mut bar = Bar::new(i as f64, detail.count as f64)
                    .name(&detail.name)
                    .width(0.5);
                if let Some(color) = state.class_colors.get(i) {
                    bar = bar.fill(*color);
                }
                bar
            })
            .collect();

        Plot::new("class_frequency")
            .x_axis_label("Class")
            .y_axis_label("Frequency")
            .x_axis_formatter(move |mark, _range| {
                // Only label integer ticks, which sit under the bars.
                let idx = mark.value.round();
                if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                    return String::new();
                }
                names.get(idx as usize).cloned().unwrap_or_default()
            })
            .include_y(0.0)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_zoom(false)
            .allow_boxed_zoom(false)
            .show(&mut columns[0], |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name("count"));
            });

        columns[1].heading("Class proportion");
        if let Some(pie) = &state.pie {
            columns[1].add(
                egui::Image::from_bytes(pie.uri.clone(), pie.png.clone())
                    .maintain_aspect_ratio(true)
                    .shrink_to_fit(),
            );
        }
    });
}
