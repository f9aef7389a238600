use eframe::egui::{Color32, RichText, Ui};

use super::{plot, simple_table};
use crate::data::model::COLUMNS;
use crate::state::AppState;

const PREVIEW_ROWS: usize = 10;

/// Dataset preview, grouped statistics and the four exploration charts.
pub fn show(ui: &mut Ui, state: &mut AppState) {
    ui.label(
        RichText::new("📊 Data Analysis & Visualizations")
            .size(20.0)
            .color(Color32::from_rgb(0x2c, 0xa0, 0x2c)),
    );

    ui.heading("Dataset Preview");
    let preview: Vec<Vec<String>> = state
        .artifacts
        .dataset
        .records
        .iter()
        .take(PREVIEW_ROWS)
        .map(|r| r.values().iter().map(|v| format_cell(*v)).collect())
        .collect();
    simple_table(ui, "preview", &COLUMNS, &preview);

    let ex = state.exploration();

    ui.add_space(8.0);
    ui.heading("Dataset Statistics");
    ui.columns(2, |cols| {
        cols[0].strong("Survival by Class");
        let rows: Vec<Vec<String>> = ex
            .by_class
            .iter()
            .map(|g| {
                vec![
                    g.pclass.code().to_string(),
                    g.total.to_string(),
                    g.survived.to_string(),
                    format!("{:.4}", g.rate),
                ]
            })
            .collect();
        simple_table(&mut cols[0], "by_class", &["Pclass", "Total", "Survived", "Rate"], &rows);

        cols[1].strong("Age Statistics");
        let rows: Vec<Vec<String>> = ex
            .age
            .rows()
            .iter()
            .map(|(name, v)| vec![name.to_string(), format!("{v:.4}")])
            .collect();
        simple_table(&mut cols[1], "age_stats", &["", "Age"], &rows);
    });

    ui.add_space(8.0);
    ui.heading("Visualizations");

    ui.strong("Survival by Passenger Class");
    plot::class_histogram(ui, &ex.class_counts);

    ui.strong("Age Distribution by Survival");
    plot::age_histogram(ui, &ex.age_histogram);

    ui.strong("Fare Distribution by Survival");
    plot::fare_box_plot(ui, &ex.fare_boxes);

    ui.heading("Feature Correlation");
    plot::correlation_heatmap(ui, &ex.correlation);
}

/// Integers without decimals, everything else with up to four.
fn format_cell(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.4}")
    }
}
