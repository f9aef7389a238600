use eframe::egui::{Color32, RichText, Ui};

use super::{metric_card, plot, simple_table};
use crate::state::AppState;

/// Metrics, report, confusion matrix and coefficient chart.
pub fn show(ui: &mut Ui, state: &mut AppState) {
    ui.label(
        RichText::new("📈 Model Performance")
            .size(20.0)
            .color(Color32::from_rgb(0x2c, 0xa0, 0x2c)),
    );
    ui.label(
        RichText::new(
            "Scores are computed on the full dataset with no held-out split; \
             they overstate performance if the model was fitted on this data.",
        )
        .italics()
        .color(Color32::from_rgb(0xcc, 0x88, 0x00)),
    );
    ui.add_space(6.0);

    let artifacts = state.artifacts;
    let model = &artifacts.model;
    let eval = match state.evaluation() {
        Ok(eval) => eval,
        Err(msg) => {
            ui.label(RichText::new(format!("Evaluation failed: {msg}")).color(Color32::RED));
            return;
        }
    };

    ui.columns(4, |cols| {
        metric_card(&mut cols[0], "Accuracy", format!("{:.3}", eval.accuracy));
        metric_card(&mut cols[1], "Precision", format!("{:.3}", eval.precision));
        metric_card(&mut cols[2], "Recall", format!("{:.3}", eval.recall));
        metric_card(&mut cols[3], "F1-Score", format!("{:.3}", eval.f1));
    });
    if let Some(auc) = eval.roc_auc {
        ui.label(format!("ROC AUC: {auc:.3}"));
    }

    ui.add_space(8.0);
    ui.heading("Classification Report");
    let opt = |v: Option<f64>| v.map(|v| format!("{v:.4}")).unwrap_or_default();
    let rows: Vec<Vec<String>> = eval
        .report
        .rows
        .iter()
        .map(|r| {
            vec![
                r.name.to_string(),
                opt(r.precision),
                opt(r.recall),
                format!("{:.4}", r.f1),
                r.support.to_string(),
            ]
        })
        .collect();
    simple_table(ui, "report", &["", "precision", "recall", "f1-score", "support"], &rows);

    ui.add_space(8.0);
    ui.heading("Confusion Matrix");
    plot::confusion_heatmap(ui, &eval.matrix);

    ui.add_space(8.0);
    ui.heading("Feature Importance");
    match model.feature_importance() {
        Ok(weights) => {
            ui.label(format!("{} coefficients", model.kind()));
            plot::feature_importance(ui, &weights);
        }
        Err(e) => {
            ui.label(RichText::new(format!("Not applicable: {e}")).weak());
        }
    }
}
