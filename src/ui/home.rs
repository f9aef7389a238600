use eframe::egui::{Color32, RichText, Ui};

use super::metric_card;
use crate::data::stats::overview;
use crate::state::AppState;

/// Landing page: headline numbers and a description of the dataset.
pub fn show(ui: &mut Ui, state: &AppState) {
    ui.label(
        RichText::new("Welcome to Titanic Survival Analysis")
            .size(20.0)
            .color(Color32::from_rgb(0x2c, 0xa0, 0x2c)),
    );
    ui.add_space(8.0);

    let o = overview(&state.artifacts.dataset);
    ui.columns(3, |cols| {
        metric_card(&mut cols[0], "Total Passengers", o.passengers.to_string());
        metric_card(&mut cols[1], "Survival Rate", format!("{:.1}%", o.survival_rate));
        metric_card(&mut cols[2], "Features", o.feature_count.to_string());
    });

    ui.add_space(12.0);
    ui.heading("About This Project");
    ui.label(
        "This interactive dashboard analyzes the Titanic disaster dataset and \
         provides survival predictions using machine learning.",
    );

    ui.add_space(8.0);
    ui.heading("Features");
    ui.label("📊 Data Analysis: explore passenger demographics and survival patterns");
    ui.label("🔮 Prediction: predict survival probability for new passengers");
    ui.label("📈 Model Performance: view model metrics and visualizations");

    ui.add_space(8.0);
    ui.heading("Dataset Overview");
    for line in [
        "Passenger Class: 1st, 2nd, 3rd class",
        "Sex: Male (0) or Female (1)",
        "Age: passenger age",
        "Siblings/Spouses: number aboard",
        "Parents/Children: number aboard",
        "Fare: ticket price",
        "Embarked: port of embarkation (0 Cherbourg, 1 Queenstown, 2 Southampton)",
    ] {
        ui.label(format!("• {line}"));
    }
}
