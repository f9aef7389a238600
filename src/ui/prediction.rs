use eframe::egui::{self, Color32, DragValue, RichText, Slider, Ui};

use super::{metric_card, plot};
use crate::classifier::GaugeBand;
use crate::data::model::{PassengerClass, Port, Sex};
use crate::state::AppState;

/// Passenger form, predict button and the last result.
pub fn show(ui: &mut Ui, state: &mut AppState) {
    ui.label(
        RichText::new("🔮 Survival Prediction")
            .size(20.0)
            .color(Color32::from_rgb(0x2c, 0xa0, 0x2c)),
    );
    ui.label("Enter passenger details to predict survival probability:");
    ui.add_space(6.0);

    let form = &mut state.form;
    ui.columns(2, |cols| {
        let ui = &mut cols[0];
        ui.label("Passenger Class");
        egui::ComboBox::from_id_salt("pclass")
            .selected_text(form.pclass.code().to_string())
            .show_ui(ui, |ui: &mut Ui| {
                for c in PassengerClass::ALL {
                    ui.selectable_value(&mut form.pclass, c, c.code().to_string());
                }
            });

        ui.label("Sex");
        egui::ComboBox::from_id_salt("sex")
            .selected_text(form.sex.to_string())
            .show_ui(ui, |ui: &mut Ui| {
                for s in Sex::ALL {
                    ui.selectable_value(&mut form.sex, s, s.to_string());
                }
            });

        ui.label("Age");
        ui.add(Slider::new(&mut form.age, 0..=80));

        ui.label("Siblings/Spouses Aboard");
        ui.add(DragValue::new(&mut form.sibsp).range(0..=10));

        let ui = &mut cols[1];
        ui.label("Parents/Children Aboard");
        ui.add(DragValue::new(&mut form.parch).range(0..=10));

        ui.label("Fare");
        ui.add(DragValue::new(&mut form.fare).range(0.0..=600.0).speed(0.5).fixed_decimals(2));

        ui.label("Port of Embarkation");
        egui::ComboBox::from_id_salt("embarked")
            .selected_text(form.embarked.to_string())
            .show_ui(ui, |ui: &mut Ui| {
                for p in Port::ALL {
                    ui.selectable_value(&mut form.embarked, p, p.to_string());
                }
            });
    });

    ui.add_space(8.0);
    let button = egui::Button::new(RichText::new("Predict Survival").strong())
        .fill(Color32::from_rgb(0xff, 0x4b, 0x4b));
    if ui.add(button).clicked() {
        state.predict();
    }

    let Some(prediction) = state.last_prediction else {
        return;
    };

    ui.add_space(8.0);
    ui.columns(2, |cols| {
        metric_card(&mut cols[0], "Prediction", prediction.label_text().to_string());
        metric_card(
            &mut cols[1],
            "Survival Probability",
            format!("{:.1}%", prediction.survival_probability() * 100.0),
        );
    });

    plot::probability_gauge(ui, "Survival Probability", prediction.survival_probability() * 100.0);
    let band = match prediction.gauge_band() {
        GaugeBand::Low => "at or below",
        GaugeBand::High => "above",
    };
    ui.label(RichText::new(format!("Probability is {band} the 50% decision line.")).weak());
}
