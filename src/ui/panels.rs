use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::{AppState, Page};

// ---------------------------------------------------------------------------
// Left side panel – navigation
// ---------------------------------------------------------------------------

/// Render the navigation panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.add_space(4.0);
    ui.heading("Navigation");
    ui.separator();

    ui.strong("Choose a page:");
    egui::ComboBox::from_id_salt("page_select")
        .selected_text(state.page.title())
        .show_ui(ui, |ui: &mut Ui| {
            for page in Page::ALL {
                if ui
                    .selectable_value(&mut state.page, page, page.title())
                    .changed()
                {
                    log::debug!("Switched to {}", page.title());
                }
            }
        });

    ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui: &mut Ui| {
        ui.label(RichText::new("Built with egui").weak());
        ui.separator();
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title and artifact summary.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(
            RichText::new("🚢 Titanic Survival Prediction Dashboard")
                .size(28.0)
                .color(Color32::from_rgb(0x1f, 0x77, 0xb4)),
        );
    });

    egui::menu::bar(ui, |ui: &mut Ui| {
        let artifacts = state.artifacts;
        ui.label(format!(
            "{} passengers from {}",
            artifacts.dataset.len(),
            artifacts.data_path.display()
        ));

        ui.separator();

        ui.label(format!(
            "{} model from {}",
            artifacts.model.kind(),
            artifacts.model_path.display()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
            if ui.small_button("✖").clicked() {
                state.status_message = None;
            }
        }
    });
}
