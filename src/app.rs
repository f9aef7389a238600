use eframe::egui;

use crate::artifacts::Artifacts;
use crate::state::{AppState, Page};
use crate::ui::{analysis, home, panels, performance, prediction};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TitanicDashboardApp {
    pub state: AppState,
}

impl TitanicDashboardApp {
    pub fn new(artifacts: &'static Artifacts) -> Self {
        Self {
            state: AppState::new(artifacts),
        }
    }
}

impl eframe::App for TitanicDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: title + artifact summary ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: navigation ----
        egui::SidePanel::left("nav_panel")
            .default_width(200.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: selected page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match self.state.page {
                    Page::Home => home::show(ui, &self.state),
                    Page::DataAnalysis => analysis::show(ui, &mut self.state),
                    Page::Prediction => prediction::show(ui, &mut self.state),
                    Page::ModelPerformance => performance::show(ui, &mut self.state),
                });
        });
    }
}
