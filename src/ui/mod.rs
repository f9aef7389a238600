pub mod analysis;
pub mod home;
pub mod panels;
pub mod performance;
pub mod plot;
pub mod prediction;

use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

/// Framed headline number.
pub fn metric_card(ui: &mut Ui, title: &str, value: String) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.label(RichText::new(title).weak());
        ui.label(RichText::new(value).size(26.0).strong());
    });
}

/// Striped read-only table with a header row.
pub fn simple_table(ui: &mut Ui, id: &str, header: &[&str], rows: &[Vec<String>]) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .columns(Column::auto().at_least(60.0), header.len())
            .header(20.0, |mut head| {
                for h in header {
                    head.col(|ui: &mut Ui| {
                        ui.strong(*h);
                    });
                }
            })
            .body(|mut body| {
                for row in rows {
                    body.row(18.0, |mut tr| {
                        for cell in row {
                            tr.col(|ui: &mut Ui| {
                                ui.label(cell.as_str());
                            });
                        }
                    });
                }
            });
    });
}
