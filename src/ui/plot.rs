use std::f32::consts::PI;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot, Points};

use crate::classifier::metrics::{ConfusionMatrix, CLASS_NAMES};
use crate::classifier::{FeatureWeight, DECISION_THRESHOLD};
use crate::color;
use crate::data::model::PassengerClass;
use crate::data::stats::{BoxSummary, CorrelationMatrix, SplitHistogram};

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Exploration charts
// ---------------------------------------------------------------------------

/// Grouped bars: passengers per class, coloured by survival.
pub fn class_histogram(ui: &mut Ui, counts: &[(PassengerClass, [usize; 2])]) {
    let series = |survived: bool| -> BarChart {
        let offset = if survived { 0.2 } else { -0.2 };
        let bars = counts
            .iter()
            .map(|(pclass, c)| {
                Bar::new(pclass.code() as f64 + offset, c[usize::from(survived)] as f64)
                    .width(0.4)
                    .name(format!("{pclass} class"))
            })
            .collect();
        BarChart::new(bars)
            .color(color::class_color(survived))
            .name(CLASS_NAMES[usize::from(survived)])
    };

    Plot::new("class_histogram")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Passenger Class")
        .y_axis_label("Count")
        .x_axis_formatter(|mark, _range| {
            PassengerClass::from_code(mark.value.round() as i64)
                .filter(|_| (mark.value - mark.value.round()).abs() < 1e-6)
                .map(|c| c.to_string())
                .unwrap_or_default()
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(series(false));
            plot_ui.bar_chart(series(true));
        });
}

/// Stacked age histogram split by survival.
pub fn age_histogram(ui: &mut Ui, hist: &SplitHistogram) {
    let width = hist.bin_width();
    let series = |survived: bool| -> BarChart {
        let idx = usize::from(survived);
        let bars = hist.counts[idx]
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                Bar::new(hist.bin_center(i), n as f64)
                    .width(width)
                    .name(format!("{:.1}–{:.1}", hist.edges[i], hist.edges[i + 1]))
            })
            .collect();
        BarChart::new(bars)
            .color(color::class_color(survived))
            .name(CLASS_NAMES[idx])
    };

    let not_survived = series(false);
    let survived = series(true).stack_on(&[&not_survived]);

    Plot::new("age_histogram")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Age")
        .y_axis_label("Count")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(not_survived);
            plot_ui.bar_chart(survived);
        });
}

/// Fare box per survival class, with outliers as points.
pub fn fare_box_plot(ui: &mut Ui, boxes: &[Option<BoxSummary>; 2]) {
    Plot::new("fare_box_plot")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Survived")
        .y_axis_label("Fare")
        .x_axis_formatter(|mark, _range| match mark.value {
            v if v == 0.0 => "0".to_string(),
            v if v == 1.0 => "1".to_string(),
            _ => String::new(),
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (idx, summary) in boxes.iter().enumerate() {
                let Some(b) = summary else { continue };
                let c = color::class_color(idx == 1);
                let elem = BoxElem::new(
                    idx as f64,
                    BoxSpread::new(b.lower_whisker, b.q1, b.median, b.q3, b.upper_whisker),
                )
                .box_width(0.5)
                .name(CLASS_NAMES[idx]);
                plot_ui.box_plot(BoxPlot::new(vec![elem]).color(c).name(CLASS_NAMES[idx]));

                if !b.outliers.is_empty() {
                    let points = b.outliers.iter().map(|&v| [idx as f64, v]).collect::<Vec<_>>();
                    plot_ui.points(Points::new(points).radius(2.5).color(c));
                }
            }
        });
}

/// Correlation matrix as a red/blue heatmap with values printed in cells.
pub fn correlation_heatmap(ui: &mut Ui, corr: &CorrelationMatrix) {
    let labels: Vec<String> = corr.columns.iter().map(|c| c.to_string()).collect();
    heatmap(ui, &labels, &labels, &corr.values, color::diverging, |v| {
        if v.is_nan() {
            "–".to_string()
        } else {
            format!("{v:.2}")
        }
    });
}

// ---------------------------------------------------------------------------
// Evaluation charts
// ---------------------------------------------------------------------------

/// Confusion matrix, rows = actual, columns = predicted.
pub fn confusion_heatmap(ui: &mut Ui, matrix: &ConfusionMatrix) {
    let labels: Vec<String> = CLASS_NAMES.iter().map(|c| c.to_string()).collect();
    let values: Vec<Vec<f64>> = matrix
        .counts
        .iter()
        .map(|row| row.iter().map(|&n| n as f64).collect())
        .collect();
    let max = values.iter().flatten().copied().fold(0.0, f64::max);

    ui.horizontal(|ui| {
        ui.label("Actual ↓  /  Predicted →");
    });
    heatmap(
        ui,
        &labels,
        &labels,
        &values,
        |v| color::sequential_blues(v, max),
        |v| format!("{v:.0}"),
    );
}

/// Horizontal bars of coefficients, already sorted ascending.
pub fn feature_importance(ui: &mut Ui, weights: &[FeatureWeight]) {
    let names: Vec<String> = weights.iter().map(|w| w.feature.clone()).collect();
    let bars = weights
        .iter()
        .enumerate()
        .map(|(i, w)| {
            Bar::new(i as f64, w.coefficient)
                .width(0.7)
                .name(&w.feature)
        })
        .collect();

    Plot::new("feature_importance")
        .height(CHART_HEIGHT)
        .x_axis_label("Coefficient")
        .y_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() > 1e-6 || i < 0.0 {
                return String::new();
            }
            names.get(i as usize).cloned().unwrap_or_default()
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .horizontal()
                    .color(Color32::from_rgb(0x63, 0x6e, 0xfa))
                    .name("Coefficient"),
            );
        });
}

// ---------------------------------------------------------------------------
// Gauge
// ---------------------------------------------------------------------------

/// Half-circle gauge for a percentage in [0, 100]: gray below the decision
/// threshold, green above, red threshold marker.
pub fn probability_gauge(ui: &mut Ui, title: &str, percent: f64) {
    let percent = percent.clamp(0.0, 100.0) as f32;
    let threshold = (DECISION_THRESHOLD * 100.0) as f32;

    let width = ui.available_width().min(420.0);
    let (response, painter) = ui.allocate_painter(Vec2::new(width, width * 0.62), Sense::hover());
    let rect = response.rect;

    let radius = width * 0.4;
    let center = Pos2::new(rect.center().x, rect.top() + 30.0 + radius);
    let band = radius * 0.25;

    let at = |pct: f32, r: f32| -> Pos2 {
        let theta = PI * (1.0 - pct / 100.0);
        center + Vec2::new(r * theta.cos(), -r * theta.sin())
    };
    let arc = |from: f32, to: f32, r: f32| -> Vec<Pos2> {
        let steps = 48;
        (0..=steps)
            .map(|i| at(from + (to - from) * i as f32 / steps as f32, r))
            .collect()
    };

    painter.text(
        Pos2::new(rect.center().x, rect.top() + 8.0),
        Align2::CENTER_TOP,
        title,
        FontId::proportional(16.0),
        ui.visuals().text_color(),
    );

    painter.add(Shape::line(arc(0.0, threshold, radius), Stroke::new(band, color::GAUGE_LOW)));
    painter.add(Shape::line(arc(threshold, 100.0, radius), Stroke::new(band, color::GAUGE_HIGH)));
    if percent > 0.0 {
        painter.add(Shape::line(
            arc(0.0, percent, radius),
            Stroke::new(band * 0.4, color::GAUGE_BAR),
        ));
    }
    painter.line_segment(
        [at(threshold, radius - band * 0.6), at(threshold, radius + band * 0.6)],
        Stroke::new(4.0, color::GAUGE_THRESHOLD),
    );

    for tick in [0.0, 25.0, 50.0, 75.0, 100.0] {
        painter.text(
            at(tick, radius + band),
            Align2::CENTER_CENTER,
            format!("{tick:.0}"),
            FontId::proportional(11.0),
            ui.visuals().weak_text_color(),
        );
    }

    painter.text(
        center - Vec2::new(0.0, radius * 0.2),
        Align2::CENTER_CENTER,
        format!("{percent:.1}"),
        FontId::proportional(32.0),
        ui.visuals().strong_text_color(),
    );
}

// ---------------------------------------------------------------------------
// Heatmap primitive
// ---------------------------------------------------------------------------

/// Grid of coloured cells with row labels on the left and column labels
/// underneath.
fn heatmap(
    ui: &mut Ui,
    x_labels: &[String],
    y_labels: &[String],
    values: &[Vec<f64>],
    fill: impl Fn(f64) -> Color32,
    text: impl Fn(f64) -> String,
) {
    let label_w = 100.0;
    let label_h = 24.0;
    let cols = x_labels.len().max(1);
    let rows = y_labels.len();
    let cell = ((ui.available_width() - label_w) / cols as f32).clamp(24.0, 72.0);

    let size = Vec2::new(label_w + cell * cols as f32, cell * rows as f32 + label_h);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min + Vec2::new(label_w, 0.0);
    let font = FontId::proportional(12.0);

    for (r, row) in values.iter().enumerate().take(rows) {
        let y = origin.y + cell * r as f32;
        painter.text(
            Pos2::new(origin.x - 6.0, y + cell / 2.0),
            Align2::RIGHT_CENTER,
            &y_labels[r],
            font.clone(),
            ui.visuals().text_color(),
        );
        for (c, &v) in row.iter().enumerate().take(cols) {
            let min = Pos2::new(origin.x + cell * c as f32, y);
            let cell_rect = egui::Rect::from_min_size(min, Vec2::splat(cell));
            let bg = fill(v);
            painter.rect_filled(cell_rect.shrink(1.0), 2.0, bg);
            painter.text(
                cell_rect.center(),
                Align2::CENTER_CENTER,
                text(v),
                font.clone(),
                color::text_on(bg),
            );
        }
    }

    let base = origin.y + cell * rows as f32 + 4.0;
    for (c, label) in x_labels.iter().enumerate() {
        painter.text(
            Pos2::new(origin.x + cell * (c as f32 + 0.5), base),
            Align2::CENTER_TOP,
            label,
            font.clone(),
            ui.visuals().text_color(),
        );
    }
}
