use linfa::dataset::Pr;
use linfa::metrics::{BinaryClassification, ToConfusionMatrix};
use ndarray::Array1;

use super::Classifier;
use crate::data::model::Dataset;
use crate::error::DashboardError;

/// Display names in class order (0, 1).
pub const CLASS_NAMES: [&str; 2] = ["Not Survived", "Survived"];

// ---------------------------------------------------------------------------
// Confusion matrix
// ---------------------------------------------------------------------------

/// 2×2 counts indexed `[actual][predicted]`, class 0 first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    /// Labels other than 0 count as the positive class.
    pub fn from_labels(actual: &[u8], predicted: &[u8]) -> Self {
        let mut counts = [[0usize; 2]; 2];
        for (&a, &p) in actual.iter().zip(predicted) {
            counts[usize::from(a.min(1))][usize::from(p.min(1))] += 1;
        }
        ConfusionMatrix { counts }
    }

    pub fn tn(&self) -> usize {
        self.counts[0][0]
    }
    pub fn fp(&self) -> usize {
        self.counts[0][1]
    }
    pub fn fn_(&self) -> usize {
        self.counts[1][0]
    }
    pub fn tp(&self) -> usize {
        self.counts[1][1]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.tp() + self.tn(), self.total())
    }

    /// Precision of `class`; 0 when nothing was predicted as it.
    pub fn precision(&self, class: usize) -> f64 {
        ratio(self.counts[class][class], self.counts[0][class] + self.counts[1][class])
    }

    /// Recall of `class`; 0 when the class never occurs.
    pub fn recall(&self, class: usize) -> f64 {
        ratio(self.counts[class][class], self.support(class))
    }

    pub fn f1(&self, class: usize) -> f64 {
        let (p, r) = (self.precision(class), self.recall(class));
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    /// Number of actual members of `class`.
    pub fn support(&self, class: usize) -> usize {
        self.counts[class].iter().sum()
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

// ---------------------------------------------------------------------------
// Classification report
// ---------------------------------------------------------------------------

/// One line of the report. `precision`/`recall` are absent on the accuracy
/// line, which only carries the score and the total support.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub name: &'static str,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub rows: Vec<ReportRow>,
}

impl ClassificationReport {
    pub fn from_matrix(m: &ConfusionMatrix) -> Self {
        let total = m.total();
        let per_class: Vec<ReportRow> = (0..2)
            .map(|c| ReportRow {
                name: CLASS_NAMES[c],
                precision: Some(m.precision(c)),
                recall: Some(m.recall(c)),
                f1: m.f1(c),
                support: m.support(c),
            })
            .collect();

        let avg = |name: &'static str, weight: &dyn Fn(&ReportRow) -> f64| -> ReportRow {
            let norm: f64 = per_class.iter().map(weight).sum();
            let mean = |value: &dyn Fn(&ReportRow) -> f64| -> f64 {
                if norm == 0.0 {
                    0.0
                } else {
                    per_class.iter().map(|r| weight(r) * value(r)).sum::<f64>() / norm
                }
            };
            ReportRow {
                name,
                precision: Some(mean(&|r| r.precision.unwrap_or(0.0))),
                recall: Some(mean(&|r| r.recall.unwrap_or(0.0))),
                f1: mean(&|r| r.f1),
                support: total,
            }
        };

        let macro_avg = avg("macro avg", &|_| 1.0);
        let weighted_avg = avg("weighted avg", &|r| r.support as f64);

        let mut rows = per_class;
        rows.push(ReportRow {
            name: "accuracy",
            precision: None,
            recall: None,
            f1: m.accuracy(),
            support: total,
        });
        rows.push(macro_avg);
        rows.push(weighted_avg);
        ClassificationReport { rows }
    }
}

// ---------------------------------------------------------------------------
// linfa scores
// ---------------------------------------------------------------------------

fn has_both_classes(actual: &[u8]) -> bool {
    actual.iter().any(|&y| y == 0) && actual.iter().any(|&y| y != 0)
}

/// Share of matching labels, from linfa's confusion matrix. `None` unless
/// the ground truth holds both classes: linfa sizes the matrix from the
/// ground-truth labels and drops predictions outside them.
pub fn agreement(actual: &[u8], predicted: &[u8]) -> Option<f64> {
    if actual.len() != predicted.len() || !has_both_classes(actual) {
        return None;
    }
    let truth: Array1<usize> = actual.iter().map(|&y| usize::from(y.min(1))).collect();
    let guess: Array1<usize> = predicted.iter().map(|&y| usize::from(y.min(1))).collect();
    let cm = guess.confusion_matrix(truth.view()).ok()?;
    Some(f64::from(cm.accuracy()))
}

/// Area under the ROC curve from positive-class scores. `None` unless both
/// classes are present and every score is a number.
pub fn roc_auc(actual: &[u8], scores: &[f64]) -> Option<f64> {
    let n = actual.len().min(scores.len());
    let (actual, scores) = (&actual[..n], &scores[..n]);
    if !has_both_classes(actual) || scores.iter().any(|s| s.is_nan()) {
        return None;
    }

    let predicted: Array1<Pr> = scores
        .iter()
        .map(|&s| Pr::new(s.clamp(0.0, 1.0) as f32))
        .collect();
    let truth: Vec<bool> = actual.iter().map(|&y| y != 0).collect();
    let roc = predicted.roc(truth.as_slice()).ok()?;
    Some(f64::from(roc.area_under_curve()))
}

// ---------------------------------------------------------------------------
// Evaluation over a dataset
// ---------------------------------------------------------------------------

/// Scores of a classifier over every row of a labelled dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub matrix: ConfusionMatrix,
    pub report: ClassificationReport,
    pub accuracy: f64,
    /// Positive-class precision / recall / F1.
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub roc_auc: Option<f64>,
    /// `p(survived)` per row, in dataset order.
    pub probabilities: Vec<f64>,
}

/// Run the classifier over all rows. Nothing is held out, so the scores are
/// optimistic if the model saw this data during training.
pub fn evaluate(model: &Classifier, dataset: &Dataset) -> Result<Evaluation, DashboardError> {
    let actual = dataset.labels();
    let mut predicted = Vec::with_capacity(dataset.len());
    let mut probabilities = Vec::with_capacity(dataset.len());

    for rec in &dataset.records {
        let p = model.predict(&rec.features.feature_row())?;
        predicted.push(p.label);
        probabilities.push(p.survival_probability());
    }

    let matrix = ConfusionMatrix::from_labels(&actual, &predicted);
    let accuracy = agreement(&actual, &predicted).unwrap_or_else(|| matrix.accuracy());
    log::info!(
        "Evaluated {} model on {} rows: accuracy {accuracy:.3}",
        model.kind(),
        matrix.total(),
    );

    Ok(Evaluation {
        report: ClassificationReport::from_matrix(&matrix),
        accuracy,
        precision: matrix.precision(1),
        recall: matrix.recall(1),
        f1: matrix.f1(1),
        roc_auc: roc_auc(&actual, &probabilities),
        probabilities,
        matrix,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> ConfusionMatrix {
        // tn=4 fp=1 fn=2 tp=3
        let actual = [0, 0, 0, 0, 0, 1, 1, 1, 1, 1];
        let predicted = [0, 0, 0, 0, 1, 0, 0, 1, 1, 1];
        ConfusionMatrix::from_labels(&actual, &predicted)
    }

    #[test]
    fn matrix_cells_and_scores() {
        let m = matrix();
        assert_eq!((m.tn(), m.fp(), m.fn_(), m.tp()), (4, 1, 2, 3));
        assert_eq!(m.total(), 10);
        assert!((m.accuracy() - 0.7).abs() < 1e-12);
        assert!((m.precision(1) - 0.75).abs() < 1e-12);
        assert!((m.recall(1) - 0.6).abs() < 1e-12);
        assert!((m.f1(1) - 2.0 * 0.75 * 0.6 / 1.35).abs() < 1e-12);
        assert!((m.precision(0) - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn zero_division_yields_zero() {
        let m = ConfusionMatrix::from_labels(&[0, 0, 1], &[0, 0, 0]);
        assert_eq!(m.precision(1), 0.0);
        assert_eq!(m.f1(1), 0.0);
        assert_eq!(ConfusionMatrix::default().accuracy(), 0.0);
    }

    #[test]
    fn report_has_sklearn_layout() {
        let report = ClassificationReport::from_matrix(&matrix());
        let names: Vec<_> = report.rows.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec!["Not Survived", "Survived", "accuracy", "macro avg", "weighted avg"]
        );

        let accuracy = &report.rows[2];
        assert_eq!(accuracy.precision, None);
        assert!((accuracy.f1 - 0.7).abs() < 1e-12);

        let macro_avg = &report.rows[3];
        let expected = (4.0 / 6.0 + 0.75) / 2.0;
        assert!((macro_avg.precision.unwrap() - expected).abs() < 1e-12);
        assert_eq!(macro_avg.support, 10);

        // Equal supports make the weighted average equal the macro one.
        assert!((report.rows[4].f1 - macro_avg.f1).abs() < 1e-12);
    }

    #[test]
    fn linfa_accuracy_matches_the_counts() {
        let actual = [0, 0, 0, 0, 0, 1, 1, 1, 1, 1];
        let predicted = [0, 0, 0, 0, 1, 0, 0, 1, 1, 1];
        let acc = agreement(&actual, &predicted).unwrap();
        assert!((acc - matrix().accuracy()).abs() < 1e-6);

        // One-class truth falls back to the counts.
        assert_eq!(agreement(&[1, 1], &[0, 1]), None);
        assert_eq!(agreement(&[0, 1], &[0]), None);
    }

    #[test]
    fn auc_of_separable_and_inverted_scores() {
        let auc = roc_auc(&[0, 0, 1, 1], &[0.1, 0.2, 0.8, 0.9]).unwrap();
        assert!((auc - 1.0).abs() < 1e-6);
        let auc = roc_auc(&[1, 1, 0, 0], &[0.1, 0.2, 0.8, 0.9]).unwrap();
        assert!(auc.abs() < 1e-6);
        let auc = roc_auc(&[0, 1, 0, 1, 1, 1], &[0.1, 0.3, 0.5, 0.7, 0.8, 0.9]).unwrap();
        assert!((auc - 0.875).abs() < 1e-6);

        assert_eq!(roc_auc(&[1, 1], &[0.1, 0.2]), None);
        assert_eq!(roc_auc(&[0, 1], &[0.1, f64::NAN]), None);
    }
}
