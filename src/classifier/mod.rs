//! Inference layer: the serialized binary classifier and its evaluation.
//!
//! ```text
//!   Dataset ──train──┐        .json / .msgpack
//!                    ▼              │
//!               ┌────────────┐      │
//!               │ Classifier │ ◄────┘  feature_names + fitted linfa Estimator
//!               └────────────┘
//!                    │  FeatureRow (named values, aligned by name)
//!                    ▼
//!   classify / predict_proba ──► metrics::Evaluation
//! ```

pub mod metrics;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use linfa::traits::Fit;
use linfa::DatasetBase;
use linfa_bayes::{GaussianNb, NaiveBayes};
use linfa_logistic::{FittedLogisticRegression, LogisticRegression};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::data::model::{Dataset, FEATURE_COLUMNS};
use crate::error::DashboardError;

/// Probability at which the gauge switches from low to high.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Solver budget for logistic regression.
const MAX_ITERATIONS: u64 = 500;

// ---------------------------------------------------------------------------
// FeatureRow – one named inference input
// ---------------------------------------------------------------------------

/// A single input row keyed by column name. The classifier picks values in
/// its own feature order, so the insertion order does not matter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRow {
    values: BTreeMap<String, f64>,
}

impl FeatureRow {
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.values.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for FeatureRow {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        FeatureRow {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Estimator families the dashboard can train and load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    LogisticRegression,
    GaussianNb,
}

impl ModelKind {
    pub fn name(self) -> &'static str {
        match self {
            ModelKind::LogisticRegression => "logistic_regression",
            ModelKind::GaussianNb => "gaussian_nb",
        }
    }
}

/// A fitted linfa model over class labels 0 (not survived) and 1
/// (survived). The variant doubles as the capability marker: only linear
/// estimators expose coefficients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Estimator {
    LogisticRegression(FittedLogisticRegression<f64, usize>),
    GaussianNb(GaussianNb<f64, usize>),
}

/// A trained binary classifier together with the feature names it was
/// fitted on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classifier {
    pub feature_names: Vec<String>,
    pub estimator: Estimator,
}

/// One bar of the feature-importance chart.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureWeight {
    pub feature: String,
    pub coefficient: f64,
}

impl Classifier {
    /// Build and validate a classifier.
    pub fn new(feature_names: Vec<String>, estimator: Estimator) -> Result<Self, DashboardError> {
        let model = Classifier {
            feature_names,
            estimator,
        };
        model.validate()?;
        Ok(model)
    }

    /// Fit `kind` on every row of `dataset`, over the canonical feature
    /// columns.
    pub fn train(kind: ModelKind, dataset: &Dataset) -> Result<Self, DashboardError> {
        let (records, targets) = design_matrix(dataset)?;
        let train = DatasetBase::new(records, targets);
        let failed = |e: String| DashboardError::Training(format!("{}: {e}", kind.name()));

        let estimator = match kind {
            ModelKind::LogisticRegression => LogisticRegression::default()
                .max_iterations(MAX_ITERATIONS)
                .fit(&train)
                .map(Estimator::LogisticRegression)
                .map_err(|e| failed(e.to_string()))?,
            ModelKind::GaussianNb => GaussianNb::params()
                .fit(&train)
                .map(Estimator::GaussianNb)
                .map_err(|e| failed(e.to_string()))?,
        };
        log::info!("Trained {} on {} rows", kind.name(), dataset.len());

        Classifier::new(
            FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            estimator,
        )
    }

    pub fn kind(&self) -> &'static str {
        let kind = match self.estimator {
            Estimator::LogisticRegression(_) => ModelKind::LogisticRegression,
            Estimator::GaussianNb(_) => ModelKind::GaussianNb,
        };
        kind.name()
    }

    /// Parameter shapes must agree with `feature_names`.
    pub fn validate(&self) -> Result<(), DashboardError> {
        let n = self.feature_names.len();
        let bad = |msg: String| Err(DashboardError::Deserialization(msg));

        if n == 0 {
            return bad("model has no features".into());
        }
        match &self.estimator {
            Estimator::LogisticRegression(lr) => {
                let width = lr.params().len();
                if width != n {
                    return bad(format!("{width} coefficients for {n} features"));
                }
                if !lr.intercept().is_finite() || lr.params().iter().any(|c| !c.is_finite()) {
                    return bad("non-finite coefficient".into());
                }
            }
            Estimator::GaussianNb(nb) => match class_widths(nb) {
                Some(widths) => {
                    let classes: Vec<&str> = widths.keys().map(String::as_str).collect();
                    if classes != ["0", "1"] {
                        return bad(format!("expected classes [0, 1], found {classes:?}"));
                    }
                    if let Some((class, width)) = widths.iter().find(|(_, w)| **w != n) {
                        return bad(format!("class {class} covers {width} features, expected {n}"));
                    }
                }
                None => log::warn!("Could not inspect naive Bayes class statistics"),
            },
        }
        Ok(())
    }

    /// Values of `row` in model feature order. Missing and unexpected
    /// columns are both rejected.
    pub fn align(&self, row: &FeatureRow) -> Result<Vec<f64>, DashboardError> {
        let missing: Vec<String> = self
            .feature_names
            .iter()
            .filter(|f| row.get(f).is_none())
            .cloned()
            .collect();
        let unexpected: Vec<String> = row
            .names()
            .filter(|n| !self.feature_names.iter().any(|f| f.as_str() == *n))
            .map(str::to_string)
            .collect();

        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(DashboardError::SchemaMismatch { missing, unexpected });
        }

        Ok(self
            .feature_names
            .iter()
            .filter_map(|f| row.get(f))
            .collect())
    }

    /// `[p(not survived), p(survived)]`.
    pub fn predict_proba(&self, row: &FeatureRow) -> Result<[f64; 2], DashboardError> {
        let x = self.align(row)?;
        Ok(self.proba_aligned(x))
    }

    /// 1 when the survival probability exceeds the complement.
    pub fn classify(&self, row: &FeatureRow) -> Result<u8, DashboardError> {
        Ok(self.predict(row)?.label)
    }

    /// Label and probabilities from a single alignment.
    pub fn predict(&self, row: &FeatureRow) -> Result<Prediction, DashboardError> {
        let prediction = Prediction::from_probabilities(self.predict_proba(row)?);
        log::debug!("Predicted {prediction:?}");
        Ok(prediction)
    }

    fn proba_aligned(&self, x: Vec<f64>) -> [f64; 2] {
        let x: Array2<f64> = Array1::from(x).insert_axis(Axis(0));
        let p1 = match &self.estimator {
            // Probability of the larger label, which is 1.
            Estimator::LogisticRegression(lr) => lr.predict_probabilities(&x)[0],
            Estimator::GaussianNb(nb) => {
                let jll = nb.joint_log_likelihood(x.view());
                let score = |class: usize| jll.get(&class).map_or(f64::NEG_INFINITY, |s| s[0]);
                let (j0, j1) = (score(0), score(1));
                let max = j0.max(j1);
                let (e0, e1) = ((j0 - max).exp(), (j1 - max).exp());
                e1 / (e0 + e1)
            }
        };
        [1.0 - p1, p1]
    }

    pub fn exposes_coefficients(&self) -> bool {
        matches!(self.estimator, Estimator::LogisticRegression(_))
    }

    /// Coefficients labelled by feature, sorted ascending.
    pub fn feature_importance(&self) -> Result<Vec<FeatureWeight>, DashboardError> {
        let Estimator::LogisticRegression(lr) = &self.estimator else {
            return Err(DashboardError::UnsupportedModelType(self.kind().to_string()));
        };
        let mut weights: Vec<FeatureWeight> = self
            .feature_names
            .iter()
            .zip(lr.params().iter())
            .map(|(feature, &coefficient)| FeatureWeight {
                feature: feature.clone(),
                coefficient,
            })
            .collect();
        weights.sort_by(|a, b| a.coefficient.total_cmp(&b.coefficient));
        Ok(weights)
    }
}

/// Canonical feature matrix and 0/1 targets of a dataset.
fn design_matrix(dataset: &Dataset) -> Result<(Array2<f64>, Array1<usize>), DashboardError> {
    let flat: Vec<f64> = dataset
        .records
        .iter()
        .flat_map(|r| r.features.values())
        .collect();
    let records = Array2::from_shape_vec((dataset.len(), FEATURE_COLUMNS.len()), flat)
        .map_err(|e| DashboardError::Training(e.to_string()))?;
    let targets = dataset.labels().into_iter().map(usize::from).collect();
    Ok((records, targets))
}

/// Feature width of each class in a fitted naive Bayes model, keyed by class
/// label. linfa keeps the per-class statistics private, so they are read
/// back from the model's serde form.
fn class_widths(nb: &GaussianNb<f64, usize>) -> Option<BTreeMap<String, usize>> {
    let value = serde_json::to_value(nb).ok()?;
    value
        .get("class_info")?
        .as_object()?
        .iter()
        .map(|(class, info)| {
            let width = info.get("mean")?.get("dim")?.get(0)?.as_u64()?;
            Some((class.clone(), width as usize))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Prediction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: u8,
    pub probabilities: [f64; 2],
}

/// Gauge region the survival probability falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeBand {
    /// Up to and including 50 %, drawn gray.
    Low,
    /// Above 50 %, drawn green.
    High,
}

impl Prediction {
    /// Survived iff `p(survived) > p(not survived)`; the gauge band follows
    /// the same comparison.
    pub fn from_probabilities(probabilities: [f64; 2]) -> Self {
        Prediction {
            label: u8::from(probabilities[1] > probabilities[0]),
            probabilities,
        }
    }

    pub fn survived(&self) -> bool {
        self.label == 1
    }

    pub fn label_text(&self) -> &'static str {
        if self.survived() {
            "Survived"
        } else {
            "Not Survived"
        }
    }

    pub fn survival_probability(&self) -> f64 {
        self.probabilities[1]
    }

    pub fn gauge_band(&self) -> GaugeBand {
        if self.survived() {
            GaugeBand::High
        } else {
            GaugeBand::Low
        }
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Load a classifier artifact.  Dispatch by extension:
/// `.json` (serde_json) or `.msgpack` / `.mpk` (MessagePack).
pub fn load_model(path: &Path) -> Result<Classifier> {
    if !path.exists() {
        return Err(DashboardError::FileNotFound(path.to_path_buf()).into());
    }
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = BufReader::new(file);

    let model: Classifier = match extension(path).as_str() {
        "json" => serde_json::from_reader(reader)
            .map_err(|e| DashboardError::Deserialization(e.to_string()))?,
        "msgpack" | "mpk" => rmp_serde::from_read(reader)
            .map_err(|e| DashboardError::Deserialization(e.to_string()))?,
        other => {
            return Err(
                DashboardError::Deserialization(format!("unsupported model format: .{other}")).into(),
            )
        }
    };
    model
        .validate()
        .with_context(|| format!("validating {}", path.display()))?;

    log::info!(
        "Loaded {} model over {:?} from {}",
        model.kind(),
        model.feature_names,
        path.display()
    );
    Ok(model)
}

/// Write a classifier artifact in the format named by the extension.
pub fn save_model(path: &Path, model: &Classifier) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    match extension(path).as_str() {
        "json" => serde_json::to_writer_pretty(&mut writer, model).context("writing JSON model")?,
        "msgpack" | "mpk" => {
            rmp_serde::encode::write_named(&mut writer, model).context("writing MessagePack model")?
        }
        other => anyhow::bail!("unsupported model format: .{other}"),
    }
    writer.flush().context("flushing model file")?;
    Ok(())
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}
