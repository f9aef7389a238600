use crate::artifacts::Artifacts;
use crate::classifier::metrics::{evaluate, Evaluation};
use crate::classifier::Prediction;
use crate::data::model::{PassengerClass, PassengerFeatures, Port, Sex};
use crate::data::stats::Exploration;

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    DataAnalysis,
    Prediction,
    ModelPerformance,
}

impl Page {
    pub const ALL: [Page; 4] = [
        Page::Home,
        Page::DataAnalysis,
        Page::Prediction,
        Page::ModelPerformance,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::DataAnalysis => "Data Analysis",
            Page::Prediction => "Prediction",
            Page::ModelPerformance => "Model Performance",
        }
    }
}

// ---------------------------------------------------------------------------
// Prediction form
// ---------------------------------------------------------------------------

/// Values bound to the prediction form widgets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionForm {
    pub pclass: PassengerClass,
    pub sex: Sex,
    /// Slider, 0..=80.
    pub age: u8,
    pub sibsp: u32,
    pub parch: u32,
    pub fare: f64,
    pub embarked: Port,
}

impl Default for PredictionForm {
    fn default() -> Self {
        Self {
            pclass: PassengerClass::Third,
            sex: Sex::Male,
            age: 30,
            sibsp: 0,
            parch: 0,
            fare: 32.0,
            embarked: Port::Cherbourg,
        }
    }
}

impl PredictionForm {
    pub fn features(&self) -> PassengerFeatures {
        PassengerFeatures {
            pclass: self.pclass,
            sex: self.sex,
            age: self.age as f64,
            sibsp: self.sibsp,
            parch: self.parch,
            fare: self.fare,
            embarked: self.embarked,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Dataset and model, shared read-only for the process lifetime.
    pub artifacts: &'static Artifacts,

    pub page: Page,

    pub form: PredictionForm,

    /// Result of the last "Predict" click.
    pub last_prediction: Option<Prediction>,

    /// Analysis aggregates (computed on first visit).
    exploration: Option<Exploration>,

    /// Model scores (computed on first visit); `Err` holds the message.
    evaluation: Option<Result<Evaluation, String>>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(artifacts: &'static Artifacts) -> Self {
        Self {
            artifacts,
            page: Page::default(),
            form: PredictionForm::default(),
            last_prediction: None,
            exploration: None,
            evaluation: None,
            status_message: None,
        }
    }

    pub fn exploration(&mut self) -> &Exploration {
        let artifacts = self.artifacts;
        self.exploration
            .get_or_insert_with(|| Exploration::compute(&artifacts.dataset))
    }

    pub fn evaluation(&mut self) -> Result<&Evaluation, &str> {
        let artifacts = self.artifacts;
        self.evaluation
            .get_or_insert_with(|| {
                evaluate(&artifacts.model, &artifacts.dataset).map_err(|e| {
                    log::error!("Evaluation failed: {e}");
                    e.to_string()
                })
            })
            .as_ref()
            .map_err(String::as_str)
    }

    /// Run the model on the current form values.
    pub fn predict(&mut self) {
        let features = self.form.features();
        let outcome = features
            .validate()
            .and_then(|()| self.artifacts.model.predict(&features.feature_row()));
        match outcome {
            Ok(prediction) => {
                log::info!(
                    "{:?} -> {} ({:.1}%)",
                    features,
                    prediction.label_text(),
                    prediction.survival_probability() * 100.0
                );
                self.last_prediction = Some(prediction);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Prediction failed: {e}");
                self.last_prediction = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
