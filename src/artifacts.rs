use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};

use crate::classifier::{self, Classifier};
use crate::data::loader;
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Process-wide read-only artifacts
// ---------------------------------------------------------------------------

/// The passenger table and the classifier, loaded once and never mutated.
#[derive(Debug)]
pub struct Artifacts {
    pub dataset: Dataset,
    pub model: Classifier,
    pub data_path: PathBuf,
    pub model_path: PathBuf,
}

static ARTIFACTS: OnceLock<Artifacts> = OnceLock::new();

impl Artifacts {
    /// Read both files. Does not touch the process-wide instance.
    pub fn load(data_path: &Path, model_path: &Path) -> Result<Self> {
        let dataset = loader::load_file(data_path).context("loading dataset")?;
        let model = classifier::load_model(model_path).context("loading model")?;
        Ok(Artifacts {
            dataset,
            model,
            data_path: data_path.to_path_buf(),
            model_path: model_path.to_path_buf(),
        })
    }
}

/// Load the artifacts and install them for the rest of the process.
///
/// Only the first successful call reads from disk; later calls return the
/// installed instance and ignore their arguments.
pub fn init(data_path: &Path, model_path: &Path) -> Result<&'static Artifacts> {
    if let Some(existing) = ARTIFACTS.get() {
        log::debug!("Artifacts already initialised, reusing");
        return Ok(existing);
    }
    let loaded = Artifacts::load(data_path, model_path)?;
    Ok(ARTIFACTS.get_or_init(|| loaded))
}

/// The installed artifacts, if [`init`] has succeeded.
pub fn get() -> Option<&'static Artifacts> {
    ARTIFACTS.get()
}
