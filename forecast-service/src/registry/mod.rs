//! Per-appliance model artifacts, shared label encoders and accuracy metadata.
//!
//! Encoders and accuracies are small and read once when the registry is
//! opened. Models are read from disk the first time they are asked for and
//! kept for the life of the process. A missing or unreadable artifact is
//! never an error for callers: lookups return `None` and the forecast falls
//! back to statistical estimates.

mod accuracy;
mod artifact;

pub use accuracy::{read_accuracies, AccuracyLoadError, AccuracyReport, AccuracyTable};
pub use artifact::{Estimator, ForestRegressor, InferenceError, ModelArtifact, ModelLoadError};

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::RwLock;
use serde::Serialize;
use usage_domain::Appliance;

use crate::features::EncoderSet;

pub const ENCODERS_FILE: &str = "encoders.json";
pub const ACCURACIES_FILE: &str = "accuracies.json";

/// Registry-wide counts reported to API clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStatus {
    pub models_available: usize,
    pub models_on_disk: usize,
    pub models_loaded: usize,
    #[serde(rename = "usingML")]
    pub using_ml: bool,
    pub lazy_loading: bool,
}

pub struct ModelRegistry {
    model_dir: PathBuf,
    encoders: Option<EncoderSet>,
    accuracies: AccuracyTable,
    cache: RwLock<HashMap<Appliance, Arc<ModelArtifact>>>,
}

impl ModelRegistry {
    /// Opens the artifact directory. Never fails: missing pieces are logged.
    pub fn open<P: Into<PathBuf>>(model_dir: P) -> Self {
        let model_dir = model_dir.into();
        let encoders = load_encoders(&model_dir.join(ENCODERS_FILE));
        let accuracies = load_accuracy_table(&model_dir.join(ACCURACIES_FILE));

        let registry = Self {
            model_dir,
            encoders,
            accuracies,
            cache: RwLock::new(HashMap::new()),
        };

        tracing::info!(
            model_dir = %registry.model_dir.display(),
            encoders_loaded = registry.encoders_loaded(),
            accuracies = registry.accuracies.len(),
            models_on_disk = registry.models_on_disk(),
            "model registry opened"
        );

        registry
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    pub fn model_path(&self, appliance: Appliance) -> PathBuf {
        self.model_dir
            .join(format!("{}_model.bin", appliance.model_slug()))
    }

    /// Whether an artifact file exists, without reading it.
    pub fn is_available(&self, appliance: Appliance) -> bool {
        self.model_path(appliance).is_file()
    }

    /// Cached model for `appliance`, reading it from disk on first use.
    pub fn get(&self, appliance: Appliance) -> Option<Arc<ModelArtifact>> {
        if let Some(model) = self.cache.read().get(&appliance) {
            return Some(Arc::clone(model));
        }

        let path = self.model_path(appliance);
        if !path.is_file() {
            return None;
        }

        // Read outside the lock; a concurrent first load of the same model
        // produces an identical artifact and the first insert is kept.
        match ModelArtifact::read_from(&path) {
            Ok(model) => {
                tracing::info!(
                    appliance = %appliance,
                    family = model.family(),
                    "loaded model artifact"
                );
                metrics::counter!("models_loaded_total").increment(1);
                let mut cache = self.cache.write();
                let entry = cache.entry(appliance).or_insert_with(|| Arc::new(model));
                Some(Arc::clone(entry))
            }
            Err(e) => {
                tracing::warn!(
                    appliance = %appliance,
                    path = %path.display(),
                    error = %e,
                    "failed to load model artifact"
                );
                metrics::counter!("model_load_errors_total").increment(1);
                None
            }
        }
    }

    pub fn encoders(&self) -> Option<&EncoderSet> {
        self.encoders.as_ref()
    }

    pub fn encoders_loaded(&self) -> bool {
        self.encoders.is_some()
    }

    pub fn encoders_on_disk(&self) -> bool {
        self.model_dir.join(ENCODERS_FILE).is_file()
    }

    pub fn accuracy_for(&self, appliance: Appliance) -> Option<&AccuracyReport> {
        self.accuracies.get(appliance.display_name())
    }

    pub fn accuracies(&self) -> &AccuracyTable {
        &self.accuracies
    }

    pub fn models_available(&self) -> usize {
        Appliance::COUNT
    }

    pub fn models_on_disk(&self) -> usize {
        Appliance::ALL
            .into_iter()
            .filter(|a| self.is_available(*a))
            .count()
    }

    pub fn models_loaded(&self) -> usize {
        self.cache.read().len()
    }

    /// True when at least one model exists on disk and encoders are usable,
    /// whether or not any model has been read yet.
    pub fn using_ml(&self) -> bool {
        self.using_ml_with(self.models_on_disk())
    }

    fn using_ml_with(&self, models_on_disk: usize) -> bool {
        models_on_disk > 0 && (self.encoders_loaded() || self.encoders_on_disk())
    }

    pub fn status(&self) -> RegistryStatus {
        let models_on_disk = self.models_on_disk();
        RegistryStatus {
            models_available: self.models_available(),
            models_on_disk,
            models_loaded: self.models_loaded(),
            using_ml: self.using_ml_with(models_on_disk),
            lazy_loading: true,
        }
    }
}

fn load_encoders(path: &Path) -> Option<EncoderSet> {
    if !path.is_file() {
        tracing::warn!(path = %path.display(), "encoders not found; using statistical forecasts only");
        return None;
    }
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str::<EncoderSet>(&s).map_err(|e| e.to_string()));
    match parsed {
        Ok(enc) => Some(enc),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to load encoders");
            None
        }
    }
}

fn load_accuracy_table(path: &Path) -> AccuracyTable {
    if !path.is_file() {
        return AccuracyTable::new();
    }
    read_accuracies(path).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable accuracies");
        AccuracyTable::new()
    })
}
