use std::{
    fmt,
    fs::File,
    io::{BufReader, BufWriter},
    panic::{self, AssertUnwindSafe},
    path::Path,
};

use serde::{Deserialize, Serialize};
use smartcore::{
    ensemble::random_forest_regressor::RandomForestRegressor, linalg::basic::matrix::DenseMatrix,
};

use crate::features::{FeatureVector, FEATURE_COLUMNS};

pub type ForestRegressor = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

#[derive(thiserror::Error, Debug)]
pub enum ModelLoadError {
    #[error("failed to open model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode model artifact: {0}")]
    Decode(#[from] bincode::Error),
    #[error("model artifact is inconsistent: {0}")]
    Invalid(String),
}

#[derive(thiserror::Error, Debug)]
pub enum InferenceError {
    #[error("model expects unknown feature column '{0}'")]
    UnknownFeature(String),
    #[error("estimator failed: {0}")]
    Estimator(String),
    #[error("estimator returned {got} predictions for {expected} rows")]
    RowCount { expected: usize, got: usize },
    #[error("estimator returned a non-finite prediction")]
    NonFinite,
}

/// Fitted regressor persisted by the training job.
#[derive(Serialize, Deserialize)]
pub enum Estimator {
    /// `inputs` is the matrix width the forest was fitted on; smartcore does
    /// not expose it after fitting.
    RandomForest { forest: ForestRegressor, inputs: usize },
    Linear { coefficients: Vec<f64>, intercept: f64 },
}

impl Estimator {
    fn family(&self) -> &'static str {
        match self {
            Estimator::RandomForest { .. } => "RandomForest",
            Estimator::Linear { .. } => "Linear",
        }
    }
}

/// One appliance's model plus the feature-column order it was fitted on.
#[derive(Serialize, Deserialize)]
pub struct ModelArtifact {
    pub feature_columns: Vec<String>,
    pub estimator: Estimator,
}

impl fmt::Debug for ModelArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelArtifact")
            .field("family", &self.estimator.family())
            .field("feature_columns", &self.feature_columns)
            .finish()
    }
}

impl ModelArtifact {
    pub fn new(estimator: Estimator) -> Self {
        Self {
            feature_columns: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            estimator,
        }
    }

    pub fn family(&self) -> &'static str {
        self.estimator.family()
    }

    pub fn read_from(path: &Path) -> Result<Self, ModelLoadError> {
        let reader = BufReader::new(File::open(path)?);
        let artifact: Self = bincode::deserialize_from(reader)?;
        artifact.check()?;
        Ok(artifact)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), ModelLoadError> {
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    fn check(&self) -> Result<(), ModelLoadError> {
        let (expected, what) = match &self.estimator {
            Estimator::Linear { coefficients, .. } => (coefficients.len(), "coefficients"),
            Estimator::RandomForest { inputs, .. } => (*inputs, "fitted inputs"),
        };
        if expected != self.feature_columns.len() {
            return Err(ModelLoadError::Invalid(format!(
                "{expected} {what} for {} feature columns",
                self.feature_columns.len()
            )));
        }
        Ok(())
    }

    /// Positions in [`FEATURE_COLUMNS`] of each column this model expects.
    fn column_positions(&self) -> Result<Vec<usize>, InferenceError> {
        self.feature_columns
            .iter()
            .map(|name| {
                FEATURE_COLUMNS
                    .iter()
                    .position(|c| c == name)
                    .ok_or_else(|| InferenceError::UnknownFeature(name.clone()))
            })
            .collect()
    }

    /// Predicts one value per row, reordering inputs to the artifact's column order.
    pub fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, InferenceError> {
        let positions = self.column_positions()?;
        let width = positions.len();

        let predictions = match &self.estimator {
            Estimator::Linear {
                coefficients,
                intercept,
            } => rows
                .iter()
                .map(|row| {
                    positions
                        .iter()
                        .zip(coefficients)
                        .fold(*intercept, |acc, (&p, c)| acc + row.values[p] * c)
                })
                .collect(),
            Estimator::RandomForest { forest, .. } => {
                let flat: Vec<f64> = rows
                    .iter()
                    .flat_map(|row| positions.iter().map(move |&p| row.values[p]))
                    .collect();
                let x = DenseMatrix::new(rows.len(), width, flat, false);
                // smartcore indexes past a too-narrow matrix instead of erroring.
                panic::catch_unwind(AssertUnwindSafe(|| forest.predict(&x)))
                    .map_err(|_| {
                        InferenceError::Estimator(format!("forest panicked on {width} inputs"))
                    })?
                    .map_err(|e| InferenceError::Estimator(format!("{e:?}")))?
            }
        };

        if predictions.len() != rows.len() {
            return Err(InferenceError::RowCount {
                expected: rows.len(),
                got: predictions.len(),
            });
        }
        if predictions.iter().any(|p| !p.is_finite()) {
            return Err(InferenceError::NonFinite);
        }
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartcore::ensemble::random_forest_regressor::RandomForestRegressorParameters;

    fn row(hour: f64) -> FeatureVector {
        let mut values = [0.0; 13];
        values[3] = hour;
        values[6] = 2024.0;
        FeatureVector { values }
    }

    #[test]
    fn linear_predicts_in_artifact_column_order() {
        // Only "Hour" and "Year" matter, listed in reverse order.
        let artifact = ModelArtifact {
            feature_columns: vec!["Year".to_string(), "Hour".to_string()],
            estimator: Estimator::Linear {
                coefficients: vec![0.0, 0.5],
                intercept: 1.0,
            },
        };
        let preds = artifact.predict(&[row(0.0), row(4.0)]).unwrap();
        assert_eq!(preds, vec![1.0, 3.0]);
    }

    #[test]
    fn unknown_feature_column_fails_inference() {
        let artifact = ModelArtifact {
            feature_columns: vec!["Temperature".to_string()],
            estimator: Estimator::Linear {
                coefficients: vec![1.0],
                intercept: 0.0,
            },
        };
        assert!(matches!(
            artifact.predict(&[row(1.0)]),
            Err(InferenceError::UnknownFeature(c)) if c == "Temperature"
        ));
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fan_model.bin");
        let mut coefficients = vec![0.0; 13];
        coefficients[3] = 2.0;
        ModelArtifact::new(Estimator::Linear {
            coefficients,
            intercept: 0.5,
        })
        .write_to(&path)
        .unwrap();

        let loaded = ModelArtifact::read_from(&path).unwrap();
        assert_eq!(loaded.family(), "Linear");
        assert_eq!(loaded.predict(&[row(3.0)]).unwrap(), vec![6.5]);
    }

    #[test]
    fn mismatched_coefficients_are_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tv_model.bin");
        ModelArtifact::new(Estimator::Linear {
            coefficients: vec![1.0, 2.0],
            intercept: 0.0,
        })
        .write_to(&path)
        .unwrap();
        assert!(matches!(
            ModelArtifact::read_from(&path),
            Err(ModelLoadError::Invalid(_))
        ));
    }

    #[test]
    fn garbage_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ac_model.bin");
        std::fs::write(&path, b"\x07not a model").unwrap();
        assert!(ModelArtifact::read_from(&path).is_err());
    }

    fn fitted_forest() -> ForestRegressor {
        let n = 40;
        let mut flat = Vec::with_capacity(n * 13);
        let mut y = Vec::with_capacity(n);
        for i in 0..n {
            let hour = (i % 24) as f64;
            let mut values = [0.0; 13];
            values[3] = hour;
            values[6] = 2024.0;
            flat.extend_from_slice(&values);
            y.push(if hour < 12.0 { 1.0 } else { 3.0 });
        }
        let x = DenseMatrix::new(n, 13, flat, false);
        let params = RandomForestRegressorParameters {
            max_depth: Some(4),
            min_samples_leaf: 1,
            min_samples_split: 2,
            n_trees: 5,
            m: Some(13),
            keep_samples: false,
            seed: 42,
        };
        ForestRegressor::fit(&x, &y, params).unwrap()
    }

    #[test]
    fn forest_predicts_after_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fridge_model.bin");
        ModelArtifact::new(Estimator::RandomForest {
            forest: fitted_forest(),
            inputs: 13,
        })
        .write_to(&path)
        .unwrap();

        let loaded = ModelArtifact::read_from(&path).unwrap();
        assert_eq!(loaded.family(), "RandomForest");
        let preds = loaded.predict(&[row(2.0), row(20.0)]).unwrap();
        assert_eq!(preds.len(), 2);
        assert!(preds.iter().all(|p| (1.0..=3.0).contains(p)));
        assert_eq!(preds, loaded.predict(&[row(2.0), row(20.0)]).unwrap());
    }

    #[test]
    fn forest_narrower_than_fit_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fan_model.bin");
        ModelArtifact {
            feature_columns: vec!["Hour".to_string()],
            estimator: Estimator::RandomForest {
                forest: fitted_forest(),
                inputs: 13,
            },
        }
        .write_to(&path)
        .unwrap();
        assert!(matches!(
            ModelArtifact::read_from(&path),
            Err(ModelLoadError::Invalid(_))
        ));
    }

    #[test]
    fn forest_given_too_few_inputs_fails_without_panicking() {
        // Mislabelled width slips past the load check; prediction must still fail cleanly.
        let artifact = ModelArtifact {
            feature_columns: vec!["Hour".to_string()],
            estimator: Estimator::RandomForest {
                forest: fitted_forest(),
                inputs: 1,
            },
        };
        assert!(matches!(
            artifact.predict(&[row(2.0), row(20.0)]),
            Err(InferenceError::Estimator(_))
        ));
    }
}
