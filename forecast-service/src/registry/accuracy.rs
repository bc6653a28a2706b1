use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

/// Hold-out metrics recorded by the training job for one appliance model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub r2: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r2_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mae: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rmse: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

pub type AccuracyTable = BTreeMap<String, AccuracyReport>;

#[derive(thiserror::Error, Debug)]
pub enum AccuracyLoadError {
    #[error("failed to read accuracies: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse accuracies: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Reads `accuracies.json`, keyed by appliance display name.
pub fn read_accuracies(path: &Path) -> Result<AccuracyTable, AccuracyLoadError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
