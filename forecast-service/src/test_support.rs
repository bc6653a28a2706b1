//! Fixtures shared by unit tests across modules.

use std::path::Path;

use time::PrimitiveDateTime;
use usage_domain::{Appliance, UsageRecord, UsageStore};

use crate::{
    features::FEATURE_COLUMNS,
    registry::{Estimator, ModelArtifact, ModelRegistry, ENCODERS_FILE},
};

/// Record with every appliance at zero except the listed ones.
pub fn usage_at(
    ts: PrimitiveDateTime,
    house: &str,
    season: &str,
    readings: &[(Appliance, f64)],
) -> UsageRecord {
    let mut usage = [0.0; Appliance::COUNT];
    for (appliance, value) in readings {
        usage[appliance.index()] = *value;
    }
    UsageRecord::new(ts, house, season, None, usage).unwrap()
}

pub fn store_of(records: Vec<UsageRecord>) -> UsageStore {
    UsageStore::from_records(records).unwrap()
}

/// Encoders fitted on data without a "spring" season.
pub fn write_encoders(dir: &Path) {
    std::fs::write(
        dir.join(ENCODERS_FILE),
        r#"{
            "house": ["H1", "H2", "H3"],
            "season": ["winter", "summer", "autumn", "rainy"],
            "festival": ["No_Festival", "Diwali", "Holi"]
        }"#,
    )
    .unwrap();
}

/// Model that predicts `constant` for every row.
pub fn write_linear_model(dir: &Path, appliance: Appliance, constant: f64) {
    write_linear(dir, appliance, vec![0.0; FEATURE_COLUMNS.len()], constant);
}

/// Model that predicts `slope * hour`.
pub fn write_hour_slope_model(dir: &Path, appliance: Appliance, slope: f64) {
    let mut coefficients = vec![0.0; FEATURE_COLUMNS.len()];
    let hour = FEATURE_COLUMNS.iter().position(|c| *c == "Hour").unwrap();
    coefficients[hour] = slope;
    write_linear(dir, appliance, coefficients, 0.0);
}

fn write_linear(dir: &Path, appliance: Appliance, coefficients: Vec<f64>, intercept: f64) {
    let path = ModelRegistry::open(dir).model_path(appliance);
    ModelArtifact::new(Estimator::Linear {
        coefficients,
        intercept,
    })
    .write_to(&path)
    .unwrap();
}
