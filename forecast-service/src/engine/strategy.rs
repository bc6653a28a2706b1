//! Monthly usage estimators, tried in order until one succeeds.
//!
//! Each strategy yields a mean hourly usage for the target month; the engine
//! scales it to a monthly total.

use usage_domain::{store::column_mean, Appliance, Season, UsageRecord, YearMonth};

use crate::{
    features::{EncodingError, FeatureEncoder},
    registry::{InferenceError, ModelRegistry},
};

#[derive(thiserror::Error, Debug)]
pub enum StrategyError {
    #[error("no model artifact for {0}")]
    ModelUnavailable(Appliance),
    #[error("label encoders are not loaded")]
    EncodersUnavailable,
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error("no historical rows for season '{0}'")]
    NoSeasonRows(Season),
    #[error("no historical rows")]
    NoRows,
}

/// Inputs shared by every strategy for one appliance.
pub struct PredictionContext<'a> {
    pub appliance: Appliance,
    pub target: YearMonth,
    pub window: &'a [UsageRecord],
    pub house_id: &'a str,
    pub registry: &'a ModelRegistry,
}

pub trait PredictionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn mean_hourly_usage(&self, ctx: &PredictionContext<'_>) -> Result<f64, StrategyError>;
}

/// Model inference averaged over the 24 hours of a mid-month day.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelInference;

impl PredictionStrategy for ModelInference {
    fn name(&self) -> &'static str {
        "model"
    }

    fn mean_hourly_usage(&self, ctx: &PredictionContext<'_>) -> Result<f64, StrategyError> {
        let model = ctx
            .registry
            .get(ctx.appliance)
            .ok_or(StrategyError::ModelUnavailable(ctx.appliance))?;
        let encoders = ctx
            .registry
            .encoders()
            .ok_or(StrategyError::EncodersUnavailable)?;

        let rows = FeatureEncoder::new(encoders).month_hours(
            ctx.house_id,
            ctx.target.year,
            ctx.target.month_number(),
        )?;
        let predictions = model.predict(&rows)?;
        Ok(predictions.iter().sum::<f64>() / predictions.len() as f64)
    }
}

/// Mean of historical rows labelled with the target month's season.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeasonalAverage;

impl PredictionStrategy for SeasonalAverage {
    fn name(&self) -> &'static str {
        "seasonal_average"
    }

    fn mean_hourly_usage(&self, ctx: &PredictionContext<'_>) -> Result<f64, StrategyError> {
        let season = Season::of_month(ctx.target.month_number()).for_history_lookup();
        let rows = ctx.window.iter().filter(|r| r.season() == season.as_str());
        column_mean(rows, ctx.appliance).ok_or(StrategyError::NoSeasonRows(season))
    }
}

/// Mean of every historical row, regardless of season.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoricalMean;

impl PredictionStrategy for HistoricalMean {
    fn name(&self) -> &'static str {
        "historical_mean"
    }

    fn mean_hourly_usage(&self, ctx: &PredictionContext<'_>) -> Result<f64, StrategyError> {
        column_mean(ctx.window, ctx.appliance).ok_or(StrategyError::NoRows)
    }
}

/// Model first, then the seasonal average, then the plain historical mean.
pub fn default_chain() -> Vec<Box<dyn PredictionStrategy>> {
    vec![
        Box::new(ModelInference),
        Box::new(SeasonalAverage),
        Box::new(HistoricalMean),
    ]
}
