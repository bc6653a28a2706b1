//! Per-appliance history and monthly forecasts over the usage store.

mod alert;
mod legacy;
mod strategy;

pub use alert::AlertLevel;
pub use legacy::{slice_report, SliceReport, SliceRequest, SEASON_TOTAL_APPLIANCES};
pub use strategy::{
    default_chain, HistoricalMean, ModelInference, PredictionContext, PredictionStrategy,
    SeasonalAverage, StrategyError,
};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::{Date, Duration, PrimitiveDateTime};
use usage_domain::{
    store::{aggregate_by_calendar_day, aggregate_by_calendar_month, column_sum},
    Appliance, DomainError, UsageRecord, UsageStore, YearMonth,
};

use crate::registry::ModelRegistry;

pub const UNIT_KWH: &str = "kWh";

/// How far back the historical series reaches, and how it is bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRange {
    /// Last 30 days, daily buckets.
    Month,
    /// Last 365 days, monthly buckets.
    Year,
}

impl HistoryRange {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "month" => Some(HistoryRange::Month),
            "year" => Some(HistoryRange::Year),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HistoryRange::Month => "month",
            HistoryRange::Year => "year",
        }
    }

    pub fn lookback(self) -> Duration {
        match self {
            HistoryRange::Month => Duration::days(30),
            HistoryRange::Year => Duration::days(365),
        }
    }
}

/// The month being forecast, with its length resolved up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastTarget {
    pub period: YearMonth,
    pub days: u32,
}

impl ForecastTarget {
    pub fn new(year: i32, month: u8) -> Result<Self, DomainError> {
        let period = YearMonth::new(year, month)?;
        Ok(Self {
            period,
            days: period.days_in_month()?,
        })
    }

    /// Scales a mean hourly usage to a total for the whole month.
    pub fn monthly_total(&self, mean_hourly: f64) -> f64 {
        mean_hourly * 24.0 * f64::from(self.days)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    /// Display names as supplied by the caller; unknown names are skipped.
    pub appliances: Vec<String>,
    pub range: HistoryRange,
    pub target: ForecastTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HistoricalSeries {
    Daily(Vec<(Date, f64)>),
    Monthly(Vec<(YearMonth, f64)>),
}

impl HistoricalSeries {
    pub fn len(&self) -> usize {
        match self {
            HistoricalSeries::Daily(v) => v.len(),
            HistoricalSeries::Monthly(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictedUsage {
    pub value: f64,
    pub unit: &'static str,
    /// Name of the strategy that produced `value`.
    pub method: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplianceForecast {
    pub appliance: Appliance,
    pub historical: HistoricalSeries,
    pub total: f64,
    pub predicted: PredictedUsage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowForecast {
    pub range: HistoryRange,
    pub target: ForecastTarget,
    pub appliances: Vec<ApplianceForecast>,
    /// Requested names that are not in the catalog.
    pub skipped: Vec<String>,
    pub alert: AlertLevel,
}

/// Rows at or after `start`, or every row when that window is empty.
pub fn window_or_all(store: &UsageStore, start: PrimitiveDateTime) -> &[UsageRecord] {
    let window = store.since(start);
    if window.is_empty() {
        tracing::debug!(%start, "historical window empty, using whole dataset");
        store.records()
    } else {
        window
    }
}

pub struct ForecastEngine<'a> {
    store: &'a UsageStore,
    registry: &'a ModelRegistry,
    strategies: Vec<Box<dyn PredictionStrategy>>,
}

impl<'a> ForecastEngine<'a> {
    pub fn new(store: &'a UsageStore, registry: &'a ModelRegistry) -> Self {
        Self {
            store,
            registry,
            strategies: default_chain(),
        }
    }

    pub fn with_strategies(mut self, strategies: Vec<Box<dyn PredictionStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Historical rows for `range`, anchored on the newest row in the dataset.
    pub fn history_window(&self, range: HistoryRange) -> &'a [UsageRecord] {
        let start = self.store.latest_timestamp() - range.lookback();
        window_or_all(self.store, start)
    }

    pub fn forecast(&self, request: &ForecastRequest) -> WorkflowForecast {
        metrics::counter!("forecast_requests_total", "range" => request.range.as_str())
            .increment(1);

        let window = self.history_window(request.range);
        let mut appliances = Vec::with_capacity(request.appliances.len());
        let mut skipped = Vec::new();
        let mut seen = HashSet::new();

        for name in &request.appliances {
            match Appliance::from_display_name(name) {
                // Repeated names count once, as in the keyed response maps.
                Some(appliance) if !seen.insert(appliance) => {}
                Some(appliance) => {
                    appliances.push(self.forecast_appliance(appliance, window, request))
                }
                None => {
                    tracing::warn!(appliance = %name, "skipping unknown appliance");
                    metrics::counter!("forecast_unknown_appliance_total").increment(1);
                    skipped.push(name.clone());
                }
            }
        }

        let avg = if appliances.is_empty() {
            0.0
        } else {
            appliances.iter().map(|a| a.predicted.value).sum::<f64>() / appliances.len() as f64
        };

        WorkflowForecast {
            range: request.range,
            target: request.target,
            appliances,
            skipped,
            alert: AlertLevel::for_predicted_monthly(avg),
        }
    }

    fn forecast_appliance(
        &self,
        appliance: Appliance,
        window: &[UsageRecord],
        request: &ForecastRequest,
    ) -> ApplianceForecast {
        let historical = match request.range {
            HistoryRange::Month => {
                HistoricalSeries::Daily(aggregate_by_calendar_day(window, appliance))
            }
            HistoryRange::Year => {
                HistoricalSeries::Monthly(aggregate_by_calendar_month(window, appliance))
            }
        };

        let ctx = PredictionContext {
            appliance,
            target: request.target.period,
            window,
            house_id: self.store.dominant_house(),
            registry: self.registry,
        };

        ApplianceForecast {
            appliance,
            historical,
            total: column_sum(window, appliance),
            predicted: self.predict(&ctx, &request.target),
        }
    }

    fn predict(&self, ctx: &PredictionContext<'_>, target: &ForecastTarget) -> PredictedUsage {
        for strategy in &self.strategies {
            match strategy.mean_hourly_usage(ctx) {
                Ok(mean_hourly) => {
                    metrics::counter!("forecast_strategy_used_total", "strategy" => strategy.name())
                        .increment(1);
                    tracing::debug!(
                        appliance = %ctx.appliance,
                        strategy = strategy.name(),
                        mean_hourly,
                        "monthly usage predicted"
                    );
                    return PredictedUsage {
                        value: target.monthly_total(mean_hourly),
                        unit: UNIT_KWH,
                        method: strategy.name(),
                    };
                }
                Err(e) => {
                    tracing::debug!(
                        appliance = %ctx.appliance,
                        strategy = strategy.name(),
                        reason = %e,
                        "prediction strategy skipped"
                    );
                }
            }
        }

        tracing::warn!(appliance = %ctx.appliance, "no prediction strategy succeeded");
        PredictedUsage {
            value: 0.0,
            unit: UNIT_KWH,
            method: "none",
        }
    }
}
