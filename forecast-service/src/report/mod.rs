//! JSON shapes returned to the dashboard.
//!
//! Everything here is a borrowed view over engine output; no values are
//! computed beyond formatting.

use std::collections::BTreeMap;

use serde::Serialize;
use time::{macros::format_description, PrimitiveDateTime};
use usage_domain::UsageStore;

use crate::{
    engine::{AlertLevel, HistoricalSeries, HistoryRange, SliceReport, WorkflowForecast},
    registry::{AccuracyTable, ModelRegistry, RegistryStatus},
};

pub const MODEL_TYPE: &str = "RandomForestRegressor";

#[derive(Debug, Serialize)]
pub struct HourSeries {
    pub hours: Vec<u8>,
    pub values: Vec<f64>,
}

#[derive(Debug, Serialize)]
pub struct DaySeries {
    pub days: Vec<u8>,
    pub values: Vec<f64>,
}

#[derive(Debug, Serialize)]
pub struct LabelledValues {
    pub labels: Vec<&'static str>,
    pub values: Vec<f64>,
}

#[derive(Debug, Serialize)]
pub struct LegacyResponse {
    pub daily: HourSeries,
    pub monthly: DaySeries,
    pub appliance: LabelledValues,
    pub alert: AlertLevel,
}

impl From<&SliceReport> for LegacyResponse {
    fn from(report: &SliceReport) -> Self {
        let (labels, values) = report
            .season_totals
            .iter()
            .map(|(a, v)| (a.display_name(), *v))
            .unzip();
        Self {
            daily: HourSeries {
                hours: report.hourly.keys().copied().collect(),
                values: report.hourly.values().copied().collect(),
            },
            monthly: DaySeries {
                days: report.daily.keys().copied().collect(),
                values: report.daily.values().copied().collect(),
            },
            appliance: LabelledValues { labels, values },
            alert: report.alert,
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HistoricalPayload {
    Daily { dates: Vec<String>, values: Vec<f64> },
    Monthly { periods: Vec<String>, values: Vec<f64> },
}

impl From<&HistoricalSeries> for HistoricalPayload {
    fn from(series: &HistoricalSeries) -> Self {
        match series {
            HistoricalSeries::Daily(days) => HistoricalPayload::Daily {
                dates: days.iter().map(|(d, _)| d.to_string()).collect(),
                values: days.iter().map(|(_, v)| *v).collect(),
            },
            HistoricalSeries::Monthly(months) => HistoricalPayload::Monthly {
                periods: months.iter().map(|(m, _)| m.to_string()).collect(),
                values: months.iter().map(|(_, v)| *v).collect(),
            },
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct PredictedPayload {
    pub predicted: f64,
    pub unit: &'static str,
    pub method: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo<'a> {
    #[serde(flatten)]
    pub status: RegistryStatus,
    pub accuracies: &'a AccuracyTable,
}

impl<'a> ModelInfo<'a> {
    pub fn of(registry: &'a ModelRegistry) -> Self {
        Self {
            status: registry.status(),
            accuracies: registry.accuracies(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResponse<'a> {
    pub historical: BTreeMap<&'static str, HistoricalPayload>,
    pub predicted: BTreeMap<&'static str, PredictedPayload>,
    pub totals: BTreeMap<&'static str, f64>,
    pub range: HistoryRange,
    pub prediction_period: String,
    pub alert: AlertLevel,
    pub model_info: ModelInfo<'a>,
}

impl<'a> WorkflowResponse<'a> {
    pub fn new(forecast: &WorkflowForecast, registry: &'a ModelRegistry) -> Self {
        let mut historical = BTreeMap::new();
        let mut predicted = BTreeMap::new();
        let mut totals = BTreeMap::new();

        for a in &forecast.appliances {
            let name = a.appliance.display_name();
            historical.insert(name, HistoricalPayload::from(&a.historical));
            predicted.insert(
                name,
                PredictedPayload {
                    predicted: a.predicted.value,
                    unit: a.predicted.unit,
                    method: a.predicted.method,
                },
            );
            totals.insert(name, a.total);
        }

        Self {
            historical,
            predicted,
            totals,
            range: forecast.range,
            prediction_period: forecast.target.period.to_string(),
            alert: forecast.alert,
            model_info: ModelInfo::of(registry),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendInfo<'a> {
    pub model_type: &'static str,
    #[serde(flatten)]
    pub status: RegistryStatus,
    pub accuracies: &'a AccuracyTable,
    pub port: u16,
}

impl<'a> BackendInfo<'a> {
    pub fn new(registry: &'a ModelRegistry, port: u16) -> Self {
        Self {
            model_type: MODEL_TYPE,
            status: registry.status(),
            accuracies: registry.accuracies(),
            port,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: &'static str,
    pub rows: usize,
    pub latest_timestamp: String,
}

impl Health {
    pub fn of(store: &UsageStore) -> Self {
        Self {
            status: "ok",
            rows: store.len(),
            latest_timestamp: iso_timestamp(store.latest_timestamp()),
        }
    }
}

fn iso_timestamp(ts: PrimitiveDateTime) -> String {
    let fmt = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    ts.format(fmt).unwrap_or_else(|_| ts.to_string())
}
