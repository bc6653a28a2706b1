//! Single-appliance, single-day chart query used by the original dashboard.

use std::collections::BTreeMap;

use usage_domain::{
    store::{aggregate_daily, aggregate_hourly, column_sum},
    Appliance, SliceQuery, UsageStore,
};

use super::AlertLevel;

/// Appliances listed in the season breakdown chart, in display order.
pub const SEASON_TOTAL_APPLIANCES: [Appliance; 6] = [
    Appliance::Ac,
    Appliance::Fridge,
    Appliance::Lights,
    Appliance::Fan,
    Appliance::WashingMachine,
    Appliance::Tv,
];

#[derive(Debug, Clone, PartialEq)]
pub struct SliceRequest {
    pub appliance: Appliance,
    /// Accepted for compatibility; no chart depends on it.
    pub hour: u8,
    pub day: u8,
    pub month: u8,
    pub year: i32,
    pub season: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SliceReport {
    /// Hour of day -> mean usage on the selected day.
    pub hourly: BTreeMap<u8, f64>,
    /// Day of month -> summed usage in the selected month.
    pub daily: BTreeMap<u8, f64>,
    /// Season-wide totals for [`SEASON_TOTAL_APPLIANCES`].
    pub season_totals: Vec<(Appliance, f64)>,
    pub alert: AlertLevel,
}

pub fn slice_report(store: &UsageStore, req: &SliceRequest) -> SliceReport {
    metrics::counter!("legacy_slice_requests_total").increment(1);

    let day_rows = store.slice_by(&SliceQuery {
        day: Some(req.day),
        month: Some(req.month),
        year: Some(req.year),
        season: Some(req.season.clone()),
    });
    let hourly = aggregate_hourly(day_rows.iter().copied(), req.appliance);

    let month_rows = store.slice_by(&SliceQuery {
        month: Some(req.month),
        year: Some(req.year),
        season: Some(req.season.clone()),
        ..SliceQuery::default()
    });
    let daily = aggregate_daily(month_rows.iter().copied(), req.appliance);

    let season_rows = store.slice_by(&SliceQuery {
        season: Some(req.season.clone()),
        ..SliceQuery::default()
    });
    let season_totals = SEASON_TOTAL_APPLIANCES
        .into_iter()
        .map(|a| (a, column_sum(season_rows.iter().copied(), a)))
        .collect();

    // An empty day has no mean and reads as normal.
    let alert = if hourly.is_empty() {
        AlertLevel::Normal
    } else {
        AlertLevel::for_hourly_mean(hourly.values().sum::<f64>() / hourly.len() as f64)
    };

    tracing::debug!(
        appliance = %req.appliance,
        day_rows = day_rows.len(),
        month_rows = month_rows.len(),
        season_rows = season_rows.len(),
        "legacy slice computed"
    );

    SliceReport {
        hourly,
        daily,
        season_totals,
        alert,
    }
}
