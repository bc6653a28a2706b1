use std::collections::BTreeMap;

use time::Date;

use crate::domain::{Appliance, UsageRecord, YearMonth};

/// Exact-match filter over calendar fields and season label.
///
/// Fields left as `None` match every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SliceQuery {
    pub day: Option<u8>,
    pub month: Option<u8>,
    pub year: Option<i32>,
    pub season: Option<String>,
}

impl SliceQuery {
    pub fn matches(&self, record: &UsageRecord) -> bool {
        let c = record.calendar();
        self.day.map_or(true, |d| c.day == d)
            && self.month.map_or(true, |m| c.month == m)
            && self.year.map_or(true, |y| c.year == y)
            && self
                .season
                .as_deref()
                .map_or(true, |s| record.season() == s)
    }
}

/// Mean usage per hour of day. Used for single-day intraday charts.
pub fn aggregate_hourly<'a, I>(rows: I, appliance: Appliance) -> BTreeMap<u8, f64>
where
    I: IntoIterator<Item = &'a UsageRecord>,
{
    let mut acc: BTreeMap<u8, (f64, usize)> = BTreeMap::new();
    for r in rows {
        let e = acc.entry(r.calendar().hour).or_insert((0.0, 0));
        e.0 += r.usage(appliance);
        e.1 += 1;
    }
    acc.into_iter()
        .map(|(hour, (sum, n))| (hour, sum / n as f64))
        .collect()
}

/// Total usage per day of month. Used for single-month charts.
pub fn aggregate_daily<'a, I>(rows: I, appliance: Appliance) -> BTreeMap<u8, f64>
where
    I: IntoIterator<Item = &'a UsageRecord>,
{
    let mut acc = BTreeMap::new();
    for r in rows {
        *acc.entry(r.calendar().day).or_insert(0.0) += r.usage(appliance);
    }
    acc
}

/// Total usage per calendar date, oldest first.
pub fn aggregate_by_calendar_day<'a, I>(rows: I, appliance: Appliance) -> Vec<(Date, f64)>
where
    I: IntoIterator<Item = &'a UsageRecord>,
{
    let mut acc: BTreeMap<Date, f64> = BTreeMap::new();
    for r in rows {
        *acc.entry(r.date()).or_insert(0.0) += r.usage(appliance);
    }
    acc.into_iter().collect()
}

/// Total usage per calendar month, oldest first.
pub fn aggregate_by_calendar_month<'a, I>(rows: I, appliance: Appliance) -> Vec<(YearMonth, f64)>
where
    I: IntoIterator<Item = &'a UsageRecord>,
{
    let mut acc: BTreeMap<YearMonth, f64> = BTreeMap::new();
    for r in rows {
        *acc.entry(YearMonth::of_date(r.date())).or_insert(0.0) += r.usage(appliance);
    }
    acc.into_iter().collect()
}

pub fn column_sum<'a, I>(rows: I, appliance: Appliance) -> f64
where
    I: IntoIterator<Item = &'a UsageRecord>,
{
    rows.into_iter().map(|r| r.usage(appliance)).sum()
}

/// Arithmetic mean of the column, or `None` when there are no rows.
pub fn column_mean<'a, I>(rows: I, appliance: Appliance) -> Option<f64>
where
    I: IntoIterator<Item = &'a UsageRecord>,
{
    let (sum, n) = rows
        .into_iter()
        .fold((0.0, 0usize), |(s, n), r| (s + r.usage(appliance), n + 1));
    (n > 0).then(|| sum / n as f64)
}
