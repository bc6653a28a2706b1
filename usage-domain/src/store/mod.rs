mod usage_queries;

pub use usage_queries::{
    aggregate_by_calendar_day, aggregate_by_calendar_month, aggregate_daily, aggregate_hourly,
    column_mean, column_sum, SliceQuery,
};

use std::collections::HashMap;

use time::PrimitiveDateTime;

use crate::domain::UsageRecord;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("usage dataset contains no rows")]
    Empty,
}

/// Read-only, time-ordered view over the historical usage table.
///
/// Built once at startup; nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct UsageStore {
    records: Vec<UsageRecord>,
    dominant_house: String,
}

impl UsageStore {
    pub fn from_records(mut records: Vec<UsageRecord>) -> Result<Self, StoreError> {
        if records.is_empty() {
            return Err(StoreError::Empty);
        }
        records.sort_by_key(|r| r.ts());
        let dominant_house = most_frequent_house(&records);
        Ok(Self {
            records,
            dominant_house,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[UsageRecord] {
        &self.records
    }

    /// Newest timestamp in the dataset; recency windows are anchored here, not on wall-clock time.
    pub fn latest_timestamp(&self) -> PrimitiveDateTime {
        // from_records rejects empty input
        self.records[self.records.len() - 1].ts()
    }

    /// Rows with a timestamp at or after `start`.
    pub fn since(&self, start: PrimitiveDateTime) -> &[UsageRecord] {
        let idx = self.records.partition_point(|r| r.ts() < start);
        &self.records[idx..]
    }

    pub fn slice_by(&self, query: &SliceQuery) -> Vec<&UsageRecord> {
        self.records.iter().filter(|r| query.matches(r)).collect()
    }

    /// House id seen most often; ties go to the lexicographically smallest id.
    pub fn dominant_house(&self) -> &str {
        &self.dominant_house
    }
}

fn most_frequent_house(records: &[UsageRecord]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in records {
        *counts.entry(r.house_id()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|(a_id, a_n), (b_id, b_n)| a_n.cmp(b_n).then_with(|| b_id.cmp(a_id)))
        .map(|(id, _)| id.to_string())
        .unwrap_or_default()
}
