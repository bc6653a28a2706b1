//! Feature vectors for the per-appliance regression models.
//!
//! The column layout mirrors what the offline training job fits on, so the
//! order of [`FEATURE_COLUMNS`] is part of the artifact contract.

use std::f64::consts::PI;

use serde::Deserialize;
use time::{Date, Month};
use usage_domain::{domain::NO_FESTIVAL, Season};

pub const FEATURE_COLUMNS: [&str; 13] = [
    "house_id_encoded",
    "season_encoded",
    "festival_encoded",
    "Hour",
    "Day",
    "Month",
    "Year",
    "DayOfWeek",
    "IsWeekend",
    "Hour_sin",
    "Hour_cos",
    "Month_sin",
    "Month_cos",
];

/// Forecast targets cover a whole month; calendar features use this day.
pub const MID_MONTH_DAY: u8 = 15;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum EncodingError {
    #[error("{encoder} encoder has no class '{value}'")]
    UnseenCategory { encoder: &'static str, value: String },
    #[error("invalid target date {year}-{month}: {reason}")]
    InvalidDate { year: i32, month: u8, reason: String },
}

/// Maps category labels to the index of the label in the sorted class list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<String>")]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl From<Vec<String>> for LabelEncoder {
    fn from(mut classes: Vec<String>) -> Self {
        classes.sort();
        classes.dedup();
        Self { classes }
    }
}

impl LabelEncoder {
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn encode(&self, name: &'static str, value: &str) -> Result<f64, EncodingError> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .map(|idx| idx as f64)
            .map_err(|_| EncodingError::UnseenCategory {
                encoder: name,
                value: value.to_string(),
            })
    }
}

/// The three categorical encoders shared by every appliance model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EncoderSet {
    pub house: LabelEncoder,
    pub season: LabelEncoder,
    pub festival: LabelEncoder,
}

/// A single model input row, ordered as [`FEATURE_COLUMNS`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub values: [f64; 13],
}

impl FeatureVector {
    pub fn get(&self, column: &str) -> Option<f64> {
        FEATURE_COLUMNS
            .iter()
            .position(|c| *c == column)
            .map(|idx| self.values[idx])
    }
}

/// Builds inputs for a month-level forecast of one house.
pub struct FeatureEncoder<'a> {
    encoders: &'a EncoderSet,
}

impl<'a> FeatureEncoder<'a> {
    pub fn new(encoders: &'a EncoderSet) -> Self {
        Self { encoders }
    }

    /// One vector per hour of day (0..24) for the target month.
    ///
    /// Day-of-week and weekend flags come from the 15th of the month. The season
    /// is the calendar season of the month, not the history lookup season.
    pub fn month_hours(
        &self,
        house_id: &str,
        year: i32,
        month: u8,
    ) -> Result<Vec<FeatureVector>, EncodingError> {
        let invalid = |reason: String| EncodingError::InvalidDate { year, month, reason };
        let cal_month = Month::try_from(month).map_err(|e| invalid(e.to_string()))?;
        let mid = Date::from_calendar_date(year, cal_month, MID_MONTH_DAY)
            .map_err(|e| invalid(e.to_string()))?;

        let house = self.encoders.house.encode("house", house_id)?;
        let season = self
            .encoders
            .season
            .encode("season", Season::of_month(month).as_str())?;
        let festival = self.encoders.festival.encode("festival", NO_FESTIVAL)?;

        let day_of_week = mid.weekday().number_days_from_monday();
        let is_weekend = if day_of_week >= 5 { 1.0 } else { 0.0 };
        let month_angle = 2.0 * PI * f64::from(month) / 12.0;

        Ok((0..24u8)
            .map(|hour| {
                let hour_angle = 2.0 * PI * f64::from(hour) / 24.0;
                FeatureVector {
                    values: [
                        house,
                        season,
                        festival,
                        f64::from(hour),
                        f64::from(MID_MONTH_DAY),
                        f64::from(month),
                        f64::from(year),
                        f64::from(day_of_week),
                        is_weekend,
                        hour_angle.sin(),
                        hour_angle.cos(),
                        month_angle.sin(),
                        month_angle.cos(),
                    ],
                }
            })
            .collect())
    }
}
