use time::{Date, PrimitiveDateTime};

use super::{Appliance, DomainError};

/// Festival label stored when the source row has none.
pub const NO_FESTIVAL: &str = "No_Festival";

/// Calendar fields derived once from a record's timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFields {
    pub hour: u8,
    pub day: u8,
    pub month: u8,
    pub year: i32,
    /// 0 = Monday .. 6 = Sunday.
    pub day_of_week: u8,
    pub is_weekend: bool,
}

impl CalendarFields {
    pub fn of(ts: PrimitiveDateTime) -> Self {
        let day_of_week = ts.weekday().number_days_from_monday();
        Self {
            hour: ts.hour(),
            day: ts.day(),
            month: u8::from(ts.month()),
            year: ts.year(),
            day_of_week,
            is_weekend: day_of_week >= 5,
        }
    }
}

/// One row of the historical usage table.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRecord {
    ts: PrimitiveDateTime,
    house_id: String,
    season: String,
    festival: String,
    usage: [f64; Appliance::COUNT],
    calendar: CalendarFields,
}

impl UsageRecord {
    /// Builds a record; `usage` is indexed by catalog position.
    pub fn new(
        ts: PrimitiveDateTime,
        house_id: impl Into<String>,
        season: impl Into<String>,
        festival: Option<String>,
        usage: [f64; Appliance::COUNT],
    ) -> Result<Self, DomainError> {
        if let Some(idx) = usage.iter().position(|v| !v.is_finite() || *v < 0.0) {
            return Err(DomainError::InvalidUsage {
                column: Appliance::ALL[idx].column(),
                value: usage[idx],
            });
        }

        let festival = festival
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| NO_FESTIVAL.to_string());

        Ok(Self {
            ts,
            house_id: house_id.into(),
            season: season.into(),
            festival,
            usage,
            calendar: CalendarFields::of(ts),
        })
    }

    pub fn ts(&self) -> PrimitiveDateTime {
        self.ts
    }

    pub fn date(&self) -> Date {
        self.ts.date()
    }

    pub fn house_id(&self) -> &str {
        &self.house_id
    }

    pub fn season(&self) -> &str {
        &self.season
    }

    pub fn festival(&self) -> &str {
        &self.festival
    }

    pub fn calendar(&self) -> &CalendarFields {
        &self.calendar
    }

    pub fn usage(&self, appliance: Appliance) -> f64 {
        self.usage[appliance.index()]
    }
}
