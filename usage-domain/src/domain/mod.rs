mod appliance;
mod calendar;
mod season;
mod usage_record;

pub use appliance::Appliance;
pub use calendar::{days_in_month, YearMonth};
pub use season::Season;
pub use usage_record::{CalendarFields, UsageRecord, NO_FESTIVAL};

#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u8),
    #[error("invalid calendar date: {0}")]
    InvalidDate(String),
    #[error("usage for '{column}' must be a non-negative number, got {value}")]
    InvalidUsage { column: &'static str, value: f64 },
}
