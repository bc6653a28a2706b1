pub mod domain;
pub mod store;

pub use domain::{Appliance, DomainError, Season, UsageRecord, YearMonth};
pub use store::{SliceQuery, UsageStore};
