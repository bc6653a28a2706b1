pub mod api;
pub mod config;
pub mod engine;
pub mod features;
pub mod metrics_server;
pub mod observability;
pub mod registry;
pub mod report;
pub mod sources;
pub mod transform;

#[cfg(test)]
pub(crate) mod test_support;

pub use engine::{ForecastEngine, ForecastRequest, HistoryRange, WorkflowForecast};
pub use registry::ModelRegistry;
pub use sources::UsageCsvFileSource;
