//! Scenario configuration: a serde model of a whole ledger plus the loader
//! that validates it and builds a [`crate::ledger::Ledger`].

pub mod loader;
pub mod model;

pub use loader::ScenarioLoader;
pub use model::{
    AmountConfig, BucketConfig, DaySelector, EngineSettings, ScenarioConfig, ScheduleConfig,
    TransactionConfig,
};
