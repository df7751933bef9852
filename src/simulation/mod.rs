//! Day-by-day simulation engine and the aggregate views read off it.

pub mod day;
pub mod engine;
pub mod types;

pub use day::{BucketSnapshot, Day};
pub use engine::Simulation;
pub use types::{Category, ScalarSummary, Totals};
