#![doc(test(attr(deny(warnings))))]

//! Miser projects a personal budget day by day: recurring and one-off
//! income and expenses are played out over a date range and may feed
//! savings or debt buckets that accrue interest.

pub mod config;
pub mod errors;
pub mod ledger;
pub mod simulation;
pub mod utils;

pub use errors::{MiserError, MiserResult};
pub use ledger::{
    AmountSource, Bucket, BucketRole, Compounding, DateWindow, Goal, GoalStatus, Ledger,
    Polarity, RecurrenceKind, RecurrenceRule, Schedule, Transaction,
};
pub use simulation::{Category, Day, ScalarSummary, Simulation, Totals};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(utils::DEFAULT_LOG_FILTER);
        tracing::info!("Miser tracing initialized.");
    });
}
