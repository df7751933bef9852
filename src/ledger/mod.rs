//! Ledger domain models: schedules, buckets, transactions, goals and the
//! ledger that ties them to a simulation.

pub mod bucket;
pub mod goal;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod recurrence;
pub mod transaction;
pub mod window;

pub use bucket::{Bucket, BucketRole, Compounding};
pub use goal::{Goal, GoalStatus};
pub use ledger::Ledger;
pub use recurrence::{open_start, RecurrenceKind, RecurrenceRule, Schedule};
pub use transaction::{AmountSource, Polarity, Transaction};
pub use window::DateWindow;

/// Weekday constants for weekly rules.
pub use chrono::Weekday;
