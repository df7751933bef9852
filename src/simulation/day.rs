use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::trace;
use uuid::Uuid;

use crate::{
    errors::{MiserError, MiserResult},
    ledger::{Bucket, Transaction},
};

/// State of one bucket at the end of a simulated day.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct BucketSnapshot {
    pub amount: f64,
    pub interest_accrued: f64,
}

/// Cumulative effects of a budget up to and including `date`.
///
/// Transaction effects are running totals since the first simulated day, not
/// the change seen on this single date.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Day {
    pub date: NaiveDate,
    pub effects: HashMap<Uuid, f64>,
    pub buckets: HashMap<Uuid, BucketSnapshot>,
}

impl Day {
    /// Seeds a run: buckets are reset, then `date` is played out on its own.
    pub(crate) fn first(
        date: NaiveDate,
        transactions: &mut [Transaction],
        buckets: &mut [Bucket],
        excluded: &[Uuid],
    ) -> MiserResult<Day> {
        for bucket in buckets.iter_mut() {
            bucket.reset();
        }
        let mut day = Day {
            date,
            effects: HashMap::new(),
            buckets: HashMap::new(),
        };
        day.apply(transactions, buckets, excluded)?;
        Ok(day)
    }

    /// Builds the day after `prev` by adding exactly one day of effects.
    pub(crate) fn next(
        prev: &Day,
        transactions: &mut [Transaction],
        buckets: &mut [Bucket],
        excluded: &[Uuid],
    ) -> MiserResult<Day> {
        let date = prev.date.succ_opt().ok_or(MiserError::InvalidWindow {
            from: prev.date,
            to: prev.date,
        })?;
        let mut day = Day {
            date,
            effects: prev.effects.clone(),
            buckets: HashMap::new(),
        };
        day.apply(transactions, buckets, excluded)?;
        Ok(day)
    }

    /// Transactions run first; interest accrues afterwards on the updated amounts.
    ///
    /// Every effect for the date is drawn before any bucket is touched, so a
    /// failing transaction leaves the buckets as they were.
    fn apply(
        &mut self,
        transactions: &mut [Transaction],
        buckets: &mut [Bucket],
        excluded: &[Uuid],
    ) -> MiserResult<()> {
        let mut drawn = Vec::with_capacity(transactions.len());
        for (index, transaction) in transactions.iter_mut().enumerate() {
            if excluded.contains(&transaction.id) {
                continue;
            }
            transaction.target(buckets)?;
            drawn.push((index, transaction.effect(self.date)?));
        }
        for (index, effect) in drawn {
            let transaction = &transactions[index];
            transaction.settle(effect, buckets)?;
            *self.effects.entry(transaction.id).or_insert(0.0) += effect;
        }
        for bucket in buckets.iter_mut() {
            bucket.simulate(self.date);
            self.buckets.insert(
                bucket.id,
                BucketSnapshot {
                    amount: bucket.snapshot(self.date),
                    interest_accrued: bucket.interest_accrued(),
                },
            );
        }
        trace!(date = %self.date, "built day");
        Ok(())
    }

    /// Cumulative effect of a transaction; zero when it took no part in the run.
    pub fn effect(&self, transaction: Uuid) -> f64 {
        self.effects.get(&transaction).copied().unwrap_or(0.0)
    }

    pub fn bucket(&self, bucket: Uuid) -> Option<&BucketSnapshot> {
        self.buckets.get(&bucket)
    }
}
