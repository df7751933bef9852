//! Transactions move money: each one binds an amount source to a schedule.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::trace;
use uuid::Uuid;

use super::{bucket::Bucket, recurrence::Schedule};
use crate::errors::{MiserError, MiserResult};

/// Direction of a transaction's cash flow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Income,
    Expense,
}

impl Polarity {
    pub fn multiplier(self) -> f64 {
        match self {
            Polarity::Income => 1.0,
            Polarity::Expense => -1.0,
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Polarity::Income => "Income",
            Polarity::Expense => "Expense",
        };
        f.write_str(label)
    }
}

/// Where a transaction's raw amount comes from each time it fires.
pub enum AmountSource {
    Fixed(f64),
    /// Yields one value per firing date; running dry is an error.
    Sequence(Box<dyn Iterator<Item = f64>>),
    /// Invoked afresh on every firing date.
    Callback(Box<dyn FnMut() -> f64>),
}

impl AmountSource {
    pub fn sequence<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
        I::IntoIter: 'static,
    {
        AmountSource::Sequence(Box::new(values.into_iter()))
    }

    pub fn callback<F>(produce: F) -> Self
    where
        F: FnMut() -> f64 + 'static,
    {
        AmountSource::Callback(Box::new(produce))
    }

    /// True when successive values may differ, so each firing must be consumed once.
    pub fn is_stateful(&self) -> bool {
        !matches!(self, AmountSource::Fixed(_))
    }

    fn next_value(&mut self) -> Option<f64> {
        match self {
            AmountSource::Fixed(value) => Some(*value),
            AmountSource::Sequence(values) => values.next(),
            AmountSource::Callback(produce) => Some(produce()),
        }
    }
}

impl From<f64> for AmountSource {
    fn from(value: f64) -> Self {
        AmountSource::Fixed(value)
    }
}

impl fmt::Debug for AmountSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountSource::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            AmountSource::Sequence(_) => f.write_str("Sequence(..)"),
            AmountSource::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

#[derive(Debug)]
pub struct Transaction {
    pub id: Uuid,
    pub name: String,
    pub polarity: Polarity,
    pub schedule: Schedule,
    /// Bucket that receives the opposite of this transaction's effect.
    pub towards: Option<Uuid>,
    pub tags: Vec<String>,
    amount: AmountSource,
}

impl Transaction {
    pub fn new(
        name: impl Into<String>,
        polarity: Polarity,
        amount: impl Into<AmountSource>,
        on: impl Into<Schedule>,
    ) -> MiserResult<Self> {
        let name = name.into();
        let schedule = on.into();
        if schedule.is_empty() {
            return Err(MiserError::InvalidSchedule(format!(
                "transaction `{name}` has no dates or recurrence rules"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            polarity,
            schedule,
            towards: None,
            tags: Vec::new(),
            amount: amount.into(),
        })
    }

    pub fn expense(
        name: impl Into<String>,
        amount: impl Into<AmountSource>,
        on: impl Into<Schedule>,
    ) -> MiserResult<Self> {
        Self::new(name, Polarity::Expense, amount, on)
    }

    pub fn income(
        name: impl Into<String>,
        amount: impl Into<AmountSource>,
        on: impl Into<Schedule>,
    ) -> MiserResult<Self> {
        Self::new(name, Polarity::Income, amount, on)
    }

    pub fn towards(mut self, bucket: &Bucket) -> Self {
        self.towards = Some(bucket.id);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn has_stateful_amount(&self) -> bool {
        self.amount.is_stateful()
    }

    pub fn fires_on(&self, date: NaiveDate) -> bool {
        self.schedule.fires_on(date)
    }

    /// Signed effect on `date`. Draws one value from the amount source when the
    /// schedule fires, nothing otherwise.
    pub fn effect(&mut self, date: NaiveDate) -> MiserResult<f64> {
        if !self.fires_on(date) {
            return Ok(0.0);
        }
        let raw = self
            .amount
            .next_value()
            .ok_or_else(|| MiserError::AmountSourceExhausted(self.name.clone()))?;
        let effect = raw * self.polarity.multiplier();
        trace!(transaction = %self.name, %date, effect, "transaction fired");
        Ok(effect)
    }

    /// Computes the effect on `date` and moves its opposite into the linked bucket.
    pub fn simulate(&mut self, date: NaiveDate, buckets: &mut [Bucket]) -> MiserResult<f64> {
        let target = self.target(buckets)?;
        let effect = self.effect(date)?;
        if let Some(index) = target {
            buckets[index].inc(-effect);
        }
        Ok(effect)
    }

    /// Moves the opposite of an already drawn `effect` into the linked bucket.
    pub fn settle(&self, effect: f64, buckets: &mut [Bucket]) -> MiserResult<()> {
        if effect == 0.0 {
            return Ok(());
        }
        if let Some(index) = self.target(buckets)? {
            buckets[index].inc(-effect);
        }
        Ok(())
    }

    /// Position of the linked bucket in `buckets`, if the transaction has one.
    pub(crate) fn target(&self, buckets: &[Bucket]) -> MiserResult<Option<usize>> {
        let Some(id) = self.towards else {
            return Ok(None);
        };
        buckets
            .iter()
            .position(|bucket| bucket.id == id)
            .map(Some)
            .ok_or_else(|| {
                MiserError::UnknownBucket(format!(
                    "transaction `{}` points at bucket {id}",
                    self.name
                ))
            })
    }
}
