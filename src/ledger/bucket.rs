//! Buckets are stateful pools of money (savings or debt) that may accrue interest.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::trace;
use uuid::Uuid;

use crate::errors::{MiserError, MiserResult};

/// How often an annual rate is compounded, expressed as a per-day rate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Compounding {
    Monthly,
    Yearly,
    Daily,
    Continuous,
}

impl Compounding {
    /// Rate applied to a bucket's amount for one simulated day.
    pub fn daily_rate(self, annual_rate: f64) -> f64 {
        match self {
            Compounding::Monthly => (1.0 + annual_rate).powf(1.0 / 30.0) - 1.0,
            Compounding::Yearly => (1.0 + annual_rate).powf(1.0 / 365.0) - 1.0,
            Compounding::Daily => annual_rate,
            Compounding::Continuous => (annual_rate / 365.0).exp() - 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Compounding::Monthly => "monthly",
            Compounding::Yearly => "yearly",
            Compounding::Daily => "daily",
            Compounding::Continuous => "continuous",
        }
    }
}

impl FromStr for Compounding {
    type Err = MiserError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(Compounding::Monthly),
            "yearly" => Ok(Compounding::Yearly),
            "daily" => Ok(Compounding::Daily),
            "continuous" | "continuously" => Ok(Compounding::Continuous),
            _ => Err(MiserError::UnknownCompounding(value.to_string())),
        }
    }
}

impl fmt::Display for Compounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a bucket holds money (savings) or owes it (debt).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BucketRole {
    Savings,
    Debt,
}

impl BucketRole {
    /// Sign applied to the configured magnitude when the bucket is created.
    fn sign(self) -> f64 {
        match self {
            BucketRole::Savings => 1.0,
            BucketRole::Debt => -1.0,
        }
    }
}

impl fmt::Display for BucketRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BucketRole::Savings => "Savings",
            BucketRole::Debt => "Debt",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct Bucket {
    pub id: Uuid,
    pub name: String,
    pub role: BucketRole,
    pub rate: f64,
    pub compounding: Option<Compounding>,
    pub begin: Option<NaiveDate>,
    amount: f64,
    principal: f64,
    interest_accrued: f64,
}

impl Bucket {
    /// Creates a bucket holding `magnitude`; debt buckets store it negated.
    pub fn new(name: impl Into<String>, role: BucketRole, magnitude: f64) -> Self {
        let amount = magnitude * role.sign();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            role,
            rate: 0.0,
            compounding: None,
            begin: None,
            amount,
            principal: amount,
            interest_accrued: 0.0,
        }
    }

    pub fn savings(name: impl Into<String>, amount: f64) -> Self {
        Self::new(name, BucketRole::Savings, amount)
    }

    pub fn debt(name: impl Into<String>, amount: f64) -> Self {
        Self::new(name, BucketRole::Debt, amount)
    }

    pub fn with_interest(mut self, rate: f64, compounding: Compounding) -> Self {
        self.rate = rate;
        self.compounding = Some(compounding);
        self
    }

    /// Like [`Bucket::with_interest`] but takes the compounding period by name.
    pub fn with_interest_named(self, rate: f64, compounding: &str) -> MiserResult<Self> {
        let compounding = compounding.parse::<Compounding>()?;
        Ok(self.with_interest(rate, compounding))
    }

    pub fn beginning(mut self, begin: NaiveDate) -> Self {
        self.begin = Some(begin);
        self
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn interest_accrued(&self) -> f64 {
        self.interest_accrued
    }

    pub fn is_savings(&self) -> bool {
        self.role == BucketRole::Savings
    }

    pub fn is_debt(&self) -> bool {
        self.role == BucketRole::Debt
    }

    /// True once the bucket has been introduced, i.e. `date` is on or after `begin`.
    pub fn is_effective(&self, date: NaiveDate) -> bool {
        self.begin.map_or(true, |begin| date >= begin)
    }

    /// Restores the post-construction amount and clears accrued interest.
    pub fn reset(&mut self) {
        self.amount = self.principal;
        self.interest_accrued = 0.0;
    }

    pub fn inc(&mut self, delta: f64) {
        self.amount += delta;
    }

    /// Advances the bucket by one calendar day and returns the interest added.
    pub fn simulate(&mut self, date: NaiveDate) -> f64 {
        if !self.is_effective(date) {
            return 0.0;
        }
        let Some(compounding) = self.compounding else {
            return 0.0;
        };
        let interest = self.amount * compounding.daily_rate(self.rate);
        self.amount += interest;
        self.interest_accrued += interest;
        trace!(bucket = %self.name, %date, interest, amount = self.amount, "accrued interest");
        interest
    }

    /// Amount as seen on `date`; zero before the bucket begins.
    pub fn snapshot(&self, date: NaiveDate) -> f64 {
        if self.is_effective(date) {
            self.amount
        } else {
            0.0
        }
    }
}
