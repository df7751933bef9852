use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::day::Day;
use crate::{
    ledger::{Bucket, BucketRole, DateWindow, Polarity, Transaction},
    utils::sorted_by_amount,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Expenses,
    Income,
    Savings,
    Debt,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Expenses,
        Category::Income,
        Category::Savings,
        Category::Debt,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Expenses => "expenses",
            Category::Income => "income",
            Category::Savings => "savings",
            Category::Debt => "debt",
        };
        f.write_str(label)
    }
}

/// Per-name amounts for each category over a window.
///
/// Transactions or buckets sharing a name are summed into one entry.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Totals {
    pub expenses: BTreeMap<String, f64>,
    pub income: BTreeMap<String, f64>,
    pub savings: BTreeMap<String, f64>,
    pub debt: BTreeMap<String, f64>,
}

impl Totals {
    /// Transaction amounts are `end - base` when a base day precedes the window;
    /// bucket amounts are the snapshots of `end`.
    pub(crate) fn between(
        end: &Day,
        base: Option<&Day>,
        transactions: &[Transaction],
        buckets: &[Bucket],
    ) -> Self {
        let mut totals = Totals::default();
        for txn in transactions {
            let Some(cumulative) = end.effects.get(&txn.id) else {
                continue;
            };
            let amount = cumulative - base.map_or(0.0, |day| day.effect(txn.id));
            let target = match txn.polarity {
                Polarity::Expense => &mut totals.expenses,
                Polarity::Income => &mut totals.income,
            };
            *target.entry(txn.name.clone()).or_insert(0.0) += amount;
        }
        for bucket in buckets {
            let Some(snapshot) = end.bucket(bucket.id) else {
                continue;
            };
            let target = match bucket.role {
                BucketRole::Savings => &mut totals.savings,
                BucketRole::Debt => &mut totals.debt,
            };
            *target.entry(bucket.name.clone()).or_insert(0.0) += snapshot.amount;
        }
        totals
    }

    pub fn category(&self, category: Category) -> &BTreeMap<String, f64> {
        match category {
            Category::Expenses => &self.expenses,
            Category::Income => &self.income,
            Category::Savings => &self.savings,
            Category::Debt => &self.debt,
        }
    }

    pub fn sum(&self, category: Category) -> f64 {
        self.category(category).values().sum()
    }

    /// One scalar per category.
    pub fn summed(&self) -> BTreeMap<Category, f64> {
        Category::ALL
            .iter()
            .map(|category| (*category, self.sum(*category)))
            .collect()
    }

    /// Income plus (negative) expenses.
    pub fn surplus(&self) -> f64 {
        self.sum(Category::Income) + self.sum(Category::Expenses)
    }

    /// Entries of `category` in ascending order of amount.
    pub fn sorted(&self, category: Category) -> Vec<(String, f64)> {
        sorted_by_amount(
            self.category(category)
                .iter()
                .map(|(name, amount)| (name.clone(), *amount)),
        )
    }
}

/// Composite figures describing where money went over a window.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ScalarSummary {
    /// Expenses not moved into savings buckets.
    pub outflow: f64,
    /// Income plus interest earned on savings.
    pub inflow: f64,
    pub towards_savings: f64,
    pub towards_debt: f64,
    pub income: f64,
    pub interest: f64,
    /// Expenses not linked to any bucket.
    pub living_expenses: f64,
    pub num_days: i64,
    pub num_years: f64,
}

impl ScalarSummary {
    pub(crate) fn between(
        window: DateWindow,
        end: &Day,
        base: Option<&Day>,
        transactions: &[Transaction],
        buckets: &[Bucket],
    ) -> Self {
        let role_of = |id: Uuid| buckets.iter().find(|bucket| bucket.id == id).map(|b| b.role);
        let mut summary = ScalarSummary {
            num_days: window.len_days(),
            num_years: window.len_days() as f64 / 365.0,
            ..ScalarSummary::default()
        };

        for txn in transactions {
            let Some(cumulative) = end.effects.get(&txn.id) else {
                continue;
            };
            let amount = cumulative - base.map_or(0.0, |day| day.effect(txn.id));
            let role = txn.towards.and_then(role_of);
            match txn.polarity {
                Polarity::Income => summary.income += amount,
                Polarity::Expense => {
                    match role {
                        Some(BucketRole::Savings) => summary.towards_savings += amount,
                        Some(BucketRole::Debt) => summary.towards_debt += amount,
                        None => summary.living_expenses += amount,
                    }
                    if role != Some(BucketRole::Savings) {
                        summary.outflow += amount;
                    }
                }
            }
        }

        for bucket in buckets.iter().filter(|bucket| bucket.is_savings()) {
            let accrued = |day: &Day| day.bucket(bucket.id).map_or(0.0, |s| s.interest_accrued);
            summary.interest += accrued(end) - base.map_or(0.0, accrued);
        }
        summary.inflow = summary.income + summary.interest;
        summary
    }
}
