use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A target amount to have saved by a deadline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub name: String,
    pub amount: f64,
    pub by: NaiveDate,
}

impl Goal {
    pub fn new(name: impl Into<String>, amount: f64, by: NaiveDate) -> Self {
        Self {
            name: name.into(),
            amount,
            by,
        }
    }
}

/// Outcome of evaluating a [`Goal`] against simulated totals.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GoalStatus {
    pub name: String,
    pub target: f64,
    pub by: NaiveDate,
    pub saved: f64,
    /// `saved - target`: spare money when non-negative, shortfall otherwise.
    pub difference: f64,
}

impl GoalStatus {
    pub(crate) fn evaluate(goal: &Goal, saved: f64) -> Self {
        Self {
            name: goal.name.clone(),
            target: goal.amount,
            by: goal.by,
            saved,
            difference: saved - goal.amount,
        }
    }

    pub fn met(&self) -> bool {
        self.difference >= 0.0
    }
}
