use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use super::{
    bucket::Bucket,
    goal::{Goal, GoalStatus},
    transaction::Transaction,
    window::DateWindow,
};
use crate::{
    errors::{MiserError, MiserResult},
    simulation::{Category, Day, ScalarSummary, Simulation, Totals},
    utils::sorted_by_amount,
};

/// Holds transactions, buckets and goals, and plays out their effect over time.
///
/// Simulated days are cached; attaching a transaction or bucket clears the cache.
#[derive(Debug)]
pub struct Ledger {
    pub id: Uuid,
    pub name: String,
    pub initial_balance: f64,
    transactions: Vec<Transaction>,
    buckets: Vec<Bucket>,
    goals: Vec<Goal>,
    simulation: Simulation,
}

impl Ledger {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            initial_balance: 0.0,
            transactions: Vec::new(),
            buckets: Vec::new(),
            goals: Vec::new(),
            simulation: Simulation::new(),
        }
    }

    pub fn with_initial_balance(mut self, balance: f64) -> Self {
        self.initial_balance = balance;
        self
    }

    /// Adds a transaction. Its linked bucket, if any, must already be attached.
    pub fn add_transaction(&mut self, transaction: Transaction) -> MiserResult<Uuid> {
        if let Some(bucket_id) = transaction.towards {
            if self.bucket(bucket_id).is_none() {
                return Err(MiserError::UnknownBucket(format!(
                    "transaction `{}` points at bucket {bucket_id} which is not in ledger `{}`",
                    transaction.name, self.name
                )));
            }
        }
        let id = transaction.id;
        self.transactions.push(transaction);
        self.invalidate();
        Ok(id)
    }

    pub fn add_transactions<I>(&mut self, transactions: I) -> MiserResult<()>
    where
        I: IntoIterator<Item = Transaction>,
    {
        for transaction in transactions {
            self.add_transaction(transaction)?;
        }
        Ok(())
    }

    pub fn add_bucket(&mut self, bucket: Bucket) -> Uuid {
        let id = bucket.id;
        self.buckets.push(bucket);
        self.invalidate();
        id
    }

    pub fn add_goal(&mut self, goal: Goal) {
        self.goals.push(goal);
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn transaction_by_name(&self, name: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.name == name)
    }

    pub fn bucket(&self, id: Uuid) -> Option<&Bucket> {
        self.buckets.iter().find(|bucket| bucket.id == id)
    }

    pub fn bucket_by_name(&self, name: &str) -> Option<&Bucket> {
        self.buckets.iter().find(|bucket| bucket.name == name)
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Cached simulation state.
    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Drops every cached day; the next query starts a fresh run.
    pub fn invalidate(&mut self) {
        if !self.simulation.is_empty() {
            debug!(ledger = %self.name, "discarding cached simulation");
        }
        self.simulation.clear();
    }

    /// Simulates `[from, to]` (reusing cached days) and returns its totals.
    pub fn simulate(&mut self, from: NaiveDate, to: NaiveDate) -> MiserResult<Totals> {
        let window = self.ensure_simulated(from, to)?;
        let (end, base) = self.window_days(window)?;
        Ok(Totals::between(end, base, &self.transactions, &self.buckets))
    }

    pub fn totals(&mut self, from: NaiveDate, to: NaiveDate) -> MiserResult<Totals> {
        self.simulate(from, to)
    }

    pub fn income(&mut self, from: NaiveDate, to: NaiveDate) -> MiserResult<BTreeMap<String, f64>> {
        Ok(self.simulate(from, to)?.income)
    }

    pub fn expenses(
        &mut self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> MiserResult<BTreeMap<String, f64>> {
        Ok(self.simulate(from, to)?.expenses)
    }

    /// Income minus expenses over `[from, to]`.
    pub fn surplus(&mut self, from: NaiveDate, to: NaiveDate) -> MiserResult<f64> {
        Ok(self.simulate(from, to)?.surplus())
    }

    /// Initial balance plus the surplus over `[from, to]`.
    pub fn total_saved(&mut self, from: NaiveDate, to: NaiveDate) -> MiserResult<f64> {
        Ok(self.initial_balance + self.surplus(from, to)?)
    }

    /// Evaluates each goal on what was saved from `from` until its deadline,
    /// or until `to` when the deadline lies later.
    pub fn goal_status(&mut self, from: NaiveDate, to: NaiveDate) -> MiserResult<Vec<GoalStatus>> {
        let window = DateWindow::new(from, to)?;
        let goals = self.goals.clone();
        let mut statuses = Vec::with_capacity(goals.len());
        for goal in &goals {
            let saved = match window.truncate(goal.by) {
                Some(until) => self.total_saved(until.start, until.end)?,
                None => self.initial_balance,
            };
            statuses.push(GoalStatus::evaluate(goal, saved));
        }
        Ok(statuses)
    }

    pub fn scalar_summary(&mut self, from: NaiveDate, to: NaiveDate) -> MiserResult<ScalarSummary> {
        let window = self.ensure_simulated(from, to)?;
        let (end, base) = self.window_days(window)?;
        Ok(ScalarSummary::between(
            window,
            end,
            base,
            &self.transactions,
            &self.buckets,
        ))
    }

    /// Each expense's share of total expenses, largest expense first.
    pub fn expense_shares(&mut self, from: NaiveDate, to: NaiveDate) -> MiserResult<Vec<(String, f64)>> {
        let totals = self.simulate(from, to)?;
        let total = totals.sum(Category::Expenses);
        if total == 0.0 {
            return Err(MiserError::DivisionByZero(format!(
                "no expenses between {from} and {to} to compute shares of"
            )));
        }
        Ok(totals
            .sorted(Category::Expenses)
            .into_iter()
            .map(|(name, amount)| (name, amount / total))
            .collect())
    }

    /// Net transaction amounts per tag, ascending. Untagged transactions are left out.
    pub fn totals_by_tag(&mut self, from: NaiveDate, to: NaiveDate) -> MiserResult<Vec<(String, f64)>> {
        let window = self.ensure_simulated(from, to)?;
        let (end, base) = self.window_days(window)?;
        let mut by_tag: BTreeMap<String, f64> = BTreeMap::new();
        for txn in &self.transactions {
            let amount = end.effect(txn.id) - base.map_or(0.0, |day| day.effect(txn.id));
            for tag in &txn.tags {
                *by_tag.entry(tag.clone()).or_insert(0.0) += amount;
            }
        }
        Ok(sorted_by_amount(by_tag))
    }

    /// Runs a throwaway simulation of `[from, to]` without the given transactions.
    ///
    /// Buckets are copied so the cached run is left untouched. Stateful amount
    /// sources are shared and do advance.
    pub fn simulate_excluding(
        &mut self,
        from: NaiveDate,
        to: NaiveDate,
        excluded: &[Uuid],
    ) -> MiserResult<Totals> {
        if let Some(missing) = excluded.iter().find(|id| self.transaction(**id).is_none()) {
            return Err(MiserError::UnknownTransaction(missing.to_string()));
        }
        let window = DateWindow::new(from, to)?;
        let mut buckets = self.buckets.clone();
        let mut scratch = Simulation::excluding(excluded);
        scratch.run(window, &mut self.transactions, &mut buckets)?;
        let end = scratch
            .day(window.end)
            .ok_or(MiserError::InvalidWindow { from, to })?;
        Ok(Totals::between(end, None, &self.transactions, &buckets))
    }

    fn ensure_simulated(&mut self, from: NaiveDate, to: NaiveDate) -> MiserResult<DateWindow> {
        let window = DateWindow::new(from, to)?;
        self.simulation
            .run(window, &mut self.transactions, &mut self.buckets)?;
        Ok(window)
    }

    /// The day ending the window, plus the day before it when that is cached.
    fn window_days(&self, window: DateWindow) -> MiserResult<(&Day, Option<&Day>)> {
        let end = self
            .simulation
            .day(window.end)
            .ok_or(MiserError::InvalidWindow {
                from: window.start,
                to: window.end,
            })?;
        let base = window
            .start
            .pred_opt()
            .and_then(|previous| self.simulation.day(previous));
        Ok((end, base))
    }
}
