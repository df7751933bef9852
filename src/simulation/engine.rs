use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use super::day::Day;
use crate::{
    errors::MiserResult,
    ledger::{Bucket, DateWindow, Transaction},
};

/// Cache of simulated [`Day`]s.
///
/// Cached dates always form one contiguous run: every new day is derived from
/// its immediate predecessor, so a transaction is evaluated at most once per
/// date for as long as the cache lives.
#[derive(Debug, Clone, Default)]
pub struct Simulation {
    days: BTreeMap<NaiveDate, Day>,
    excluded: Vec<Uuid>,
}

impl Simulation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A simulation that leaves the given transactions out of every day.
    pub fn excluding(excluded: &[Uuid]) -> Self {
        Self {
            days: BTreeMap::new(),
            excluded: excluded.to_vec(),
        }
    }

    /// Makes sure every date in `window` is cached.
    ///
    /// Starts a fresh run when nothing is cached or `window` starts before the
    /// cached range; otherwise only days past the latest cached day are built.
    pub fn run(
        &mut self,
        window: DateWindow,
        transactions: &mut [Transaction],
        buckets: &mut [Bucket],
    ) -> MiserResult<()> {
        let needs_seed = match self.earliest() {
            None => true,
            Some(earliest) => window.start < earliest,
        };
        if needs_seed {
            info!(from = %window.start, to = %window.end, "seeding fresh simulation run");
            self.days.clear();
            let first = Day::first(window.start, transactions, buckets, &self.excluded)?;
            self.days.insert(first.date, first);
        }
        self.extend(window.end, transactions, buckets)
    }

    /// Appends days after the latest cached day up to and including `to`.
    pub fn extend(
        &mut self,
        to: NaiveDate,
        transactions: &mut [Transaction],
        buckets: &mut [Bucket],
    ) -> MiserResult<()> {
        let Some(mut previous) = self.latest() else {
            return Ok(());
        };
        if previous >= to {
            return Ok(());
        }
        debug!(from = %previous, to = %to, "extending simulation");
        while previous < to {
            let Some(prev_day) = self.days.get(&previous) else {
                break;
            };
            let next = Day::next(prev_day, transactions, buckets, &self.excluded)?;
            previous = next.date;
            self.days.insert(next.date, next);
        }
        Ok(())
    }

    pub fn day(&self, date: NaiveDate) -> Option<&Day> {
        self.days.get(&date)
    }

    pub fn days(&self) -> impl Iterator<Item = &Day> {
        self.days.values()
    }

    pub fn earliest(&self) -> Option<NaiveDate> {
        self.days.keys().next().copied()
    }

    pub fn latest(&self) -> Option<NaiveDate> {
        self.days.keys().next_back().copied()
    }

    pub fn latest_day(&self) -> Option<&Day> {
        self.days.values().next_back()
    }

    /// Number of days between the earliest and latest cached day.
    pub fn num_days(&self) -> i64 {
        match (self.earliest(), self.latest()) {
            (Some(earliest), Some(latest)) => (latest - earliest).num_days(),
            _ => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn clear(&mut self) {
        self.days.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{AmountSource, RecurrenceRule};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window(from: NaiveDate, to: NaiveDate) -> DateWindow {
        DateWindow::new(from, to).unwrap()
    }

    #[test]
    fn cached_range_is_not_resimulated() {
        let mut transactions = vec![Transaction::income(
            "counter",
            AmountSource::sequence((1..).map(f64::from)),
            RecurrenceRule::daily(),
        )
        .unwrap()];
        let id = transactions[0].id;
        let mut sim = Simulation::new();
        let range = window(date(2011, 1, 1), date(2011, 1, 3));

        sim.run(range, &mut transactions, &mut []).unwrap();
        sim.run(range, &mut transactions, &mut []).unwrap();
        assert_eq!(sim.latest_day().unwrap().effect(id), 6.0);
        assert_eq!(sim.len(), 3);
    }

    #[test]
    fn extension_continues_from_latest_day() {
        let mut transactions = vec![Transaction::income(
            "counter",
            AmountSource::sequence((1..).map(f64::from)),
            RecurrenceRule::daily(),
        )
        .unwrap()];
        let id = transactions[0].id;
        let mut sim = Simulation::new();

        sim.run(window(date(2011, 1, 1), date(2011, 1, 3)), &mut transactions, &mut [])
            .unwrap();
        sim.run(window(date(2011, 1, 2), date(2011, 1, 5)), &mut transactions, &mut [])
            .unwrap();
        assert_eq!(sim.earliest(), Some(date(2011, 1, 1)));
        assert_eq!(sim.day(date(2011, 1, 5)).unwrap().effect(id), 15.0);
        assert_eq!(sim.num_days(), 4);
    }

    #[test]
    fn later_window_fills_the_gap() {
        let mut transactions =
            vec![Transaction::expense("lunch", 1.0, RecurrenceRule::daily()).unwrap()];
        let mut sim = Simulation::new();
        sim.run(window(date(2011, 1, 1), date(2011, 1, 2)), &mut transactions, &mut [])
            .unwrap();
        sim.run(window(date(2011, 1, 10), date(2011, 1, 12)), &mut transactions, &mut [])
            .unwrap();
        assert_eq!(sim.len(), 12);
        assert!(sim.days().zip(sim.days().skip(1)).all(|(a, b)| a.date.succ_opt() == Some(b.date)));
    }

    #[test]
    fn earlier_window_starts_a_fresh_run() {
        let mut transactions =
            vec![Transaction::expense("lunch", 1.0, RecurrenceRule::daily()).unwrap()];
        let id = transactions[0].id;
        let mut sim = Simulation::new();
        sim.run(window(date(2011, 2, 1), date(2011, 2, 10)), &mut transactions, &mut [])
            .unwrap();
        sim.run(window(date(2011, 1, 1), date(2011, 1, 5)), &mut transactions, &mut [])
            .unwrap();
        assert_eq!(sim.earliest(), Some(date(2011, 1, 1)));
        assert_eq!(sim.latest(), Some(date(2011, 1, 5)));
        assert_eq!(sim.latest_day().unwrap().effect(id), -5.0);
    }
}
