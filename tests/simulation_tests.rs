use std::cell::Cell;
use std::rc::Rc;

use chrono::{Duration, NaiveDate};
use miser::{
    ledger::{AmountSource, Bucket, Compounding, Ledger, RecurrenceRule, Schedule, Transaction, Weekday},
    Category, MiserError,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn year_2011() -> (NaiveDate, NaiveDate) {
    (date(2011, 1, 1), date(2011, 12, 31))
}

fn bounded(rule: RecurrenceRule) -> RecurrenceRule {
    let (from, to) = year_2011();
    rule.bounded(Some(from), Some(to)).unwrap()
}

#[test]
fn daily_expense_over_a_year() {
    let (from, to) = year_2011();
    let mut ledger = Ledger::new("test");
    ledger
        .add_transaction(Transaction::expense("lunch", 1.0, bounded(RecurrenceRule::daily())).unwrap())
        .unwrap();
    assert_eq!(ledger.surplus(from, to).unwrap(), -365.0);
}

#[test]
fn weekly_expense_over_a_year() {
    let (from, to) = year_2011();
    let mut ledger = Ledger::new("test");
    ledger
        .add_transaction(
            Transaction::expense(
                "romantic dinner",
                100.0,
                bounded(RecurrenceRule::weekly([Weekday::Fri]).unwrap()),
            )
            .unwrap(),
        )
        .unwrap();
    assert_eq!(ledger.surplus(from, to).unwrap(), 100.0 * -52.0);
}

#[test]
fn monthly_expense_over_a_year() {
    let (from, to) = year_2011();
    let mut ledger = Ledger::new("test");
    ledger
        .add_transaction(
            Transaction::expense("rent", 1000.0, bounded(RecurrenceRule::monthly([1]).unwrap()))
                .unwrap(),
        )
        .unwrap();
    assert_eq!(ledger.surplus(from, to).unwrap(), 12.0 * -1000.0);
}

#[test]
fn overlapping_rules_do_not_step_on_each_other() {
    let (from, to) = year_2011();
    let schedule = Schedule::from(vec![
        bounded(RecurrenceRule::weekly([Weekday::Fri]).unwrap()),
        bounded(RecurrenceRule::daily()),
    ]);
    let mut ledger = Ledger::new("test");
    ledger
        .add_transaction(Transaction::expense("fake lunch", 1.0, schedule).unwrap())
        .unwrap();
    assert_eq!(ledger.surplus(from, to).unwrap(), -365.0);
}

#[test]
fn sequence_amount_is_summed_and_not_reconsumed() {
    let (from, to) = (date(2011, 1, 1), date(2011, 1, 3));
    let mut ledger = Ledger::new("test");
    ledger
        .add_transaction(
            Transaction::income(
                "so much",
                AmountSource::sequence((1u32..).map(f64::from)),
                RecurrenceRule::daily(),
            )
            .unwrap(),
        )
        .unwrap();
    assert_eq!(ledger.surplus(from, to).unwrap(), 6.0);
    assert_eq!(ledger.surplus(from, to).unwrap(), 6.0);
}

#[test]
fn callback_amount_is_called_once_per_firing() {
    let calls = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&calls);
    let (from, to) = (date(2011, 1, 1), date(2011, 1, 3));
    let mut ledger = Ledger::new("test");
    ledger
        .add_transaction(
            Transaction::income(
                "callable",
                AmountSource::callback(move || {
                    counter.set(counter.get() + 1);
                    f64::from(counter.get() % 10 + 1)
                }),
                RecurrenceRule::daily(),
            )
            .unwrap(),
        )
        .unwrap();
    let first = ledger.surplus(from, to).unwrap();
    assert!(first <= 10.0 * 3.0);
    assert_eq!(calls.get(), 3);
    assert_eq!(ledger.surplus(from, to).unwrap(), first);
    assert_eq!(calls.get(), 3);
}

#[test]
fn resimulating_identical_bounds_is_idempotent() {
    let mut ledger = Ledger::new("test");
    ledger
        .add_transactions([
            Transaction::income(
                "bonus",
                AmountSource::sequence(vec![5.0, 7.0, 11.0, 13.0]),
                RecurrenceRule::weekly([Weekday::Mon]).unwrap(),
            )
            .unwrap(),
            Transaction::expense("coffee", 3.0, RecurrenceRule::daily()).unwrap(),
        ])
        .unwrap();
    let (from, to) = (date(2012, 1, 1), date(2012, 1, 28));
    let first = ledger.simulate(from, to).unwrap();
    let second = ledger.simulate(from, to).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.income["bonus"], 36.0);
    assert_eq!(first.expenses["coffee"], -84.0);
}

#[test]
fn exhausted_sequence_surfaces_as_error() {
    let mut ledger = Ledger::new("test");
    ledger
        .add_transaction(
            Transaction::income("short", AmountSource::sequence(vec![1.0]), RecurrenceRule::daily())
                .unwrap(),
        )
        .unwrap();
    let err = ledger
        .surplus(date(2011, 1, 1), date(2011, 1, 2))
        .expect_err("sequence runs dry");
    assert!(matches!(err, MiserError::AmountSourceExhausted(_)));
}

#[test]
fn reversed_window_is_rejected() {
    let mut ledger = Ledger::new("test");
    let err = ledger
        .simulate(date(2011, 2, 1), date(2011, 1, 1))
        .expect_err("reversed");
    assert!(matches!(err, MiserError::InvalidWindow { .. }));
}

struct Household {
    ledger: Ledger,
    sim_begin: NaiveDate,
    sim_end: NaiveDate,
}

fn household() -> Household {
    let mut ledger = Ledger::new("tessst");
    let cc_debt = Bucket::debt("cc", 100.0)
        .with_interest(0.13, Compounding::Monthly)
        .beginning(date(2012, 10, 1));
    let savings = Bucket::savings("stocks", 0.0).with_interest(0.07, Compounding::Yearly);

    let servicing = Transaction::expense("servicing CC debt", 20.0, RecurrenceRule::monthly([1]).unwrap())
        .unwrap()
        .towards(&cc_debt);
    let retirement = Transaction::expense("retirement", 100.0, RecurrenceRule::monthly([15]).unwrap())
        .unwrap()
        .towards(&savings);

    ledger.add_bucket(cc_debt);
    ledger.add_bucket(savings);
    ledger
        .add_transactions([
            Transaction::expense("wing chun", 100.0, RecurrenceRule::monthly([15]).unwrap()).unwrap(),
            Transaction::expense(
                "going out",
                20.0,
                RecurrenceRule::weekly([Weekday::Sat, Weekday::Sun]).unwrap(),
            )
            .unwrap(),
            servicing,
            retirement,
            Transaction::income("salary", 500.0, RecurrenceRule::monthly([1, 15]).unwrap()).unwrap(),
        ])
        .unwrap();

    Household {
        ledger,
        sim_begin: date(2012, 11, 1),
        sim_end: date(2012, 11, 30),
    }
}

#[test]
fn household_totals_cover_every_category() {
    let Household {
        mut ledger,
        sim_begin,
        sim_end,
    } = household();
    let expected_expenses = -(100.0 + 20.0 * 2.0 * 4.0 + 20.0 + 100.0);
    let expected_income = 500.0 * 2.0;

    let totals = ledger.totals(sim_begin, sim_end).unwrap();
    let summed = totals.summed();
    for category in Category::ALL {
        assert!(summed.contains_key(&category));
    }
    assert_eq!(totals.sum(Category::Expenses), expected_expenses);
    assert_eq!(totals.sum(Category::Income), expected_income);
    assert!(totals.sum(Category::Savings) > 100.0);

    // -100 serviced by 20 on Nov 1st, then a month of 13% monthly compounding.
    let debt = totals.sum(Category::Debt);
    assert!(debt < -80.0, "debt {debt} should have grown");
    assert!(debt > -91.0, "debt {debt} grew too much");
}

#[test]
fn household_resimulation_keeps_totals() {
    let Household {
        mut ledger,
        sim_begin,
        sim_end,
    } = household();
    let first = ledger.simulate(sim_begin, sim_end).unwrap();
    let second = ledger.simulate(sim_begin, sim_end).unwrap();
    let third = ledger.totals(sim_begin, sim_end).unwrap();
    assert_eq!(first, second);
    assert_eq!(second, third);
}

#[test]
fn household_sorted_expenses_list_largest_first() {
    let Household {
        mut ledger,
        sim_begin,
        sim_end,
    } = household();
    let totals = ledger.totals(sim_begin, sim_end).unwrap();
    let sorted = totals.sorted(Category::Expenses);
    assert_eq!(sorted[0], ("going out".to_string(), -160.0));
    assert_eq!(sorted.last().unwrap(), &("servicing CC debt".to_string(), -20.0));
}

#[test]
fn household_scalar_summary_splits_expenses() {
    let Household {
        mut ledger,
        sim_begin,
        sim_end,
    } = household();
    let summary = ledger.scalar_summary(sim_begin, sim_end).unwrap();
    assert_eq!(summary.living_expenses, -260.0);
    assert_eq!(summary.towards_savings, -100.0);
    assert_eq!(summary.towards_debt, -20.0);
    assert_eq!(summary.outflow, -280.0);
    assert_eq!(summary.income, 1000.0);
    assert!(summary.interest > 0.0);
    assert_eq!(summary.inflow, summary.income + summary.interest);
    assert_eq!(summary.num_days, 30);
}

#[test]
fn unserviced_debt_only_grows() {
    let mut ledger = Ledger::new("debt");
    ledger.add_bucket(Bucket::debt("loan", 100.0).with_interest(0.2, Compounding::Monthly));
    let start = date(2012, 1, 1);
    let mut previous = 0.0;
    for offset in [0, 30, 90, 180] {
        let totals = ledger.totals(start, start + Duration::days(offset)).unwrap();
        let debt = totals.sum(Category::Debt);
        assert!(debt <= -100.0);
        if offset > 0 {
            assert!(debt < previous);
        }
        previous = debt;
    }
}

#[test]
fn savings_increase_every_day() {
    let mut ledger = Ledger::new("savings");
    ledger.add_bucket(Bucket::savings("stocks", 1000.0).with_interest(0.07, Compounding::Continuous));
    let start = date(2012, 1, 1);
    ledger.simulate(start, start + Duration::days(60)).unwrap();
    let amounts: Vec<f64> = ledger
        .simulation()
        .days()
        .map(|day| day.buckets.values().map(|snap| snap.amount).sum())
        .collect();
    assert_eq!(amounts.len(), 61);
    assert!(amounts.windows(2).all(|pair| pair[1] > pair[0]));
}

#[test]
fn bucket_before_begin_reports_zero() {
    let mut ledger = Ledger::new("later");
    ledger.add_bucket(Bucket::savings("later", 500.0).beginning(date(2013, 1, 1)));
    let totals = ledger.totals(date(2012, 1, 1), date(2012, 12, 31)).unwrap();
    assert_eq!(totals.savings["later"], 0.0);
}

/// Runs dry exactly once, on its second draw.
struct Hiccup {
    calls: u32,
}

impl Iterator for Hiccup {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        self.calls += 1;
        (self.calls != 2).then_some(1.0)
    }
}

#[test]
fn retry_after_failed_day_keeps_bucket_in_step() {
    let mut ledger = Ledger::new("retry");
    let jar = Bucket::savings("jar", 0.0);
    let save = Transaction::expense("save", 10.0, RecurrenceRule::daily())
        .unwrap()
        .towards(&jar);
    ledger.add_bucket(jar);
    ledger
        .add_transactions([
            save,
            Transaction::income(
                "flaky",
                AmountSource::sequence(Hiccup { calls: 0 }),
                RecurrenceRule::daily(),
            )
            .unwrap(),
        ])
        .unwrap();

    let (from, to) = (date(2011, 1, 1), date(2011, 1, 2));
    let err = ledger.totals(from, to).expect_err("second day runs dry");
    assert!(matches!(err, MiserError::AmountSourceExhausted(_)));

    let totals = ledger.totals(from, to).unwrap();
    assert_eq!(totals.expenses["save"], -20.0);
    assert_eq!(totals.savings["jar"], 20.0);
}
