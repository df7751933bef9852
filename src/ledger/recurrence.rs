//! Recurrence rules decide on which dates a transaction fires.
//!
//! A [`RecurrenceRule`] is a pure function of its kind, selector and validity
//! window. A [`Schedule`] OR-combines several rules plus explicit dates and
//! never reports the same date twice.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use super::window::days_in_month;
use crate::errors::{MiserError, MiserResult};

/// First date considered by rules without an explicit `begin`.
pub fn open_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub enum RecurrenceKind {
    Daily,
    Weekly(Vec<Weekday>),
    /// Days of the month; days past a month's length never fire in that month.
    Monthly(Vec<u32>),
    Yearly {
        month: u32,
        day: u32,
    },
    Dates(BTreeSet<NaiveDate>),
}

impl RecurrenceKind {
    pub fn label(&self) -> &'static str {
        match self {
            RecurrenceKind::Daily => "daily",
            RecurrenceKind::Weekly(_) => "weekly",
            RecurrenceKind::Monthly(_) => "monthly",
            RecurrenceKind::Yearly { .. } => "yearly",
            RecurrenceKind::Dates(_) => "dates",
        }
    }

    fn matches(&self, date: NaiveDate) -> bool {
        match self {
            RecurrenceKind::Daily => true,
            RecurrenceKind::Weekly(days) => days.contains(&date.weekday()),
            RecurrenceKind::Monthly(days) => days.contains(&date.day()),
            RecurrenceKind::Yearly { month, day } => date.month() == *month && date.day() == *day,
            RecurrenceKind::Dates(dates) => dates.contains(&date),
        }
    }
}

/// Built only through the validating constructors, so the selector is never
/// empty and `begin <= end` always holds.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RecurrenceRule {
    kind: RecurrenceKind,
    begin: NaiveDate,
    end: Option<NaiveDate>,
}

impl RecurrenceRule {
    fn unbounded(kind: RecurrenceKind) -> Self {
        Self {
            kind,
            begin: open_start(),
            end: None,
        }
    }

    pub fn daily() -> Self {
        Self::unbounded(RecurrenceKind::Daily)
    }

    pub fn weekly<I>(days: I) -> MiserResult<Self>
    where
        I: IntoIterator<Item = Weekday>,
    {
        let mut selected: Vec<Weekday> = Vec::new();
        for day in days {
            if !selected.contains(&day) {
                selected.push(day);
            }
        }
        if selected.is_empty() {
            return Err(MiserError::InvalidSchedule(
                "weekly rule needs at least one weekday".into(),
            ));
        }
        selected.sort_by_key(|day| day.num_days_from_monday());
        Ok(Self::unbounded(RecurrenceKind::Weekly(selected)))
    }

    pub fn monthly<I>(days: I) -> MiserResult<Self>
    where
        I: IntoIterator<Item = u32>,
    {
        let selected: BTreeSet<u32> = days.into_iter().collect();
        if selected.is_empty() {
            return Err(MiserError::InvalidSchedule(
                "monthly rule needs at least one day of the month".into(),
            ));
        }
        if let Some(bad) = selected.iter().find(|day| !(1..=31).contains(*day)) {
            return Err(MiserError::InvalidSchedule(format!(
                "day of month {bad} is outside 1..=31"
            )));
        }
        Ok(Self::unbounded(RecurrenceKind::Monthly(
            selected.into_iter().collect(),
        )))
    }

    /// Fires every year on `month`/`day`. February 29th only fires in leap years.
    pub fn yearly(month: u32, day: u32) -> MiserResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(MiserError::InvalidSchedule(format!(
                "month {month} is outside 1..=12"
            )));
        }
        // 2000 is a leap year, so Feb 29th is accepted here.
        if day == 0 || day > days_in_month(2000, month) {
            return Err(MiserError::InvalidSchedule(format!(
                "day {day} does not exist in month {month}"
            )));
        }
        Ok(Self::unbounded(RecurrenceKind::Yearly { month, day }))
    }

    pub fn on_dates<I>(dates: I) -> MiserResult<Self>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let dates: BTreeSet<NaiveDate> = dates.into_iter().collect();
        if dates.is_empty() {
            return Err(MiserError::InvalidSchedule(
                "explicit date rule needs at least one date".into(),
            ));
        }
        Ok(Self::unbounded(RecurrenceKind::Dates(dates)))
    }

    /// Restricts the rule to `[begin, end]`. A missing `begin` keeps the open start.
    pub fn bounded(mut self, begin: Option<NaiveDate>, end: Option<NaiveDate>) -> MiserResult<Self> {
        let begin = begin.unwrap_or_else(open_start);
        if let Some(end) = end {
            if end < begin {
                return Err(MiserError::InvalidSchedule(format!(
                    "{} rule ends on {end} before it begins on {begin}",
                    self.kind.label()
                )));
            }
        }
        self.begin = begin;
        self.end = end;
        Ok(self)
    }

    pub fn kind(&self) -> &RecurrenceKind {
        &self.kind
    }

    pub fn begin(&self) -> NaiveDate {
        self.begin
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    pub fn in_effect(&self, date: NaiveDate) -> bool {
        date >= self.begin && self.end.map_or(true, |end| date <= end)
    }

    pub fn fires_on(&self, date: NaiveDate) -> bool {
        self.in_effect(date) && self.kind.matches(date)
    }

    /// Firing dates within `[from, to]`, both inclusive, in ascending order.
    pub fn occurrences_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        let start = from.max(self.begin);
        let stop = match self.end {
            Some(end) => to.min(end),
            None => to,
        };
        if stop < start {
            return Vec::new();
        }
        match &self.kind {
            RecurrenceKind::Dates(dates) => dates.range(start..=stop).copied().collect(),
            kind => start
                .iter_days()
                .take_while(|date| *date <= stop)
                .filter(|date| kind.matches(*date))
                .collect(),
        }
    }

    pub fn count_between(&self, from: NaiveDate, to: NaiveDate) -> usize {
        self.occurrences_between(from, to).len()
    }
}

/// A set of rules and one-off dates that fires whenever any member fires.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Schedule {
    pub rules: Vec<RecurrenceRule>,
    pub dates: BTreeSet<NaiveDate>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, rule: RecurrenceRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.dates.insert(date);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.dates.is_empty()
    }

    pub fn fires_on(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date) || self.rules.iter().any(|rule| rule.fires_on(date))
    }

    /// Union of member firings in `[from, to]`, de-duplicated by date.
    pub fn occurrences_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        if to < from {
            return Vec::new();
        }
        let mut union: BTreeSet<NaiveDate> = self.dates.range(from..=to).copied().collect();
        for rule in &self.rules {
            union.extend(rule.occurrences_between(from, to));
        }
        union.into_iter().collect()
    }

    pub fn count_between(&self, from: NaiveDate, to: NaiveDate) -> usize {
        self.occurrences_between(from, to).len()
    }
}

impl From<RecurrenceRule> for Schedule {
    fn from(rule: RecurrenceRule) -> Self {
        Schedule::new().with_rule(rule)
    }
}

impl From<NaiveDate> for Schedule {
    fn from(date: NaiveDate) -> Self {
        Schedule::new().with_date(date)
    }
}

impl From<Vec<RecurrenceRule>> for Schedule {
    fn from(rules: Vec<RecurrenceRule>) -> Self {
        Schedule {
            rules,
            dates: BTreeSet::new(),
        }
    }
}
