use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{MiserError, MiserResult},
    ledger::{AmountSource, BucketRole, Goal, Polarity, RecurrenceRule},
    utils::{self, DEFAULT_LOG_FILTER},
};

/// A whole ledger described as data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub name: String,
    #[serde(default)]
    pub initial_balance: f64,
    #[serde(default)]
    pub settings: EngineSettings,
    #[serde(default)]
    pub buckets: Vec<BucketConfig>,
    #[serde(default)]
    pub transactions: Vec<TransactionConfig>,
    #[serde(default)]
    pub goals: Vec<Goal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    #[serde(default = "EngineSettings::default_log_filter")]
    pub log_filter: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            log_filter: Self::default_log_filter(),
        }
    }
}

impl EngineSettings {
    pub fn default_log_filter() -> String {
        DEFAULT_LOG_FILTER.into()
    }

    /// Installs the global tracing subscriber using `log_filter`.
    pub fn init_tracing(&self) {
        utils::init_tracing(&self.log_filter);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketConfig {
    pub name: String,
    pub kind: BucketRole,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compounded: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionConfig {
    pub name: String,
    pub kind: Polarity,
    pub amount: AmountConfig,
    pub on: Vec<ScheduleConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub towards: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A single number, or a list consumed one value per firing date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AmountConfig {
    Fixed(f64),
    Sequence(Vec<f64>),
}

impl AmountConfig {
    pub fn to_source(&self) -> AmountSource {
        match self {
            AmountConfig::Fixed(value) => AmountSource::Fixed(*value),
            AmountConfig::Sequence(values) => AmountSource::sequence(values.clone()),
        }
    }
}

/// The `days` selector of a schedule entry: weekday names for `weekly`,
/// days of the month for `monthly`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DaySelector {
    Weekdays(Vec<Weekday>),
    MonthDays(Vec<u32>),
}

impl Default for DaySelector {
    fn default() -> Self {
        DaySelector::MonthDays(Vec::new())
    }
}

impl DaySelector {
    pub fn is_empty(&self) -> bool {
        match self {
            DaySelector::Weekdays(days) => days.is_empty(),
            DaySelector::MonthDays(days) => days.is_empty(),
        }
    }

    fn weekdays(&self) -> MiserResult<Vec<Weekday>> {
        match self {
            DaySelector::Weekdays(days) => Ok(days.clone()),
            DaySelector::MonthDays(days) if days.is_empty() => Ok(Vec::new()),
            DaySelector::MonthDays(_) => Err(MiserError::InvalidSchedule(
                "weekly schedule expects weekday names in `days`".into(),
            )),
        }
    }

    fn month_days(&self) -> MiserResult<Vec<u32>> {
        match self {
            DaySelector::MonthDays(days) => Ok(days.clone()),
            DaySelector::Weekdays(days) if days.is_empty() => Ok(Vec::new()),
            DaySelector::Weekdays(_) => Err(MiserError::InvalidSchedule(
                "monthly schedule expects day numbers in `days`".into(),
            )),
        }
    }
}

/// One schedule entry. `every` selects the kind: `daily`, `weekly`,
/// `monthly`, `yearly` or `dates`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScheduleConfig {
    pub every: String,
    #[serde(default, skip_serializing_if = "DaySelector::is_empty")]
    pub days: DaySelector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dates: Vec<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

impl ScheduleConfig {
    pub fn to_rule(&self) -> MiserResult<RecurrenceRule> {
        let rule = match self.every.trim().to_ascii_lowercase().as_str() {
            "daily" => RecurrenceRule::daily(),
            "weekly" => RecurrenceRule::weekly(self.days.weekdays()?)?,
            "monthly" => RecurrenceRule::monthly(self.days.month_days()?)?,
            "yearly" => match (self.month, self.day) {
                (Some(month), Some(day)) => RecurrenceRule::yearly(month, day)?,
                _ => {
                    return Err(MiserError::InvalidSchedule(
                        "yearly schedule needs both `month` and `day`".into(),
                    ))
                }
            },
            "dates" => RecurrenceRule::on_dates(self.dates.iter().copied())?,
            other => {
                return Err(MiserError::InvalidSchedule(format!(
                    "unrecognized schedule kind `{other}`"
                )))
            }
        };
        rule.bounded(self.begin, self.end)
    }
}
