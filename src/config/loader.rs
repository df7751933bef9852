use std::{
    collections::HashMap,
    fs,
    path::Path,
};

use tracing::debug;
use uuid::Uuid;

use super::model::{BucketConfig, ScenarioConfig, TransactionConfig};
use crate::{
    errors::{MiserError, MiserResult},
    ledger::{Bucket, Ledger, Schedule, Transaction},
};

/// Reads scenario files and turns them into ledgers.
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn from_path(path: &Path) -> MiserResult<ScenarioConfig> {
        let data = fs::read_to_string(path)?;
        debug!(path = %path.display(), "loaded scenario file");
        Self::parse(&data)
    }

    pub fn parse(data: &str) -> MiserResult<ScenarioConfig> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn load_ledger(path: &Path) -> MiserResult<Ledger> {
        Self::from_path(path)?.build()
    }
}

impl ScenarioConfig {
    /// Validates the scenario and builds a ledger from it.
    pub fn build(&self) -> MiserResult<Ledger> {
        let mut ledger = Ledger::new(self.name.clone()).with_initial_balance(self.initial_balance);
        let mut bucket_ids: HashMap<&str, Uuid> = HashMap::new();

        for cfg in &self.buckets {
            if bucket_ids.contains_key(cfg.name.as_str()) {
                return Err(MiserError::Config(format!(
                    "bucket `{}` is defined more than once",
                    cfg.name
                )));
            }
            let id = ledger.add_bucket(build_bucket(cfg)?);
            bucket_ids.insert(cfg.name.as_str(), id);
        }

        for cfg in &self.transactions {
            let transaction = build_transaction(cfg, &bucket_ids)?;
            ledger.add_transaction(transaction)?;
        }

        for goal in &self.goals {
            ledger.add_goal(goal.clone());
        }
        debug!(
            ledger = %ledger.name,
            buckets = ledger.buckets().len(),
            transactions = ledger.transaction_count(),
            "built ledger from scenario"
        );
        Ok(ledger)
    }
}

fn build_bucket(cfg: &BucketConfig) -> MiserResult<Bucket> {
    let mut bucket = Bucket::new(cfg.name.clone(), cfg.kind, cfg.amount);
    match &cfg.compounded {
        Some(period) => bucket = bucket.with_interest_named(cfg.rate, period)?,
        None if cfg.rate != 0.0 => {
            return Err(MiserError::Config(format!(
                "bucket `{}` has a rate but no `compounded` period",
                cfg.name
            )))
        }
        None => {}
    }
    if let Some(begin) = cfg.begin {
        bucket = bucket.beginning(begin);
    }
    Ok(bucket)
}

fn build_transaction(
    cfg: &TransactionConfig,
    bucket_ids: &HashMap<&str, Uuid>,
) -> MiserResult<Transaction> {
    let mut schedule = Schedule::new();
    for entry in &cfg.on {
        schedule = schedule.with_rule(entry.to_rule().map_err(|err| {
            MiserError::InvalidSchedule(format!("transaction `{}`: {err}", cfg.name))
        })?);
    }
    let mut transaction =
        Transaction::new(cfg.name.clone(), cfg.kind, cfg.amount.to_source(), schedule)?
            .with_tags(cfg.tags.iter().cloned());
    if let Some(target) = &cfg.towards {
        let id = bucket_ids
            .get(target.as_str())
            .ok_or_else(|| MiserError::UnknownBucket(target.clone()))?;
        transaction.towards = Some(*id);
    }
    Ok(transaction)
}
