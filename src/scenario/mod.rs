//! Scenario registry and injection protocol.
//!
//! A scenario is a named multi-day incident narrative that deposits matching,
//! time-aligned events into several unrelated generators. Participation is a
//! static table (`windows`): a generator asks `is_active` for its (id, day)
//! and, if active, pulls `events_for(day, hour)` and merges the result into
//! its baseline output, stamped with the scenario's correlation id.
//!
//! Scenarios are independent of each other: a generator invokes the protocol
//! once per selected scenario and concatenates results. Interactions between
//! scenarios are not modeled.

mod brute_force;
mod exfiltration;
mod patch_window;

use crate::config::types::CompanyConfig;
use crate::seed;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::sync::Arc;
use thiserror::Error;

pub use brute_force::BruteForce;
pub use exfiltration::Exfiltration;
pub use patch_window::PatchWindow;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("unknown scenario id '{0}'")]
    Unknown(String),

    #[error("scenario id '{0}' requested more than once")]
    Duplicate(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioCategory {
    Attack,
    Ops,
    Network,
}

/// One generator's participation window within a scenario, in run-relative
/// day indices (inclusive). Always a subset of the scenario's `day_range`.
#[derive(Debug, Clone)]
pub struct ScenarioWindow {
    pub generator_id: &'static str,
    pub days: RangeInclusive<u32>,
}

/// A single injected domain event, before correlation-id stamping. The
/// generator owns formatting; scenarios only describe who, where and what.
#[derive(Debug, Clone)]
pub struct ScenarioEvent {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub user: Option<String>,
    pub source_ip: Option<String>,
    pub extra: BTreeMap<String, Value>,
}

impl ScenarioEvent {
    pub fn new(timestamp: DateTime<Utc>, action: &str) -> Self {
        Self {
            timestamp,
            action: action.to_string(),
            user: None,
            source_ip: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn user(mut self, user: &str) -> Self {
        self.user = Some(user.to_string());
        self
    }

    pub fn source_ip(mut self, ip: &str) -> Self {
        self.source_ip = Some(ip.to_string());
        self
    }

    pub fn extra(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

/// Read-only context handed to `events_for`: the run's calendar and the
/// company profile, plus timestamp helpers. Scenarios derive all randomness
/// from the seed service through their own discriminators.
pub struct ScenarioContext<'a> {
    pub start_date: NaiveDate,
    pub company: &'a CompanyConfig,
}

impl ScenarioContext<'_> {
    pub fn date_for(&self, day: u32) -> NaiveDate {
        self.start_date + chrono::Duration::days(day as i64)
    }

    /// UTC timestamp within the run window.
    pub fn at(&self, day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        self.date_for(day)
            .and_hms_opt(hour % 24, minute % 60, second % 60)
            .expect("in-range time components")
            .and_utc()
    }
}

pub trait Scenario: Send + Sync {
    fn id(&self) -> &'static str;

    fn category(&self) -> ScenarioCategory;

    /// Inclusive day range in which the scenario is globally active.
    fn day_range(&self) -> RangeInclusive<u32>;

    /// Static participation table; validated against the descriptor set at
    /// plan-build time, so a window naming an unknown generator is a
    /// configuration error rather than a silent no-op.
    fn windows(&self) -> &[ScenarioWindow];

    /// Events to inject for an active (generator, day, hour). An empty
    /// result for an active hour is valid; not every scenario injects
    /// traffic every hour.
    fn events_for(
        &self,
        generator_id: &str,
        day: u32,
        hour: u32,
        ctx: &ScenarioContext,
    ) -> Vec<ScenarioEvent>;

    fn is_active(&self, generator_id: &str, day: u32) -> bool {
        self.windows()
            .iter()
            .any(|w| w.generator_id == generator_id && w.days.contains(&day))
    }
}

/// A scenario selected for a run, paired with the correlation id every one of
/// its injected events will carry. The id is derived from (start date,
/// scenario id), so reruns reproduce it exactly.
#[derive(Clone)]
pub struct SelectedScenario {
    pub scenario: Arc<dyn Scenario>,
    pub correlation_id: String,
}

pub struct ScenarioRegistry {
    scenarios: Vec<Arc<dyn Scenario>>,
}

impl ScenarioRegistry {
    /// The static catalog of shipped incidents.
    pub fn builtin() -> Self {
        Self {
            scenarios: vec![
                Arc::new(Exfiltration::new()),
                Arc::new(BruteForce::new()),
                Arc::new(PatchWindow::new()),
            ],
        }
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.scenarios.iter().map(|s| s.id()).collect()
    }

    /// Resolves requested scenario ids. Unknown or duplicate ids fail here,
    /// before any generator runs.
    pub fn select(
        &self,
        ids: &[String],
        start_date: NaiveDate,
    ) -> Result<Vec<SelectedScenario>, ScenarioError> {
        let mut selected: Vec<SelectedScenario> = Vec::with_capacity(ids.len());
        for id in ids {
            if selected.iter().any(|s| s.scenario.id() == id) {
                return Err(ScenarioError::Duplicate(id.clone()));
            }
            let scenario = self
                .scenarios
                .iter()
                .find(|s| s.id() == id)
                .cloned()
                .ok_or_else(|| ScenarioError::Unknown(id.clone()))?;
            let correlation_id = correlation_id(start_date, scenario.as_ref());
            selected.push(SelectedScenario {
                scenario,
                correlation_id,
            });
        }
        Ok(selected)
    }
}

fn correlation_id(start_date: NaiveDate, scenario: &dyn Scenario) -> String {
    let token = seed::seed_for(start_date, &format!("scenario:{}", scenario.id()));
    format!("{}-{:016x}", scenario.id(), token)
}
