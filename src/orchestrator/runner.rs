//! Phased, bounded-concurrency plan execution.
//!
//! Each generator invocation is an opaque blocking unit of work, run on the
//! blocking pool under a semaphore bound. A phase's members run concurrently;
//! the next phase starts only when the previous one has fully settled, so a
//! dependent generator can never observe a half-published artifact. One
//! generator's failure never aborts the run; its dependents are skipped and
//! everything independent keeps going.

use super::plan::ExecutionPlan;
use crate::generator::{GeneratorContext, WrittenFile};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Planning,
    Phase1Running,
    Phase2Running,
    Done,
    Failed,
}

#[derive(Debug, Clone)]
pub enum SkipReason {
    FailedDependency(String),
    Interrupted,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Ok {
        files: Vec<WrittenFile>,
        events: usize,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    },
    Failed {
        error: String,
    },
    Skipped {
        reason: SkipReason,
    },
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok { .. })
    }

    pub fn describe(&self) -> String {
        match self {
            Outcome::Ok { events, .. } => format!("ok ({events} events)"),
            Outcome::Failed { error } => format!("failed: {error}"),
            Outcome::Skipped {
                reason: SkipReason::FailedDependency(dep),
            } => format!("skipped (dependency '{dep}' failed)"),
            Outcome::Skipped {
                reason: SkipReason::Interrupted,
            } => "skipped (run interrupted)".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub outcomes: BTreeMap<String, Outcome>,
    pub state: RunState,
}

impl RunReport {
    pub fn failed_count(&self) -> usize {
        self.outcomes
            .values()
            .filter(|o| matches!(o, Outcome::Failed { .. }))
            .count()
    }

    pub fn all_ok(&self) -> bool {
        self.outcomes.values().all(Outcome::is_ok)
    }

    pub fn total_events(&self) -> usize {
        self.outcomes
            .values()
            .map(|o| match o {
                Outcome::Ok { events, .. } => *events,
                _ => 0,
            })
            .sum()
    }
}

/// Executes a built plan to completion. Never returns an error: every
/// per-generator problem lands in the report instead.
pub async fn run_plan(
    plan: ExecutionPlan,
    ctx: Arc<GeneratorContext>,
    shutdown: watch::Receiver<bool>,
) -> RunReport {
    let workers = ctx.run.workers.max(1);
    let semaphore = Arc::new(Semaphore::new(workers));
    let mut outcomes: BTreeMap<String, Outcome> = BTreeMap::new();

    for (phase_idx, phase) in plan.phases.into_iter().enumerate() {
        let state = if phase_idx == 0 {
            RunState::Phase1Running
        } else {
            RunState::Phase2Running
        };
        info!(
            phase = phase_idx + 1,
            state = ?state,
            generators = phase.len(),
            workers,
            "Phase starting"
        );

        let mut handles = Vec::with_capacity(phase.len());
        for descriptor in phase {
            if *shutdown.borrow() {
                warn!(source_id = descriptor.id, "Interrupted, not dispatching");
                outcomes.insert(
                    descriptor.id.to_string(),
                    Outcome::Skipped {
                        reason: SkipReason::Interrupted,
                    },
                );
                continue;
            }

            // A dependency that failed (or was itself skipped) means this
            // generator must not run against a stale or absent artifact.
            let failed_dep = descriptor
                .depends_on
                .iter()
                .find(|dep| !outcomes.get(**dep).map(Outcome::is_ok).unwrap_or(false));
            if let Some(dep) = failed_dep {
                warn!(
                    source_id = descriptor.id,
                    dependency = dep,
                    "Skipping, dependency did not complete"
                );
                outcomes.insert(
                    descriptor.id.to_string(),
                    Outcome::Skipped {
                        reason: SkipReason::FailedDependency(dep.to_string()),
                    },
                );
                continue;
            }

            let semaphore = semaphore.clone();
            let ctx = ctx.clone();
            let id = descriptor.id;
            let entry = descriptor.entry;
            let handle = tokio::spawn(async move {
                let permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return (id, Outcome::Failed {
                            error: "worker pool closed".to_string(),
                        })
                    }
                };
                let started_at = Utc::now();
                info!(source_id = id, "Generator starting");
                let result = tokio::task::spawn_blocking(move || entry(&ctx)).await;
                drop(permit);
                let finished_at = Utc::now();

                let outcome = match result {
                    Ok(Ok(report)) => {
                        info!(
                            source_id = id,
                            events = report.total_events(),
                            "Generator completed"
                        );
                        Outcome::Ok {
                            events: report.total_events(),
                            files: report.files,
                            started_at,
                            finished_at,
                        }
                    }
                    Ok(Err(e)) => {
                        error!(source_id = id, error = %e, "Generator failed");
                        Outcome::Failed {
                            error: e.to_string(),
                        }
                    }
                    Err(e) => {
                        error!(source_id = id, error = %e, "Generator panicked");
                        Outcome::Failed {
                            error: format!("panicked: {e}"),
                        }
                    }
                };
                (id, outcome)
            });
            handles.push(handle);
        }

        // The phase barrier: nothing in a later phase starts until every
        // member here has settled.
        for handle in handles {
            match handle.await {
                Ok((id, outcome)) => {
                    outcomes.insert(id.to_string(), outcome);
                }
                Err(e) => {
                    error!(error = %e, "Generator task join error");
                }
            }
        }
    }

    // The run itself always completes; per-generator failures live in the
    // table and drive the exit status. `Failed` is reserved for plan-build
    // errors, which never reach this function.
    RunReport {
        outcomes,
        state: RunState::Done,
    }
}
