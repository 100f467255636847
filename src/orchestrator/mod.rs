//! Dependency-aware orchestration: plan construction, phased execution and
//! the shared wiring both the CLI and the remote trigger go through.

pub mod plan;
pub mod runner;

use crate::artifact::{ArtifactError, ArtifactStore};
use crate::config::types::Config;
use crate::generator::{descriptors, GeneratorContext};
use crate::output::OutputLayout;
use crate::run::GenerationRun;
use crate::scenario::ScenarioRegistry;
use crate::volume::VolumeModel;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::info;

pub use plan::{build_plan, ExecutionPlan, PlanError};
pub use runner::{run_plan, Outcome, RunReport, RunState, SkipReason};

/// Configuration errors surfaced before any generator executes.
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("artifact store setup failed: {0}")]
    Store(#[from] ArtifactError),

    #[error("invalid run parameters: {0}")]
    InvalidRun(String),
}

/// Expands the `--sources` selection. `all` means every registered
/// descriptor.
pub fn resolve_sources(selector: &str) -> Vec<String> {
    if selector.trim().eq_ignore_ascii_case("all") {
        descriptors().iter().map(|d| d.id.to_string()).collect()
    } else {
        split_csv(selector)
    }
}

/// Expands the `--scenarios` selection. `all` is the whole catalog, `none`
/// is an empty set.
pub fn resolve_scenarios(selector: &str) -> Vec<String> {
    let trimmed = selector.trim();
    if trimmed.eq_ignore_ascii_case("none") {
        Vec::new()
    } else if trimmed.eq_ignore_ascii_case("all") {
        ScenarioRegistry::builtin()
            .ids()
            .iter()
            .map(|s| s.to_string())
            .collect()
    } else {
        split_csv(selector)
    }
}

fn split_csv(selector: &str) -> Vec<String> {
    selector.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Validates the run, builds the plan and the shared context, and executes
/// to completion. All configuration errors abort here, before any generator
/// has run; `RunReport` carries everything that happened after that point.
pub async fn execute_run(
    config: Arc<Config>,
    run: GenerationRun,
    shutdown: watch::Receiver<bool>,
) -> Result<RunReport, ExecuteError> {
    if run.days == 0 {
        return Err(ExecuteError::InvalidRun("--days must be at least 1".to_string()));
    }
    if !run.scale.is_finite() || run.scale <= 0.0 {
        return Err(ExecuteError::InvalidRun(format!(
            "--scale must be a positive number, got {}",
            run.scale
        )));
    }
    if run.sources.is_empty() {
        return Err(ExecuteError::InvalidRun("no sources requested".to_string()));
    }

    let selected_scenarios = ScenarioRegistry::builtin()
        .select(&run.scenarios, run.start_date)
        .map_err(PlanError::from)?;

    let all_descriptors = descriptors();
    let plan = build_plan(&run.sources, &all_descriptors, &selected_scenarios)?;

    info!(
        sources = plan.generator_count(),
        scenarios = selected_scenarios.len(),
        days = run.days,
        start_date = %run.start_date,
        "Plan built"
    );

    let layout = OutputLayout::new(&config.output, run.output_mode);
    let store = ArtifactStore::create(&layout.artifact_dir())?;
    let volume = VolumeModel::from_config(&config.volumes);

    let ctx = Arc::new(GeneratorContext {
        run,
        config: config.clone(),
        volume: Arc::new(volume),
        store: Arc::new(store),
        scenarios: Arc::new(selected_scenarios),
        layout,
    });

    Ok(run_plan(plan, ctx, shutdown).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_sources_all() {
        let sources = resolve_sources("all");
        assert!(sources.contains(&"firewall".to_string()));
        assert!(sources.contains(&"web".to_string()));
        assert_eq!(sources.len(), descriptors().len());
    }

    #[test]
    fn test_resolve_sources_csv() {
        assert_eq!(
            resolve_sources("firewall, auth,,cloud"),
            vec!["firewall", "auth", "cloud"]
        );
    }

    #[test]
    fn test_resolve_scenarios_none_and_all() {
        assert!(resolve_scenarios("none").is_empty());
        assert_eq!(
            resolve_scenarios("all"),
            vec!["exfiltration", "brute-force", "patch-window"]
        );
    }
}
