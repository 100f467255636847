//! Execution-plan construction.
//!
//! Planning is where every configuration error surfaces: unknown source or
//! scenario ids, dependencies missing from the requested set, dependency
//! cycles, and scenario participation tables naming generators that do not
//! exist. Nothing executes until the plan builds cleanly.

use crate::generator::GeneratorDescriptor;
use crate::scenario::{ScenarioError, SelectedScenario};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("unknown source id '{0}'")]
    UnknownSource(String),

    #[error("source id '{0}' requested more than once")]
    DuplicateSource(String),

    #[error("source '{source_id}' depends on '{dependency}', which is not in the requested set")]
    MissingDependency { source_id: String, dependency: String },

    #[error("dependency cycle involving: {0}")]
    Cycle(String),

    #[error("scenario '{scenario}' names unknown generator '{generator}' in its participation table")]
    UnknownScenarioGenerator { scenario: String, generator: String },

    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}

/// Phased execution order. Phase 0 holds every requested generator with no
/// unmet dependency; each later phase holds generators whose dependencies
/// all sit in earlier phases. Today's descriptor set has dependency depth
/// one, so plans come out as exactly two phases (or one, when nothing
/// dependent was requested).
#[derive(Debug)]
pub struct ExecutionPlan {
    pub phases: Vec<Vec<GeneratorDescriptor>>,
}

impl ExecutionPlan {
    pub fn generator_count(&self) -> usize {
        self.phases.iter().map(|p| p.len()).sum()
    }

    pub fn phase_ids(&self) -> Vec<Vec<&'static str>> {
        self.phases
            .iter()
            .map(|phase| phase.iter().map(|d| d.id).collect())
            .collect()
    }
}

pub fn build_plan(
    requested: &[String],
    descriptors: &[GeneratorDescriptor],
    scenarios: &[SelectedScenario],
) -> Result<ExecutionPlan, PlanError> {
    let by_id: HashMap<&str, &GeneratorDescriptor> =
        descriptors.iter().map(|d| (d.id, d)).collect();

    // Scenario participation tables are checked against the full descriptor
    // set: a hook wired to a nonexistent generator is a catalog bug, caught
    // here regardless of which sources were requested.
    for selected in scenarios {
        for window in selected.scenario.windows() {
            if !by_id.contains_key(window.generator_id) {
                return Err(PlanError::UnknownScenarioGenerator {
                    scenario: selected.scenario.id().to_string(),
                    generator: window.generator_id.to_string(),
                });
            }
        }
    }

    let mut seen = HashSet::new();
    let mut selected: Vec<&GeneratorDescriptor> = Vec::with_capacity(requested.len());
    for id in requested {
        if !seen.insert(id.as_str()) {
            return Err(PlanError::DuplicateSource(id.clone()));
        }
        let descriptor = by_id
            .get(id.as_str())
            .ok_or_else(|| PlanError::UnknownSource(id.clone()))?;
        selected.push(descriptor);
    }

    for descriptor in &selected {
        for dep in descriptor.depends_on {
            if !seen.contains(dep) {
                return Err(PlanError::MissingDependency {
                    source_id: descriptor.id.to_string(),
                    dependency: dep.to_string(),
                });
            }
        }
    }

    // Kahn's algorithm over the requested subgraph, peeling one phase per
    // round; leftovers after the queue drains are a cycle.
    let mut remaining: HashMap<&str, &GeneratorDescriptor> =
        selected.iter().map(|d| (d.id, *d)).collect();
    let mut done: HashSet<&str> = HashSet::new();
    let mut phases: Vec<Vec<GeneratorDescriptor>> = Vec::new();

    while !remaining.is_empty() {
        let mut ready: Vec<&GeneratorDescriptor> = remaining
            .values()
            .filter(|d| d.depends_on.iter().all(|dep| done.contains(dep)))
            .copied()
            .collect();

        if ready.is_empty() {
            let mut stuck: Vec<&str> = remaining.keys().copied().collect();
            stuck.sort_unstable();
            return Err(PlanError::Cycle(stuck.join(", ")));
        }

        // Deterministic phase ordering for stable reports.
        ready.sort_by_key(|d| d.id);
        for descriptor in &ready {
            remaining.remove(descriptor.id);
            done.insert(descriptor.id);
        }
        phases.push(ready.into_iter().cloned().collect());
    }

    Ok(ExecutionPlan { phases })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{descriptors, GeneratorContext, GeneratorError, GeneratorReport};
    use crate::scenario::ScenarioRegistry;
    use chrono::NaiveDate;

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn no_scenarios() -> Vec<SelectedScenario> {
        Vec::new()
    }

    #[test]
    fn test_independent_sources_form_one_phase() {
        let plan = build_plan(&ids(&["firewall", "auth", "cloud"]), &descriptors(), &no_scenarios())
            .unwrap();
        assert_eq!(plan.phase_ids(), vec![vec!["auth", "cloud", "firewall"]]);
    }

    #[test]
    fn test_dependents_form_second_phase() {
        let plan = build_plan(
            &ids(&["web", "orders", "email", "calendar"]),
            &descriptors(),
            &no_scenarios(),
        )
        .unwrap();
        assert_eq!(
            plan.phase_ids(),
            vec![vec!["calendar", "orders"], vec!["email", "web"]]
        );
    }

    #[test]
    fn test_unknown_source_rejected() {
        let result = build_plan(&ids(&["badge-reader"]), &descriptors(), &no_scenarios());
        assert!(matches!(result, Err(PlanError::UnknownSource(_))));
    }

    #[test]
    fn test_duplicate_source_rejected() {
        let result = build_plan(&ids(&["auth", "auth"]), &descriptors(), &no_scenarios());
        assert!(matches!(result, Err(PlanError::DuplicateSource(_))));
    }

    #[test]
    fn test_missing_dependency_rejected() {
        let result = build_plan(&ids(&["web"]), &descriptors(), &no_scenarios());
        match result {
            Err(PlanError::MissingDependency { source_id: source, dependency }) => {
                assert_eq!(source, "web");
                assert_eq!(dependency, "orders");
            }
            other => panic!("expected MissingDependency, got {other:?}"),
        }
    }

    #[test]
    fn test_cycle_rejected() {
        fn noop(_: &GeneratorContext) -> Result<GeneratorReport, GeneratorError> {
            Ok(GeneratorReport::default())
        }
        let cyclic = vec![
            GeneratorDescriptor {
                id: "a",
                label: "a",
                category: "test",
                depends_on: &["b"],
                output_files: &[],
                entry: noop,
            },
            GeneratorDescriptor {
                id: "b",
                label: "b",
                category: "test",
                depends_on: &["a"],
                output_files: &[],
                entry: noop,
            },
        ];
        let result = build_plan(&ids(&["a", "b"]), &cyclic, &no_scenarios());
        match result {
            Err(PlanError::Cycle(msg)) => assert_eq!(msg, "a, b"),
            other => panic!("expected Cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_builtin_scenario_windows_all_resolve() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let registry = ScenarioRegistry::builtin();
        let all: Vec<String> = registry.ids().iter().map(|s| s.to_string()).collect();
        let selected = registry.select(&all, start).unwrap();
        let plan = build_plan(&ids(&["firewall"]), &descriptors(), &selected);
        assert!(plan.is_ok());
    }
}
