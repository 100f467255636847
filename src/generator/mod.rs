//! Generator descriptors and the per-run execution context.
//!
//! A generator is a per-data-source unit that formats domain events into that
//! source's wire syntax. The engine treats each one as an opaque blocking
//! unit of work behind a fixed entry-point contract; descriptors carry the
//! metadata the orchestrator plans with (identity, dependencies, output
//! files).

mod auth;
mod calendar;
mod cloud;
mod email;
mod firewall;
mod orders;
mod web_store;

use crate::artifact::{ArtifactError, ArtifactStore};
use crate::config::types::Config;
use crate::output::{OutputError, OutputLayout};
use crate::run::GenerationRun;
use crate::scenario::{ScenarioContext, ScenarioEvent, SelectedScenario};
use crate::seed;
use crate::volume::VolumeModel;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("output error: {0}")]
    Output(#[from] OutputError),

    #[error("{0}")]
    Other(String),
}

/// Static identity of a data source. Defined at process start, never
/// mutated; the orchestrator plans purely from this metadata.
#[derive(Clone)]
pub struct GeneratorDescriptor {
    pub id: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    /// Generators whose shared artifacts this one reads. All of them must
    /// complete (and publish) before this generator starts.
    pub depends_on: &'static [&'static str],
    pub output_files: &'static [&'static str],
    pub entry: fn(&GeneratorContext) -> Result<GeneratorReport, GeneratorError>,
}

impl std::fmt::Debug for GeneratorDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorDescriptor")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("depends_on", &self.depends_on)
            .finish()
    }
}

/// The full descriptor set. Order here is presentation order only; execution
/// order comes from the plan.
pub fn descriptors() -> Vec<GeneratorDescriptor> {
    vec![
        GeneratorDescriptor {
            id: "orders",
            label: "Purchase-order ledger",
            category: "business",
            depends_on: &[],
            output_files: &["orders.csv"],
            entry: orders::run,
        },
        GeneratorDescriptor {
            id: "calendar",
            label: "Meeting schedule",
            category: "business",
            depends_on: &[],
            output_files: &["meetings.jsonl"],
            entry: calendar::run,
        },
        GeneratorDescriptor {
            id: "firewall",
            label: "Perimeter firewall syslog",
            category: "network",
            depends_on: &[],
            output_files: &["firewall.log"],
            entry: firewall::run,
        },
        GeneratorDescriptor {
            id: "auth",
            label: "Identity-provider log",
            category: "auth",
            depends_on: &[],
            output_files: &["idp.jsonl"],
            entry: auth::run,
        },
        GeneratorDescriptor {
            id: "cloud",
            label: "Cloud audit trail",
            category: "cloud",
            depends_on: &[],
            output_files: &["audit.jsonl"],
            entry: cloud::run,
        },
        GeneratorDescriptor {
            id: "web",
            label: "Web store access log",
            category: "web",
            depends_on: &["orders"],
            output_files: &["access.log"],
            entry: web_store::run,
        },
        GeneratorDescriptor {
            id: "email",
            label: "Mail gateway log",
            category: "email",
            depends_on: &["calendar"],
            output_files: &["gateway.csv"],
            entry: email::run,
        },
    ]
}

pub fn descriptor_ids() -> Vec<&'static str> {
    descriptors().iter().map(|d| d.id).collect()
}

/// A scenario event paired with the correlation id it must be emitted under.
#[derive(Debug, Clone)]
pub struct TaggedEvent {
    pub event: ScenarioEvent,
    pub correlation_id: String,
}

/// Everything a generator invocation may touch, built once per run and
/// shared read-only across the worker pool. Generators hold no other
/// process-wide state.
pub struct GeneratorContext {
    pub run: GenerationRun,
    pub config: Arc<Config>,
    pub volume: Arc<VolumeModel>,
    pub store: Arc<ArtifactStore>,
    pub scenarios: Arc<Vec<SelectedScenario>>,
    pub layout: OutputLayout,
}

impl GeneratorContext {
    /// Baseline event count for one hour, with the run's scale applied.
    pub fn baseline_count(&self, category: &str, date: NaiveDate, hour: u32) -> u64 {
        let base = self.volume.base_count(category, self.run.scale);
        self.volume.events_for_hour(base, date, hour, category)
    }

    /// Seeded PRNG for a generator-local stream.
    pub fn rng(&self, date: NaiveDate, category: &str, discriminator: &str) -> StdRng {
        seed::sub_rng(date, category, discriminator)
    }

    /// All (day, date, hour) slots in the run window, in order.
    pub fn hours(&self) -> Vec<(u32, NaiveDate, u32)> {
        self.run
            .days_iter()
            .flat_map(|(day, date)| (0..24).map(move |hour| (day, date, hour)))
            .collect()
    }

    /// Injected events for one (generator, day, hour), merged across every
    /// selected scenario active for that generator/day and stamped with each
    /// scenario's correlation id. Scenario order follows the run's requested
    /// order; scenarios never see each other.
    pub fn scenario_events(&self, generator_id: &str, day: u32, hour: u32) -> Vec<TaggedEvent> {
        let ctx = ScenarioContext {
            start_date: self.run.start_date,
            company: &self.config.company,
        };
        let mut tagged = Vec::new();
        for selected in self.scenarios.iter() {
            if !selected.scenario.is_active(generator_id, day) {
                continue;
            }
            for event in selected.scenario.events_for(generator_id, day, hour, &ctx) {
                tagged.push(TaggedEvent {
                    event,
                    correlation_id: selected.correlation_id.clone(),
                });
            }
        }
        tagged
    }
}

/// One written output file, for `--show-files` and the outcome table.
#[derive(Debug, Clone)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub events: usize,
}

#[derive(Debug, Clone, Default)]
pub struct GeneratorReport {
    pub files: Vec<WrittenFile>,
}

impl GeneratorReport {
    pub fn single(path: PathBuf, events: usize) -> Self {
        Self {
            files: vec![WrittenFile { path, events }],
        }
    }

    pub fn total_events(&self) -> usize {
        self.files.iter().map(|f| f.events).sum()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::run::OutputMode;
    use crate::scenario::ScenarioRegistry;
    use std::path::Path;

    /// Context over a temp directory with the built-in config, a tiny scale
    /// and the given scenarios selected.
    pub fn context(root: &Path, days: u32, scale: f64, scenario_ids: &[&str]) -> GeneratorContext {
        let config = Arc::new(Config::default());
        let start_date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let scenarios = ScenarioRegistry::builtin()
            .select(
                &scenario_ids.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
                start_date,
            )
            .unwrap();
        let layout = OutputLayout::with_root(root);
        let store = ArtifactStore::create(&layout.artifact_dir()).unwrap();
        GeneratorContext {
            run: GenerationRun {
                start_date,
                days,
                scale,
                sources: descriptor_ids().iter().map(|s| s.to_string()).collect(),
                scenarios: scenario_ids.iter().map(|s| s.to_string()).collect(),
                output_mode: OutputMode::Scratch,
                workers: 2,
                show_files: false,
            },
            config: config.clone(),
            volume: Arc::new(VolumeModel::from_config(&config.volumes)),
            store: Arc::new(store),
            scenarios: Arc::new(scenarios),
            layout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_descriptor_ids_unique() {
        let ids = descriptor_ids();
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(ids.len(), unique.len());
    }

    #[test]
    fn test_dependencies_reference_known_ids() {
        let ids: HashSet<_> = descriptor_ids().into_iter().collect();
        for descriptor in descriptors() {
            for dep in descriptor.depends_on {
                assert!(ids.contains(dep), "{} depends on unknown {dep}", descriptor.id);
            }
        }
    }

    #[test]
    fn test_scenario_events_tagging() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_support::context(dir.path(), 6, 0.1, &["exfiltration"]);

        // Active window: every injected cloud event carries the one
        // correlation id.
        let tagged = ctx.scenario_events("cloud", 3, 2);
        assert!(!tagged.is_empty());
        let cid = &ctx.scenarios[0].correlation_id;
        assert!(tagged.iter().all(|t| &t.correlation_id == cid));

        // Outside the window: nothing.
        assert!(ctx.scenario_events("cloud", 0, 2).is_empty());
        assert!(ctx.scenario_events("email", 3, 2).is_empty());
    }

    #[test]
    fn test_scenario_events_concatenate_across_scenarios() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_support::context(dir.path(), 6, 0.1, &["brute-force", "patch-window"]);

        // Day 1 hour 8: brute-force hits the firewall only (patch window is
        // hours 2-3), so one scenario contributes.
        let tagged = ctx.scenario_events("firewall", 1, 8);
        let cids: HashSet<_> = tagged.iter().map(|t| t.correlation_id.as_str()).collect();
        assert_eq!(cids.len(), 1);

        // Day 1 hour 2: patch-window contributes instead.
        let tagged = ctx.scenario_events("firewall", 1, 2);
        assert!(tagged
            .iter()
            .all(|t| t.correlation_id.starts_with("patch-window-")));
    }
}
