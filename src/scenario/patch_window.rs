//! Scheduled maintenance window on day 1.
//!
//! An ops narrative rather than an attack: cloud configuration changes and
//! firewall rule reloads inside a fixed 02:00-04:00 window. Gives analysts a
//! benign correlated cluster to contrast against the attack scenarios.

use super::{Scenario, ScenarioCategory, ScenarioContext, ScenarioEvent, ScenarioWindow};
use crate::seed;
use rand::Rng;
use std::ops::RangeInclusive;

const MAINTENANCE_HOURS: RangeInclusive<u32> = 2..=3;
const OPERATOR: &str = "svc.deploy";

pub struct PatchWindow {
    windows: Vec<ScenarioWindow>,
}

impl PatchWindow {
    pub fn new() -> Self {
        Self {
            windows: vec![
                ScenarioWindow { generator_id: "cloud", days: 1..=1 },
                ScenarioWindow { generator_id: "firewall", days: 1..=1 },
            ],
        }
    }
}

impl Default for PatchWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario for PatchWindow {
    fn id(&self) -> &'static str {
        "patch-window"
    }

    fn category(&self) -> ScenarioCategory {
        ScenarioCategory::Ops
    }

    fn day_range(&self) -> RangeInclusive<u32> {
        1..=1
    }

    fn windows(&self) -> &[ScenarioWindow] {
        &self.windows
    }

    fn events_for(
        &self,
        generator_id: &str,
        day: u32,
        hour: u32,
        ctx: &ScenarioContext,
    ) -> Vec<ScenarioEvent> {
        if !MAINTENANCE_HOURS.contains(&hour) {
            return Vec::new();
        }
        let date = ctx.date_for(day);
        let mut rng = seed::sub_rng(
            date,
            "scenario:patch-window",
            &format!("{generator_id}:{hour}"),
        );

        match generator_id {
            "cloud" => {
                let changes = rng.gen_range(6..=12);
                let actions = [
                    "UpdateFunctionConfiguration",
                    "PutBucketPolicy",
                    "ModifyInstanceAttribute",
                    "CreateDeployment",
                ];
                (0..changes)
                    .map(|_| {
                        let action = actions[rng.gen_range(0..actions.len())];
                        ScenarioEvent::new(
                            ctx.at(day, hour, rng.gen_range(0..60), rng.gen_range(0..60)),
                            action,
                        )
                        .user(OPERATOR)
                        .source_ip(&format!("{}.1.10", ctx.company.internal_net))
                        .extra("change_ticket", format!("CHG-{:05}", rng.gen_range(1000..9999)))
                    })
                    .collect()
            }
            "firewall" => {
                let reloads = rng.gen_range(2..=4);
                (0..reloads)
                    .map(|i| {
                        ScenarioEvent::new(ctx.at(day, hour, 10 + i * 12, 0), "config-reload")
                            .user(OPERATOR)
                            .source_ip(&format!("{}.1.10", ctx.company.internal_net))
                            .extra("ruleset_version", format!("v{}.{}", 42, i))
                    })
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}
