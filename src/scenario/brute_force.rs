//! Credential-stuffing campaign on the first two days of the run.
//!
//! A small set of attacker addresses hammers the login surface: failed
//! identity-provider authentications, HTTP 401 storms on the web store's
//! login endpoint and matching perimeter denies once the addresses get
//! blocklisted partway through.

use super::{Scenario, ScenarioCategory, ScenarioContext, ScenarioEvent, ScenarioWindow};
use crate::seed;
use rand::Rng;
use std::ops::RangeInclusive;

const ATTACKER_IPS: [&str; 3] = ["45.155.205.233", "45.155.205.87", "91.240.118.172"];

/// The campaign runs through working hours, when a real stuffing run would
/// blend into login traffic.
const ACTIVE_HOURS: RangeInclusive<u32> = 8..=17;

pub struct BruteForce {
    windows: Vec<ScenarioWindow>,
}

impl BruteForce {
    pub fn new() -> Self {
        Self {
            windows: vec![
                ScenarioWindow { generator_id: "auth", days: 0..=1 },
                ScenarioWindow { generator_id: "web", days: 0..=1 },
                ScenarioWindow { generator_id: "firewall", days: 1..=1 },
            ],
        }
    }
}

impl Default for BruteForce {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario for BruteForce {
    fn id(&self) -> &'static str {
        "brute-force"
    }

    fn category(&self) -> ScenarioCategory {
        ScenarioCategory::Attack
    }

    fn day_range(&self) -> RangeInclusive<u32> {
        0..=1
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
        if !ACTIVE_HOURS.contains(&hour) {
            return Vec::new();
        }
        let date = ctx.date_for(day);
        let mut rng = seed::sub_rng(
            date,
            "scenario:brute-force",
            &format!("{generator_id}:{hour}"),
        );

        match generator_id {
            "auth" => {
                let attempts = rng.gen_range(40..=80);
                (0..attempts)
                    .map(|_| {
                        let target = &ctx.company.users[rng.gen_range(0..ctx.company.users.len())];
                        let ip = ATTACKER_IPS[rng.gen_range(0..ATTACKER_IPS.len())];
                        ScenarioEvent::new(
                            ctx.at(day, hour, rng.gen_range(0..60), rng.gen_range(0..60)),
                            "user.session.start",
                        )
                        .user(target)
                        .source_ip(ip)
                        .extra("outcome", "FAILURE")
                        .extra("reason", "INVALID_CREDENTIALS")
                    })
                    .collect()
            }
            "web" => {
                let attempts = rng.gen_range(30..=60);
                (0..attempts)
                    .map(|_| {
                        let ip = ATTACKER_IPS[rng.gen_range(0..ATTACKER_IPS.len())];
                        ScenarioEvent::new(
                            ctx.at(day, hour, rng.gen_range(0..60), rng.gen_range(0..60)),
                            "POST /login",
                        )
                        .source_ip(ip)
                        .extra("status", 401)
                        .extra("bytes", 512)
                    })
                    .collect()
            }
            "firewall" => {
                // Day 1: the addresses are on the blocklist, so the
                // perimeter now drops them.
                let denies = rng.gen_range(20..=50);
                (0..denies)
                    .map(|_| {
                        let ip = ATTACKER_IPS[rng.gen_range(0..ATTACKER_IPS.len())];
                        ScenarioEvent::new(
                            ctx.at(day, hour, rng.gen_range(0..60), rng.gen_range(0..60)),
                            "inbound-deny",
                        )
                        .source_ip(ip)
                        .extra("dst_ip", &*ctx.company.egress_ip)
                        .extra("dst_port", 443)
                    })
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}
