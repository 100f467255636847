//! Multi-day data-exfiltration campaign.
//!
//! Narrative: a single account is compromised on day 2 (off-hours login from
//! an unfamiliar address), the attacker stages bulk object reads from cloud
//! storage on days 2-5, and ships the data out through sustained overnight
//! TLS flows to a staging host on days 3-5. Each participating generator
//! sees only its own slice; the correlation id ties the slices together.

use super::{Scenario, ScenarioCategory, ScenarioContext, ScenarioEvent, ScenarioWindow};
use crate::seed;
use rand::Rng;
use std::ops::RangeInclusive;

const COMPROMISED_ACCOUNT: &str = "kira.solberg";
const ATTACKER_IP: &str = "185.100.87.14";
const STAGING_IP: &str = "198.51.100.77";
const BUCKET: &str = "coppermine-finance-archive";

/// Overnight hours during which staging and exfil traffic flows.
const QUIET_HOURS: RangeInclusive<u32> = 1..=4;

pub struct Exfiltration {
    windows: Vec<ScenarioWindow>,
}

impl Exfiltration {
    pub fn new() -> Self {
        Self {
            windows: vec![
                ScenarioWindow { generator_id: "auth", days: 2..=2 },
                ScenarioWindow { generator_id: "cloud", days: 2..=5 },
                ScenarioWindow { generator_id: "firewall", days: 3..=5 },
            ],
        }
    }
}

impl Default for Exfiltration {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario for Exfiltration {
    fn id(&self) -> &'static str {
        "exfiltration"
    }

    fn category(&self) -> ScenarioCategory {
        ScenarioCategory::Attack
    }

    fn day_range(&self) -> RangeInclusive<u32> {
        2..=5
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
        let date = ctx.date_for(day);
        let mut rng = seed::sub_rng(
            date,
            "scenario:exfiltration",
            &format!("{generator_id}:{hour}"),
        );

        match generator_id {
            "auth" => {
                // The initial compromise: two successful logins at 22:xx on
                // day 2, from an address the roster never uses.
                if hour != 22 {
                    return Vec::new();
                }
                (0..2)
                    .map(|i| {
                        let minute = rng.gen_range(0..60);
                        ScenarioEvent::new(ctx.at(day, hour, minute, rng.gen_range(0..60)), "user.session.start")
                            .user(COMPROMISED_ACCOUNT)
                            .source_ip(ATTACKER_IP)
                            .extra("outcome", "SUCCESS")
                            .extra("login_sequence", i + 1)
                    })
                    .collect()
            }
            "cloud" => {
                if !QUIET_HOURS.contains(&hour) {
                    return Vec::new();
                }
                let burst = rng.gen_range(20..=40);
                (0..burst)
                    .map(|_| {
                        let minute = rng.gen_range(0..60);
                        let second = rng.gen_range(0..60);
                        ScenarioEvent::new(ctx.at(day, hour, minute, second), "GetObject")
                            .user(COMPROMISED_ACCOUNT)
                            .source_ip(ATTACKER_IP)
                            .extra("bucket", BUCKET)
                            .extra(
                                "object_key",
                                format!("archive/fin-{:04}.parquet", rng.gen_range(0..5000)),
                            )
                            .extra("bytes", rng.gen_range(2_000_000..60_000_000u64))
                    })
                    .collect()
            }
            "firewall" => {
                if !QUIET_HOURS.contains(&hour) {
                    return Vec::new();
                }
                let flows = rng.gen_range(15..=30);
                (0..flows)
                    .map(|_| {
                        let minute = rng.gen_range(0..60);
                        let second = rng.gen_range(0..60);
                        ScenarioEvent::new(ctx.at(day, hour, minute, second), "outbound-allow")
                            .source_ip(&format!("{}.3.{}", ctx.company.internal_net, 40 + rng.gen_range(0..4)))
                            .extra("dst_ip", STAGING_IP)
                            .extra("dst_port", 443)
                            .extra("bytes_out", rng.gen_range(5_000_000..80_000_000u64))
                    })
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::CompanyConfig;
    use chrono::NaiveDate;

    fn ctx(company: &CompanyConfig) -> ScenarioContext {
        ScenarioContext {
            start_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            company,
        }
    }

    #[test]
    fn test_auth_events_only_at_compromise_hour() {
        let company = CompanyConfig::default();
        let ctx = ctx(&company);
        let scenario = Exfiltration::new();

        assert!(scenario.events_for("auth", 2, 9, &ctx).is_empty());
        let events = scenario.events_for("auth", 2, 22, &ctx);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.user.as_deref() == Some(COMPROMISED_ACCOUNT)));
        assert!(events.iter().all(|e| e.source_ip.as_deref() == Some(ATTACKER_IP)));
    }

    #[test]
    fn test_cloud_bursts_reproduce() {
        let company = CompanyConfig::default();
        let ctx = ctx(&company);
        let scenario = Exfiltration::new();

        let a = scenario.events_for("cloud", 3, 2, &ctx);
        let b = scenario.events_for("cloud", 3, 2, &ctx);
        assert!(!a.is_empty());
        assert_eq!(a.len(), b.len());
        assert_eq!(a[0].timestamp, b[0].timestamp);
        assert_eq!(a[0].extra.get("object_key"), b[0].extra.get("object_key"));
    }

    #[test]
    fn test_quiet_hours_bound_the_traffic() {
        let company = CompanyConfig::default();
        let ctx = ctx(&company);
        let scenario = Exfiltration::new();

        assert!(scenario.events_for("firewall", 4, 12, &ctx).is_empty());
        assert!(!scenario.events_for("firewall", 4, 2, &ctx).is_empty());
    }
}
