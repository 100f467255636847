//! Identity-provider log, Okta-style JSON lines.

use super::{GeneratorContext, GeneratorError, GeneratorReport};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::json;

const CATEGORY: &str = "auth";

pub fn run(ctx: &GeneratorContext) -> Result<GeneratorReport, GeneratorError> {
    let company = &ctx.config.company;
    let mut lines: Vec<(DateTime<Utc>, String)> = Vec::new();

    for (day, date, hour) in ctx.hours() {
        let mut hour_lines: Vec<(DateTime<Utc>, String)> = Vec::new();
        let mut rng = ctx.rng(date, CATEGORY, &format!("baseline:{hour}"));

        for _ in 0..ctx.baseline_count(CATEGORY, date, hour) {
            let ts = date
                .and_hms_opt(hour, rng.gen_range(0..60), rng.gen_range(0..60))
                .expect("valid hour")
                .and_utc();
            let user = &company.users[rng.gen_range(0..company.users.len())];
            // A small background failure rate keeps the baseline honest.
            let failed = rng.gen_range(0..100) < 4;
            let record = json!({
                "ts": ts.to_rfc3339(),
                "event_type": "user.session.start",
                "actor": format!("{}@{}", user, company.domain),
                "client_ip": format!("{}.{}.{}", company.internal_net,
                                     rng.gen_range(1..=8), rng.gen_range(10..=250)),
                "outcome": if failed { "FAILURE" } else { "SUCCESS" },
                "reason": if failed { Some("INVALID_CREDENTIALS") } else { None::<&str> },
                "correlation_id": None::<&str>,
            });
            hour_lines.push((ts, record.to_string()));
        }

        for tagged in ctx.scenario_events("auth", day, hour) {
            let event = &tagged.event;
            let record = json!({
                "ts": event.timestamp.to_rfc3339(),
                "event_type": event.action,
                "actor": event
                    .user
                    .as_deref()
                    .map(|u| format!("{}@{}", u, company.domain)),
                "client_ip": event.source_ip,
                "outcome": event.extra.get("outcome").cloned().unwrap_or_default(),
                "reason": event.extra.get("reason").cloned(),
                "correlation_id": tagged.correlation_id,
            });
            hour_lines.push((event.timestamp, record.to_string()));
        }

        hour_lines.sort_by_key(|(ts, _)| *ts);
        lines.append(&mut hour_lines);
    }

    let (path, events) = ctx.layout.write_lines(
        CATEGORY,
        "idp.jsonl",
        lines.iter().map(|(_, line)| line.as_str()),
    )?;
    Ok(GeneratorReport::single(path, events))
}
