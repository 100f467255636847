//! Cloud audit trail, CloudTrail-style JSON lines.

use super::{GeneratorContext, GeneratorError, GeneratorReport};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::json;
use uuid::Uuid;

const CATEGORY: &str = "cloud";

const BASELINE_ACTIONS: [&str; 6] = [
    "ListBuckets",
    "GetObject",
    "PutObject",
    "DescribeInstances",
    "AssumeRole",
    "GetSecretValue",
];

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
            let record = json!({
                "eventID": Uuid::from_bytes(rng.gen::<[u8; 16]>()).to_string(),
                "eventTime": ts.to_rfc3339(),
                "eventSource": "s3.amazonaws.com",
                "eventName": BASELINE_ACTIONS[rng.gen_range(0..BASELINE_ACTIONS.len())],
                "userIdentity": { "userName": user },
                "sourceIPAddress": company.egress_ip,
                "correlation_id": None::<&str>,
            });
            hour_lines.push((ts, record.to_string()));
        }

        let mut id_rng = ctx.rng(date, CATEGORY, &format!("event-id:{hour}"));
        for tagged in ctx.scenario_events("cloud", day, hour) {
            let event = &tagged.event;
            let mut record = json!({
                "eventID": Uuid::from_bytes(id_rng.gen::<[u8; 16]>()).to_string(),
                "eventTime": event.timestamp.to_rfc3339(),
                "eventSource": "s3.amazonaws.com",
                "eventName": event.action,
                "userIdentity": { "userName": event.user },
                "sourceIPAddress": event.source_ip,
                "correlation_id": tagged.correlation_id,
            });
            // Scenario extras (bucket, object key, change ticket) ride along
            // as top-level fields, the way the real trail spells them.
            if let Some(map) = record.as_object_mut() {
                for (key, value) in &event.extra {
                    map.insert(key.clone(), value.clone());
                }
            }
            hour_lines.push((event.timestamp, record.to_string()));
        }

        hour_lines.sort_by_key(|(ts, _)| *ts);
        lines.append(&mut hour_lines);
    }

    let (path, events) = ctx.layout.write_lines(
        CATEGORY,
        "audit.jsonl",
        lines.iter().map(|(_, line)| line.as_str()),
    )?;
    Ok(GeneratorReport::single(path, events))
}
