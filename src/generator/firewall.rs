//! Perimeter firewall syslog (ASA-style connection lines).

use super::{GeneratorContext, GeneratorError, GeneratorReport};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use serde_json::Value;

const CATEGORY: &str = "firewall";

pub fn run(ctx: &GeneratorContext) -> Result<GeneratorReport, GeneratorError> {
    let company = &ctx.config.company;
    let mut lines: Vec<(DateTime<Utc>, String)> = Vec::new();

    for (day, date, hour) in ctx.hours() {
        let mut hour_lines: Vec<(DateTime<Utc>, String)> = Vec::new();
        let mut rng = ctx.rng(date, CATEGORY, &format!("baseline:{hour}"));

        let count = ctx.baseline_count(CATEGORY, date, hour);
        for _ in 0..count {
            let ts = date
                .and_hms_opt(hour, rng.gen_range(0..60), rng.gen_range(0..60))
                .expect("valid hour")
                .and_utc();
            hour_lines.push((ts, baseline_line(ts, &mut rng, &company.internal_net)));
        }

        for tagged in ctx.scenario_events("firewall", day, hour) {
            let event = &tagged.event;
            let line = match event.action.as_str() {
                "inbound-deny" => format!(
                    "{} %ASA-4-106023: Deny tcp src outside:{}/{} dst inside:{}/{} by access-group \"outside_in\" corr_id={}",
                    syslog_ts(event.timestamp),
                    event.source_ip.as_deref().unwrap_or("0.0.0.0"),
                    40000 + (event.timestamp.timestamp() % 20000),
                    extra_str(&event.extra, "dst_ip"),
                    extra_u64(&event.extra, "dst_port"),
                    tagged.correlation_id,
                ),
                "config-reload" => format!(
                    "{} %ASA-5-111008: User '{}' executed the 'reload ruleset {}' command corr_id={}",
                    syslog_ts(event.timestamp),
                    event.user.as_deref().unwrap_or("admin"),
                    extra_str(&event.extra, "ruleset_version"),
                    tagged.correlation_id,
                ),
                // outbound-allow and anything a future scenario adds.
                _ => format!(
                    "{} %ASA-6-302013: Built outbound TCP connection from inside:{}/{} to outside:{}/{} bytes {} corr_id={}",
                    syslog_ts(event.timestamp),
                    event.source_ip.as_deref().unwrap_or("0.0.0.0"),
                    50000 + (event.timestamp.timestamp() % 10000),
                    extra_str(&event.extra, "dst_ip"),
                    extra_u64(&event.extra, "dst_port"),
                    extra_u64(&event.extra, "bytes_out"),
                    tagged.correlation_id,
                ),
            };
            hour_lines.push((event.timestamp, line));
        }

        hour_lines.sort_by_key(|(ts, _)| *ts);
        lines.append(&mut hour_lines);
    }

    let (path, events) = ctx.layout.write_lines(
        CATEGORY,
        "firewall.log",
        lines.iter().map(|(_, line)| line.as_str()),
    )?;
    Ok(GeneratorReport::single(path, events))
}

fn baseline_line(ts: DateTime<Utc>, rng: &mut StdRng, internal_net: &str) -> String {
    let src = format!(
        "{}.{}.{}",
        internal_net,
        rng.gen_range(1..=8),
        rng.gen_range(10..=250)
    );
    let dst = format!(
        "{}.{}.{}.{}",
        rng.gen_range(1..=223),
        rng.gen_range(0..=255),
        rng.gen_range(0..=255),
        rng.gen_range(1..=254)
    );
    let dst_port = *[443u16, 443, 443, 80, 53, 8443]
        .get(rng.gen_range(0..6))
        .unwrap_or(&443);
    format!(
        "{} %ASA-6-302013: Built outbound TCP connection from inside:{}/{} to outside:{}/{}",
        syslog_ts(ts),
        src,
        rng.gen_range(1024..65000),
        dst,
        dst_port
    )
}

fn syslog_ts(ts: DateTime<Utc>) -> String {
    ts.format("%b %d %Y %H:%M:%S").to_string()
}

fn extra_str<'a>(extra: &'a std::collections::BTreeMap<String, Value>, key: &str) -> &'a str {
    extra.get(key).and_then(|v| v.as_str()).unwrap_or("-")
}

fn extra_u64(extra: &std::collections::BTreeMap<String, Value>, key: &str) -> u64 {
    extra.get(key).and_then(|v| v.as_u64()).unwrap_or(0)
}
