//! Web store access log in combined format. Consumes the `orders` artifact
//! so that every completed order shows up as a checkout request under the
//! order's session, letting the analytics side join web traffic to billing.

use super::{GeneratorContext, GeneratorError, GeneratorReport};
use crate::artifact::OrderRecord;
use chrono::{DateTime, Timelike, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashMap;

const CATEGORY: &str = "web";

const PATHS: [&str; 7] = [
    "/", "/products", "/products/copperline-pro", "/cart", "/docs", "/pricing", "/support",
];

pub fn run(ctx: &GeneratorContext) -> Result<GeneratorReport, GeneratorError> {
    // Fails loudly (and is recorded as this generator's failure) if the
    // ledger was never published; the orchestrator normally prevents this by
    // running us only after `orders` succeeded.
    let orders: Vec<OrderRecord> = ctx.store.read("orders")?;

    // Index by (date, hour) so each slot picks up exactly its own checkouts.
    let mut by_slot: HashMap<(chrono::NaiveDate, u32), Vec<&OrderRecord>> = HashMap::new();
    for order in &orders {
        by_slot
            .entry((order.placed_at.date_naive(), order.placed_at.hour()))
            .or_default()
            .push(order);
    }

    let mut lines: Vec<(DateTime<Utc>, String)> = Vec::new();

    for (day, date, hour) in ctx.hours() {
        let mut hour_lines: Vec<(DateTime<Utc>, String)> = Vec::new();
        let mut rng = ctx.rng(date, CATEGORY, &format!("baseline:{hour}"));

        for _ in 0..ctx.baseline_count(CATEGORY, date, hour) {
            let ts = date
                .and_hms_opt(hour, rng.gen_range(0..60), rng.gen_range(0..60))
                .expect("valid hour")
                .and_utc();
            hour_lines.push((ts, browse_line(ts, &mut rng)));
        }

        // One checkout request per order placed this hour, on the order's
        // own session.
        if let Some(slot_orders) = by_slot.get(&(date, hour)) {
            for order in slot_orders {
                let line = format!(
                    "{} - {} [{}] \"POST /checkout?order={} HTTP/1.1\" 200 {} \"sess={}\"",
                    client_ip(&mut rng),
                    order.customer,
                    clf_ts(order.placed_at),
                    order.order_id,
                    rng.gen_range(900..2200),
                    order.session_id,
                );
                hour_lines.push((order.placed_at, line));
            }
        }

        for tagged in ctx.scenario_events("web", day, hour) {
            let event = &tagged.event;
            let status = event.extra.get("status").and_then(|v| v.as_u64()).unwrap_or(200);
            let bytes = event.extra.get("bytes").and_then(|v| v.as_u64()).unwrap_or(0);
            let (method, path) = event
                .action
                .split_once(' ')
                .unwrap_or(("GET", event.action.as_str()));
            let line = format!(
                "{} - - [{}] \"{} {} HTTP/1.1\" {} {} corr_id={}",
                event.source_ip.as_deref().unwrap_or("0.0.0.0"),
                clf_ts(event.timestamp),
                method,
                path,
                status,
                bytes,
                tagged.correlation_id,
            );
            hour_lines.push((event.timestamp, line));
        }

        hour_lines.sort_by_key(|(ts, _)| *ts);
        lines.append(&mut hour_lines);
    }

    let (path, events) = ctx.layout.write_lines(
        CATEGORY,
        "access.log",
        lines.iter().map(|(_, line)| line.as_str()),
    )?;
    Ok(GeneratorReport::single(path, events))
}

fn browse_line(ts: DateTime<Utc>, rng: &mut StdRng) -> String {
    let status = if rng.gen_range(0..100) < 3 { 404 } else { 200 };
    format!(
        "{} - - [{}] \"GET {} HTTP/1.1\" {} {}",
        client_ip(rng),
        clf_ts(ts),
        PATHS[rng.gen_range(0..PATHS.len())],
        status,
        rng.gen_range(300..14000),
    )
}

fn client_ip(rng: &mut StdRng) -> String {
    format!(
        "{}.{}.{}.{}",
        rng.gen_range(1..=223),
        rng.gen_range(0..=255),
        rng.gen_range(0..=255),
        rng.gen_range(1..=254)
    )
}

fn clf_ts(ts: DateTime<Utc>) -> String {
    ts.format("%d/%b/%Y:%H:%M:%S +0000").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactError;
    use crate::generator::test_support;

    #[test]
    fn test_fails_without_orders_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_support::context(dir.path(), 1, 0.01, &[]);
        let result = run(&ctx);
        assert!(matches!(
            result,
            Err(super::GeneratorError::Artifact(ArtifactError::NotPublished(_)))
        ));
    }

    #[test]
    fn test_every_order_appears_as_checkout() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_support::context(dir.path(), 2, 0.02, &[]);
        crate::generator::orders::run(&ctx).unwrap();
        let report = run(&ctx).unwrap();

        let orders: Vec<OrderRecord> = ctx.store.read("orders").unwrap();
        let content = std::fs::read_to_string(&report.files[0].path).unwrap();
        for order in &orders {
            assert!(
                content.contains(&format!("order={}", order.order_id)),
                "missing checkout for {}",
                order.order_id
            );
        }
    }
}
