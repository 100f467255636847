//! Purchase-order ledger. Producer of the `orders` shared artifact that the
//! web store generator correlates its checkout sessions against.

use super::{GeneratorContext, GeneratorError, GeneratorReport};
use crate::artifact::OrderRecord;
use rand::Rng;

const CATEGORY: &str = "business";

pub fn run(ctx: &GeneratorContext) -> Result<GeneratorReport, GeneratorError> {
    let company = &ctx.config.company;
    let mut records: Vec<OrderRecord> = Vec::new();

    for (_, date, hour) in ctx.hours() {
        let mut rng = ctx.rng(date, CATEGORY, &format!("orders:{hour}"));
        let count = ctx.baseline_count(CATEGORY, date, hour);

        for _ in 0..count {
            let ts = date
                .and_hms_opt(hour, rng.gen_range(0..60), rng.gen_range(0..60))
                .expect("valid hour")
                .and_utc();
            let product = &company.products[rng.gen_range(0..company.products.len())];
            records.push(OrderRecord {
                order_id: format!("ORD-{}-{:05}", date.format("%Y%m%d"), records.len() + 1),
                customer: format!("cust-{:05}", rng.gen_range(1..40000)),
                product: product.clone(),
                amount_cents: rng.gen_range(19..=499) * 100,
                session_id: format!("sess-{:016x}", rng.gen::<u64>()),
                placed_at: ts,
            });
        }
    }
    records.sort_by_key(|r| r.placed_at);

    // Publish before writing the ledger file: consumers gate on the
    // artifact, not on our output.
    ctx.store.publish("orders", &records)?;

    let header = "order_id,placed_at,customer,product,amount_cents,session_id".to_string();
    let lines = std::iter::once(header).chain(records.iter().map(|r| {
        format!(
            "{},{},{},{},{},{}",
            r.order_id,
            r.placed_at.to_rfc3339(),
            r.customer,
            r.product,
            r.amount_cents,
            r.session_id
        )
    }));
    let (path, events) = ctx.layout.write_lines(CATEGORY, "orders.csv", lines)?;
    // Header line is not an event.
    Ok(GeneratorReport::single(path, events.saturating_sub(1)))
}
