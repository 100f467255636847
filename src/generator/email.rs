//! Mail gateway log, CSV. Consumes the `meetings` artifact so calendar
//! invites show up as real gateway traffic from each organizer.

use super::{GeneratorContext, GeneratorError, GeneratorReport};
use crate::artifact::MeetingRecord;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

const CATEGORY: &str = "email";

pub fn run(ctx: &GeneratorContext) -> Result<GeneratorReport, GeneratorError> {
    let meetings: Vec<MeetingRecord> = ctx.store.read("meetings")?;
    let company = &ctx.config.company;

    let mut rows: Vec<(DateTime<Utc>, String)> = Vec::new();

    for (_, date, hour) in ctx.hours() {
        let mut rng = ctx.rng(date, CATEGORY, &format!("baseline:{hour}"));

        for _ in 0..ctx.baseline_count(CATEGORY, date, hour) {
            let ts = date
                .and_hms_opt(hour, rng.gen_range(0..60), rng.gen_range(0..60))
                .expect("valid hour")
                .and_utc();
            let from = &company.users[rng.gen_range(0..company.users.len())];
            let external = rng.gen_bool(0.3);
            let to = if external {
                format!("contact{}@partner.example", rng.gen_range(1..60))
            } else {
                format!(
                    "{}@{}",
                    company.users[rng.gen_range(0..company.users.len())],
                    company.domain
                )
            };
            rows.push((
                ts,
                format!(
                    "{},{}@{},{},delivered,{},",
                    ts.to_rfc3339(),
                    from,
                    company.domain,
                    to,
                    rng.gen_range(2..180) * 1024,
                ),
            ));
        }
    }

    // Invites go out half an hour before each meeting, one row per attendee.
    for meeting in &meetings {
        let sent_at = meeting.starts_at - Duration::minutes(30);
        for attendee in &meeting.attendees {
            rows.push((
                sent_at,
                format!(
                    "{},{}@{},{}@{},invite:{},{},",
                    sent_at.to_rfc3339(),
                    meeting.organizer,
                    company.domain,
                    attendee,
                    company.domain,
                    meeting.meeting_id,
                    4096,
                ),
            ));
        }
    }

    rows.sort_by_key(|(ts, _)| *ts);

    let header = "timestamp,from,to,action,size_bytes,correlation_id".to_string();
    let lines = std::iter::once(header).chain(rows.iter().map(|(_, row)| row.clone()));
    let (path, events) = ctx.layout.write_lines(CATEGORY, "gateway.csv", lines)?;
    Ok(GeneratorReport::single(path, events.saturating_sub(1)))
}
